//! Best-effort SMTP email.
//!
//! Sends never block an analysis: callers log and drop `MailError`. Without
//! SMTP credentials the mailer is disabled and every send is a no-op.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

use crate::config::SmtpConfig;
use crate::models::MatchResult;

pub mod templates;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

struct SmtpSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

pub struct Mailer {
    sender: Option<SmtpSender>,
}

impl Mailer {
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    pub fn from_config(smtp: &SmtpConfig) -> Result<Self, MailError> {
        let (Some(user), Some(password)) = (smtp.user.clone(), smtp.password.clone()) else {
            info!("Email service disabled: SMTP credentials not configured");
            return Ok(Self::disabled());
        };

        let from: Mailbox = smtp.from.as_deref().unwrap_or(&user).parse()?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
            .port(smtp.port)
            .credentials(Credentials::new(user, password))
            .build();

        info!("Email service enabled via {}:{}", smtp.host, smtp.port);
        Ok(Self {
            sender: Some(SmtpSender { transport, from }),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    pub async fn send_processing_complete(
        &self,
        to: &str,
        job_title: &str,
        match_count: usize,
    ) -> Result<(), MailError> {
        self.send(
            to,
            &format!("Analysis Complete: {job_title}"),
            templates::processing_complete(job_title, match_count),
        )
        .await
    }

    pub async fn send_high_similarity(
        &self,
        to: &str,
        job_title: &str,
        high_matches: &[&MatchResult],
        threshold: f64,
    ) -> Result<(), MailError> {
        self.send(
            to,
            &format!("High Similarity Matches Found: {job_title}"),
            templates::high_similarity(job_title, high_matches, threshold),
        )
        .await
    }

    pub async fn send_reverse_match_complete(
        &self,
        to: &str,
        candidate_summary: &str,
        match_count: usize,
        top_match: &str,
    ) -> Result<(), MailError> {
        self.send(
            to,
            "Reverse Match Complete - Job Recommendations Found",
            templates::reverse_match_complete(candidate_summary, match_count, top_match),
        )
        .await
    }

    async fn send(&self, to: &str, subject: &str, html: String) -> Result<(), MailError> {
        let Some(sender) = &self.sender else {
            info!("Email service disabled; skipping '{subject}' to {to}");
            return Ok(());
        };

        let message = Message::builder()
            .from(sender.from.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)?;

        sender.transport.send(message).await?;
        info!("Email sent successfully to {to}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_disable_mailer() {
        let smtp = SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            user: Some("ops@example.com".to_string()),
            password: None,
            from: None,
        };
        assert!(!Mailer::from_config(&smtp).unwrap().is_enabled());
    }

    #[tokio::test]
    async fn test_disabled_mailer_send_is_noop() {
        let mailer = Mailer::disabled();
        assert!(mailer
            .send_processing_complete("not-an-address", "Backend", 3)
            .await
            .is_ok());
    }
}
