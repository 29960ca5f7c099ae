use std::sync::Arc;

use crate::config::Config;
use crate::mailer::Mailer;
use crate::notifications::NotificationService;
use crate::scoring::MatchScorer;
use crate::storage::Storage;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Backend chosen by `STORAGE_TYPE`, already wrapped in the retention policy.
    pub storage: Arc<dyn Storage>,
    /// Pluggable match scorer. Default: GeminiScorer.
    pub scorer: Arc<dyn MatchScorer>,
    pub notifications: Arc<NotificationService>,
    pub mailer: Arc<Mailer>,
    pub config: Config,
}

#[cfg(test)]
impl AppState {
    /// In-memory storage, disabled mailer and default config around the given scorer.
    pub fn for_tests(scorer: impl MatchScorer + 'static) -> Self {
        Self {
            storage: Arc::new(crate::storage::MemoryStorage::new()),
            scorer: Arc::new(scorer),
            notifications: Arc::new(NotificationService::new()),
            mailer: Arc::new(Mailer::disabled()),
            config: Config::default(),
        }
    }
}
