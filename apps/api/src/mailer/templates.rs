//! HTML bodies for outgoing emails. Every interpolated value is escaped.

use crate::models::MatchResult;

const FOOTER: &str = r#"<div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #e5e7eb;">
  <p style="color: #6b7280; font-size: 14px;">This is an automated message from your recruitment analysis system.</p>
</div>"#;

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn wrap(body: String) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
{body}
{FOOTER}
</div>"#
    )
}

pub fn processing_complete(job_title: &str, match_count: usize) -> String {
    wrap(format!(
        r#"<h2 style="color: #2563eb;">Analysis Complete</h2>
<p>Your job analysis for <strong>{}</strong> has been completed successfully.</p>
<div style="background: #f3f4f6; padding: 20px; border-radius: 8px; margin: 20px 0;">
  <h3 style="margin-top: 0; color: #374151;">Results Summary</h3>
  <p><strong>Total matches found:</strong> {match_count}</p>
</div>
<p>You can view detailed results in your dashboard.</p>"#,
        escape_html(job_title)
    ))
}

pub fn high_similarity(job_title: &str, high_matches: &[&MatchResult], threshold: f64) -> String {
    let rows: String = high_matches
        .iter()
        .map(|m| {
            format!(
                r#"<div style="margin-bottom: 15px; padding: 15px; background: white; border-radius: 6px;">
  <strong>{}</strong>
  <div style="color: #10b981; font-weight: bold; margin-top: 5px;">{}% similarity</div>
</div>"#,
                escape_html(&m.consultant_name),
                m.overall_score.round()
            )
        })
        .collect();

    wrap(format!(
        r#"<h2 style="color: #10b981;">High Similarity Matches Found!</h2>
<p>We've found {} candidate(s) with {threshold}%+ similarity for <strong>{}</strong>.</p>
<div style="background: #f0fdf4; border: 1px solid #bbf7d0; padding: 20px; border-radius: 8px; margin: 20px 0;">
  <h3 style="margin-top: 0; color: #166534;">Top Matches</h3>
  {rows}
</div>
<p>Review these matches in your dashboard to proceed with the recruitment process.</p>"#,
        high_matches.len(),
        escape_html(job_title)
    ))
}

pub fn reverse_match_complete(candidate_summary: &str, match_count: usize, top_match: &str) -> String {
    wrap(format!(
        r#"<h2 style="color: #8b5cf6;">Reverse Match Complete</h2>
<p>We've analyzed your resume and found <strong>{match_count}</strong> suitable job opportunities.</p>
<div style="background: #f8fafc; padding: 20px; border-radius: 8px; margin: 20px 0;">
  <h3 style="margin-top: 0; color: #475569;">Top Recommendation</h3>
  <p><strong>{}</strong></p>
</div>
<div style="background: #f1f5f9; padding: 20px; border-radius: 8px; margin: 20px 0;">
  <h3 style="margin-top: 0; color: #475569;">Candidate Summary</h3>
  <p>{}</p>
</div>
<p>View detailed results in your dashboard to explore all job opportunities.</p>"#,
        escape_html(top_match),
        escape_html(candidate_summary)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::sample_result;

    #[test]
    fn test_job_title_is_escaped() {
        let html = processing_complete("<script>alert(1)</script>", 2);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Total matches found:</strong> 2"));
    }

    #[test]
    fn test_high_similarity_lists_rounded_scores() {
        let mut result = sample_result("c-1", 86.6);
        result.consultant_name = "alice.pdf".to_string();
        let html = high_similarity("Backend", &[&result], 80.0);
        assert!(html.contains("alice.pdf"));
        assert!(html.contains("87% similarity"));
        assert!(html.contains("1 candidate(s) with 80%+"));
    }
}
