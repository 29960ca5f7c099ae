use anyhow::{bail, Result};

use crate::models::CandidateStatus;

/// Score cutoffs that turn a 0–100 match score into a decision bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Scores at or above this are shortlisted.
    pub shortlist: f64,
    /// Scores strictly below this are rejected.
    pub rejection: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            shortlist: 80.0,
            rejection: 50.0,
        }
    }
}

impl Thresholds {
    pub fn new(shortlist: f64, rejection: f64) -> Result<Self> {
        for (name, value) in [("shortlist", shortlist), ("rejection", rejection)] {
            if !(0.0..=100.0).contains(&value) {
                bail!("{name} threshold must be between 0 and 100 (got {value})");
            }
        }
        if rejection > shortlist {
            bail!("rejection threshold ({rejection}) exceeds shortlist threshold ({shortlist})");
        }
        Ok(Self {
            shortlist,
            rejection,
        })
    }

    pub fn classify(&self, overall_score: f64) -> CandidateStatus {
        if overall_score >= self.shortlist {
            CandidateStatus::Shortlisted
        } else if overall_score < self.rejection {
            CandidateStatus::Rejected
        } else {
            CandidateStatus::Pending
        }
    }

    pub fn is_high_similarity(&self, overall_score: f64) -> bool {
        overall_score >= self.shortlist
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_buckets_at_boundaries() {
        let t = Thresholds::default();
        assert_eq!(t.classify(100.0), CandidateStatus::Shortlisted);
        assert_eq!(t.classify(80.0), CandidateStatus::Shortlisted);
        assert_eq!(t.classify(79.9), CandidateStatus::Pending);
        assert_eq!(t.classify(50.0), CandidateStatus::Pending);
        assert_eq!(t.classify(49.9), CandidateStatus::Rejected);
        assert_eq!(t.classify(0.0), CandidateStatus::Rejected);
    }

    #[test]
    fn test_every_score_lands_in_exactly_one_bucket() {
        let t = Thresholds::new(70.0, 40.0).unwrap();
        for score in 0..=100 {
            let score = f64::from(score);
            let status = t.classify(score);
            assert_eq!(status == CandidateStatus::Shortlisted, score >= 70.0);
            assert_eq!(status == CandidateStatus::Rejected, score < 40.0);
        }
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        assert!(Thresholds::new(40.0, 60.0).is_err());
        assert!(Thresholds::new(120.0, 50.0).is_err());
    }

    #[test]
    fn test_equal_thresholds_leave_no_pending_band() {
        let t = Thresholds::new(60.0, 60.0).unwrap();
        assert_eq!(t.classify(60.0), CandidateStatus::Shortlisted);
        assert_eq!(t.classify(59.0), CandidateStatus::Rejected);
    }
}
