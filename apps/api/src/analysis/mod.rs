//! Analyses: a job description scored against its linked consultant profiles.

pub mod handlers;
pub mod orchestrator;
pub mod reverse;
pub mod thresholds;

pub use thresholds::Thresholds;
