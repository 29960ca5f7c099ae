pub mod analysis;
pub mod document;

pub use analysis::{Analysis, AnalysisStatus, CandidateStatus, MatchResult, NewAnalysis};
pub use document::{Document, DocumentStats, DocumentStatus, DocumentType, NewDocument};
