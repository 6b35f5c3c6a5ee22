use crate::host::HostError;
use thiserror::Error;

/// Fatal analysis failures. Per-file problems are not errors; they degrade
/// to fallback story lines inside the report.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// Malformed pull-request identifier; nothing was fetched
    #[error("Invalid pull request reference: {0}")]
    InvalidReference(String),

    /// Metadata or file-list fetch failed; without a file list there is
    /// nothing to analyze
    #[error("Hosting service unavailable: {0}")]
    Upstream(#[from] HostError),
}

impl AnalyzeError {
    /// Create an invalid-reference error
    pub fn invalid_reference(msg: impl Into<String>) -> Self {
        Self::InvalidReference(msg.into())
    }
}
