use async_trait::async_trait;
use storyline_protocol::{ChangedFile, PullRequestRef};
use thiserror::Error;

/// Errors surfaced by a [`PullRequestHost`] for the fatal-path fetches
/// (metadata and file list). Content fetches never error; they return the
/// empty string instead.
#[derive(Error, Debug)]
pub enum HostError {
    /// The pull request does not exist on the hosting service
    #[error("Pull request not found")]
    NotFound,

    /// The hosting service failed; `status` is 0 for transport-level errors
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },
}

impl HostError {
    /// Create an upstream error
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Whether a bounded retry is worth attempting (network-level failures
    /// and server errors; never 4xx).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Upstream { status, .. } if *status == 0 || *status >= 500)
    }
}

/// Capability for talking to the code-hosting service.
///
/// The engine consumes this as an opaque collaborator; `storyline-github`
/// provides the production implementation, tests provide scripted ones.
#[async_trait]
pub trait PullRequestHost: Send + Sync {
    /// Base revision (the commit the pull request diffs against).
    async fn pull_request_base(&self, pr: &PullRequestRef) -> Result<String, HostError>;

    /// Changed-file list for the pull request, in upstream order.
    async fn changed_files(&self, pr: &PullRequestRef) -> Result<Vec<ChangedFile>, HostError>;

    /// File content at a specific revision. Returns the empty string on any
    /// failure (missing file, network error, timeout); the engine never
    /// distinguishes cause.
    async fn content_at(&self, pr: &PullRequestRef, path: &str, revision: &str) -> String;

    /// Content behind an opaque head-revision locator (`ChangedFile::raw_url`).
    /// Same empty-string-on-failure contract as [`Self::content_at`].
    async fn raw_content(&self, url: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(HostError::upstream(0, "connection refused").is_transient());
        assert!(HostError::upstream(503, "unavailable").is_transient());
        assert!(!HostError::upstream(403, "rate limited").is_transient());
        assert!(!HostError::NotFound.is_transient());
    }
}
