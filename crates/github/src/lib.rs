//! # Storyline GitHub
//!
//! GitHub REST implementation of the engine's [`PullRequestHost`]
//! capability: pull-request metadata, the changed-file list, and raw file
//! content at a revision, plus parsing of pull-request URLs.
//!
//! The client is request-scoped glue with fixed timeouts; it holds no state
//! beyond the connection pool.
//!
//! [`PullRequestHost`]: storyline_engine::PullRequestHost

mod client;
mod url;

pub use client::GitHubHost;
pub use url::parse_pull_request_url;
