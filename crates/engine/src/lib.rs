//! # Storyline Engine
//!
//! The structural diff engine: compares per-symbol fingerprints of a file
//! before and after a pull request, classifies every callable as added,
//! removed, signature-changed, or body-changed, and renders the result as a
//! human-readable storyline with documentation prompts.
//!
//! ## Pipeline
//!
//! ```text
//! ChangedFile[]
//!     │
//!     ├──> Extractor routing (by extension)
//!     │
//!     ├──> Fingerprint extraction (before / after content)
//!     │
//!     ├──> diff_fingerprints → FingerprintDiff
//!     │
//!     └──> narrate → story lines + prompts
//!              │
//!              └──> aggregation: storyline, de-duplicated prompts, raw diff
//! ```
//!
//! Content retrieval is behind the [`PullRequestHost`] capability; the
//! engine never talks to the network itself. Per-file failures (parse
//! errors, unreadable content, unmapped extensions) degrade to a fallback
//! story line and never abort the surrounding analysis.

mod diff;
mod error;
mod host;
mod narrate;
mod orchestrate;

pub use diff::diff_fingerprints;
pub use error::AnalyzeError;
pub use host::{HostError, PullRequestHost};
pub use narrate::narrate;
pub use orchestrate::{analyze_pull_request, FILE_CONCURRENCY};
