//! # Storyline Protocol
//!
//! Shared data model for the pull-request storyline engine: the wire shape
//! of a changed file, the structural fingerprint of a callable symbol, the
//! classified diff between two fingerprint maps, and the aggregated report
//! returned to callers.
//!
//! Everything here is a plain request-scoped value. Nothing holds state
//! across invocations.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Identifies one pull request on the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl PullRequestRef {
    #[must_use]
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            number,
        }
    }
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Per-file change status as reported by the hosting service.
///
/// Unrecognized upstream statuses (`copied`, `changed`) deserialize as
/// [`FileStatus::Modified`]; they carry a patch and both revisions exist,
/// which is all the analyzer cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Removed,
    Renamed,
    // The catch-all variant must come last for serde.
    #[serde(other)]
    Modified,
}

impl FileStatus {
    /// Whether symbol-level analysis is skipped for this status.
    ///
    /// Removed and renamed files get a single file-level story line instead
    /// of extraction and diffing.
    #[must_use]
    pub const fn skips_analysis(self) -> bool {
        matches!(self, FileStatus::Removed | FileStatus::Renamed)
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileStatus::Added => "added",
            FileStatus::Modified => "modified",
            FileStatus::Removed => "removed",
            FileStatus::Renamed => "renamed",
        };
        f.write_str(s)
    }
}

/// One changed file in a pull request, as listed by the hosting service.
///
/// Immutable; produced by the file-list fetch and consumed once by the
/// orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    pub status: FileStatus,
    /// Unified-diff hunks for this file. Absent upstream for binary files.
    #[serde(default)]
    pub patch: String,
    /// Opaque locator for the file's content at the head revision.
    #[serde(default)]
    pub raw_url: String,
}

/// The structural fingerprint of one callable symbol at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolFingerprint {
    /// Normalized rendering of the declaration: keyword, name, parameters,
    /// return type when statically known. Compared by exact string equality.
    pub signature: String,
    /// Content digest of the symbol's body. Present only when the extractor
    /// can isolate the body precisely (parser-backed variant); the
    /// pattern-backed variant leaves it `None` and therefore cannot detect
    /// body-only changes.
    pub body_hash: Option<String>,
}

impl SymbolFingerprint {
    #[must_use]
    pub fn new(signature: impl Into<String>, body_hash: Option<String>) -> Self {
        Self {
            signature: signature.into(),
            body_hash,
        }
    }

    /// Fingerprint with no body digest (pattern-backed extraction).
    #[must_use]
    pub fn name_only(signature: impl Into<String>) -> Self {
        Self::new(signature, None)
    }
}

/// Symbol name → fingerprint for one (file, side) pair.
///
/// Keys follow the `Class::method` convention for class-scoped callables
/// and the bare name for free functions. A `BTreeMap` keeps diff output
/// deterministic; insertion order is irrelevant to diffing.
pub type FingerprintMap = BTreeMap<String, SymbolFingerprint>;

/// Classified comparison of two fingerprint maps.
///
/// The four sets are pairwise disjoint. A symbol whose signature and body
/// both changed appears only in `signature_changed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintDiff {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
    pub signature_changed: BTreeSet<String>,
    pub body_changed: BTreeSet<String>,
}

impl FingerprintDiff {
    /// True when no symbol-level change was detected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.signature_changed.is_empty()
            && self.body_changed.is_empty()
    }
}

/// Story lines and documentation prompts for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileNarrative {
    pub story_lines: Vec<String>,
    pub prompts: Vec<String>,
}

/// The aggregated result for a whole pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Ordered human-readable narrative, one entry per file, joined with
    /// blank lines.
    pub storyline: String,
    /// De-duplicated documentation prompts in first-seen order.
    pub prompts: Vec<String>,
    /// Concatenated per-file patch text with headers, in file order.
    pub raw_diff: String,
}
