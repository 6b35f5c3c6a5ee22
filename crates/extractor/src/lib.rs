//! # Storyline Extractor
//!
//! Per-language extraction of structural fingerprints from source text.
//!
//! Each top-level callable symbol in a file becomes a
//! [`SymbolFingerprint`](storyline_protocol::SymbolFingerprint): a normalized
//! signature string plus, when the extractor can isolate the body precisely,
//! a content digest of the implementation. Two variants exist behind one
//! capability trait:
//!
//! - [`AstExtractor`] — parser-backed (Tree-sitter), exact signatures and
//!   body hashes. Rust and Python.
//! - [`PatternExtractor`] — regex-backed, name-only fidelity. JavaScript and
//!   TypeScript. Can never report a signature or body change.
//!
//! The [`extractor_for_path`] table routes a filename to its variant; files
//! with no mapped extension get no symbol analysis.

mod ast;
mod error;
mod language;
mod pattern;

pub use ast::AstExtractor;
pub use error::{ExtractError, Result};
pub use language::Language;
pub use pattern::PatternExtractor;

use storyline_protocol::FingerprintMap;

/// Capability implemented by both extractor variants.
///
/// A parse failure is a whole-file failure: callers get `Err`, never a
/// partial map, and are expected to degrade to file-level reporting.
pub trait SymbolExtractor: Send {
    fn extract(&mut self, source: &str) -> Result<FingerprintMap>;
}

/// Select the extractor variant for a file path.
///
/// Returns `None` for extensions with no mapped variant; the caller emits
/// its fallback line for those files instead of attempting analysis.
pub fn extractor_for_path(path: &str) -> Option<Box<dyn SymbolExtractor>> {
    let language = Language::from_path(path);
    if language.supports_ast() {
        return match AstExtractor::new(language) {
            Ok(extractor) => Some(Box::new(extractor)),
            Err(err) => {
                log::warn!("parser-backed extractor unavailable for {path}: {err}");
                None
            }
        };
    }
    if language.pattern_backed() {
        return Some(Box::new(PatternExtractor::new()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_table() {
        assert!(extractor_for_path("src/main.rs").is_some());
        assert!(extractor_for_path("scripts/tool.py").is_some());
        assert!(extractor_for_path("web/index.js").is_some());
        assert!(extractor_for_path("web/app.tsx").is_some());
        assert!(extractor_for_path("README.md").is_none());
        assert!(extractor_for_path("Makefile").is_none());
    }
}
