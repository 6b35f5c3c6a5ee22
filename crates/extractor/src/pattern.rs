use crate::error::Result;
use crate::SymbolExtractor;
use once_cell::sync::Lazy;
use regex::Regex;
use storyline_protocol::{FingerprintMap, SymbolFingerprint};

/// Declaration patterns for languages without a parser-backed extractor:
/// named function declarations (optionally behind export/default/async
/// modifiers) and variable bindings to arrow functions.
static DECLARATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s+([A-Za-z0-9_]+)\s*\(|^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z0-9_]+)\s*=\s*(?:async\s*)?\(.*?\)\s*=>",
    )
    .unwrap_or_else(|e| unreachable!("declaration pattern is valid: {e}"))
});

/// Pattern-backed extractor: regex scan, name-only fidelity.
///
/// Every match gets the constant signature `function <name>()` and no body
/// digest, so a file analyzed by this variant can only ever produce
/// added/removed classifications, never a signature or body change. Class
/// methods, default-exported anonymous functions, and rebound names are not
/// recognized.
#[derive(Debug, Default)]
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl SymbolExtractor for PatternExtractor {
    fn extract(&mut self, source: &str) -> Result<FingerprintMap> {
        let mut map = FingerprintMap::new();
        for captures in DECLARATION_PATTERN.captures_iter(source) {
            let name = captures
                .get(1)
                .or_else(|| captures.get(2))
                .map(|m| m.as_str());
            if let Some(name) = name {
                map.insert(
                    name.to_string(),
                    SymbolFingerprint::name_only(format!("function {name}()")),
                );
            }
        }
        Ok(map)
    }
}
