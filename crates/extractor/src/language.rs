use crate::error::{ExtractError, Result};
use std::path::Path;

/// Languages the routing table knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Unknown,
}

impl Language {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "rs" => Language::Rust,
            "py" | "pyw" => Language::Python,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" => Language::TypeScript,
            _ => Language::Unknown,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    /// Get language name as string
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Unknown => "unknown",
        }
    }

    /// Whether this language has a parser-backed extractor
    pub fn supports_ast(self) -> bool {
        matches!(self, Language::Rust | Language::Python)
    }

    /// Whether this language is scanned with the pattern-backed extractor
    pub fn pattern_backed(self) -> bool {
        matches!(self, Language::JavaScript | Language::TypeScript)
    }

    /// Get Tree-sitter language instance
    pub fn tree_sitter_language(self) -> Result<tree_sitter::Language> {
        match self {
            Language::Rust => Ok(tree_sitter_rust::LANGUAGE.into()),
            Language::Python => Ok(tree_sitter_python::LANGUAGE.into()),
            _ => Err(ExtractError::unsupported_language(self.as_str())),
        }
    }

    /// Declaration keyword rendered into signature strings
    pub fn declaration_keyword(self) -> &'static str {
        match self {
            Language::Rust => "fn",
            Language::Python => "def",
            Language::JavaScript | Language::TypeScript => "function",
            Language::Unknown => "",
        }
    }
}
