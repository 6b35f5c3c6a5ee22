use crate::error::{ExtractError, Result};
use crate::language::Language;
use crate::SymbolExtractor;
use sha2::{Digest, Sha256};
use storyline_protocol::{FingerprintMap, SymbolFingerprint};
use tree_sitter::{Node, Parser};

/// Parser-backed extractor: builds a real syntax tree and captures exact
/// signatures plus a body digest per callable.
///
/// Walks top-level declarations only. Methods are keyed `Type::name` using
/// the enclosing impl/class as qualifier; nested type definitions are not
/// supported.
pub struct AstExtractor {
    parser: Parser,
    language: Language,
}

impl AstExtractor {
    /// Create a parser-backed extractor for a language.
    ///
    /// Fails for languages without a grammar in the routing table.
    pub fn new(language: Language) -> Result<Self> {
        if !language.supports_ast() {
            return Err(ExtractError::unsupported_language(language.as_str()));
        }

        let ts_language = language.tree_sitter_language()?;
        let mut parser = Parser::new();
        parser
            .set_language(&ts_language)
            .map_err(|e| ExtractError::tree_sitter(format!("Failed to set language: {e}")))?;

        Ok(Self { parser, language })
    }

    fn collect_rust(&self, source: &str, root: Node, map: &mut FingerprintMap) {
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "function_item" => self.record_callable(source, child, None, map),
                "impl_item" => {
                    let target = Self::impl_target(source, child);
                    let Some(body) = child.child_by_field_name("body") else {
                        continue;
                    };
                    let mut body_cursor = body.walk();
                    for item in body.children(&mut body_cursor) {
                        if item.kind() == "function_item" {
                            self.record_callable(source, item, target.as_deref(), map);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn collect_python(&self, source: &str, root: Node, map: &mut FingerprintMap) {
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            let definition = Self::strip_decorators(child);
            match definition.kind() {
                "function_definition" => self.record_callable(source, definition, None, map),
                "class_definition" => {
                    let class_name = definition
                        .child_by_field_name("name")
                        .map(|n| source[n.byte_range()].to_string());
                    let Some(body) = definition.child_by_field_name("body") else {
                        continue;
                    };
                    let mut body_cursor = body.walk();
                    for item in body.children(&mut body_cursor) {
                        let member = Self::strip_decorators(item);
                        if member.kind() == "function_definition" {
                            self.record_callable(source, member, class_name.as_deref(), map);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Unwrap `decorated_definition` down to the definition it wraps.
    fn strip_decorators(node: Node) -> Node {
        if node.kind() == "decorated_definition" {
            node.child_by_field_name("definition").unwrap_or(node)
        } else {
            node
        }
    }

    /// Record one callable's fingerprint under its (possibly qualified) key.
    fn record_callable(
        &self,
        source: &str,
        node: Node,
        enclosing_type: Option<&str>,
        map: &mut FingerprintMap,
    ) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = &source[name_node.byte_range()];
        let key = match enclosing_type {
            Some(target) => format!("{target}::{name}"),
            None => name.to_string(),
        };

        let params = node
            .child_by_field_name("parameters")
            .map(|p| normalize_ws(&source[p.byte_range()]))
            .unwrap_or_else(|| "()".to_string());
        let return_type = node
            .child_by_field_name("return_type")
            .map(|r| format!(" -> {}", normalize_ws(&source[r.byte_range()])))
            .unwrap_or_default();
        let signature = format!(
            "{} {key}{params}{return_type}",
            self.language.declaration_keyword()
        );

        let body_hash = node
            .child_by_field_name("body")
            .map(|body| hash_body(source, body));

        map.insert(key, SymbolFingerprint::new(signature, body_hash));
    }

    /// Extract the target type name of an impl block (plain, generic, or
    /// path-qualified).
    fn impl_target(source: &str, impl_node: Node) -> Option<String> {
        let ty = impl_node.child_by_field_name("type")?;
        match ty.kind() {
            "type_identifier" => Some(source[ty.byte_range()].to_string()),
            "generic_type" | "scoped_type_identifier" => {
                let mut cursor = ty.walk();
                let target = ty
                    .children(&mut cursor)
                    .find(|c| c.kind() == "type_identifier")
                    .map(|c| source[c.byte_range()].to_string());
                target
            }
            _ => None,
        }
    }
}

impl SymbolExtractor for AstExtractor {
    fn extract(&mut self, source: &str) -> Result<FingerprintMap> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ExtractError::parse("Tree-sitter produced no tree"))?;
        let root = tree.root_node();

        // A tree with error nodes means no reliable structural data; callers
        // degrade to file-level reporting rather than diffing a partial map.
        if root.has_error() {
            return Err(ExtractError::parse(format!(
                "syntax error in {} source",
                self.language.as_str()
            )));
        }

        let mut map = FingerprintMap::new();
        match self.language {
            Language::Rust => self.collect_rust(source, root, &mut map),
            Language::Python => self.collect_python(source, root, &mut map),
            _ => {}
        }
        Ok(map)
    }
}

/// Digest of a body node over its canonical serialization: a pre-order walk
/// emitting node kinds and leaf token text, skipping comments. Whitespace
/// and comment edits never change the digest; token or structure edits do.
fn hash_body(source: &str, body: Node) -> String {
    let mut hasher = Sha256::new();
    let mut stack = vec![body];
    while let Some(node) = stack.pop() {
        if node.kind().ends_with("comment") {
            continue;
        }
        hasher.update(node.kind().as_bytes());
        hasher.update([0u8]);
        if node.child_count() == 0 {
            hasher.update(source[node.byte_range()].as_bytes());
            hasher.update([0u8]);
        }
        for i in (0..node.child_count()).rev() {
            if let Some(child) = node.child(i) {
                stack.push(child);
            }
        }
    }
    format!("{:x}", hasher.finalize())
}

/// Collapse runs of whitespace and absorb rustfmt-style reflow artifacts
/// (padding inside the parens, the trailing comma a multi-line parameter
/// list picks up) so reformatting does not register as a signature change.
fn normalize_ws(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("( ", "(")
        .replace(" )", ")")
        .replace(",)", ")")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract_rust(source: &str) -> FingerprintMap {
        AstExtractor::new(Language::Rust)
            .unwrap()
            .extract(source)
            .unwrap()
    }

    fn extract_python(source: &str) -> FingerprintMap {
        AstExtractor::new(Language::Python)
            .unwrap()
            .extract(source)
            .unwrap()
    }

    #[test]
    fn test_rust_free_function_signature() {
        let map = extract_rust("fn add(a: i32, b: i32) -> i32 { a + b }");
        let fp = &map["add"];
        assert_eq!(fp.signature, "fn add(a: i32, b: i32) -> i32");
        assert!(fp.body_hash.is_some());
    }

    #[test]
    fn test_rust_impl_methods_are_qualified() {
        let map = extract_rust(
            r#"
struct Point { x: f64, y: f64 }

impl Point {
    fn len(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
    fn origin() -> Point {
        Point { x: 0.0, y: 0.0 }
    }
}
"#,
        );
        assert!(map.contains_key("Point::len"));
        assert!(map.contains_key("Point::origin"));
        assert_eq!(map["Point::len"].signature, "fn Point::len(&self) -> f64");
    }

    #[test]
    fn test_rust_generic_impl_target() {
        let map = extract_rust(
            r#"
struct Wrapper<T> { inner: T }

impl<T> Wrapper<T> {
    fn get(&self) -> &T { &self.inner }
}
"#,
        );
        assert!(map.contains_key("Wrapper::get"));
    }

    #[test]
    fn test_rust_path_qualified_impl_target() {
        let map = extract_rust(
            r#"
mod shapes { pub struct Circle { pub r: f64 } }

impl shapes::Circle {
    fn area(&self) -> f64 { self.r * self.r * 3.14 }
}
"#,
        );
        assert!(map.contains_key("Circle::area"));
    }

    #[test]
    fn test_signature_ignores_parameter_reflow() {
        let one_line = extract_rust("fn f(a: u8, b: u8) -> u8 { a + b }");
        // Multi-line reflow adds a trailing comma; both normalize away.
        let reflowed = extract_rust("fn f(\n    a: u8,\n    b: u8,\n) -> u8 { a + b }");
        let respaced = extract_rust("fn f(a: u8,  b: u8)  ->  u8 { a + b }");
        assert_eq!(one_line["f"].signature, reflowed["f"].signature);
        assert_eq!(one_line["f"].signature, respaced["f"].signature);
    }

    #[test]
    fn test_body_hash_ignores_formatting_and_comments() {
        let original = extract_rust("fn f() -> u8 { 1 + 2 }");
        let reformatted = extract_rust("fn f() -> u8 {\n    // sum\n    1    +     2\n}");
        assert_eq!(original["f"].body_hash, reformatted["f"].body_hash);
    }

    #[test]
    fn test_body_hash_tracks_token_changes() {
        let before = extract_rust("fn f() -> u8 { 1 + 2 }");
        let after = extract_rust("fn f() -> u8 { 1 + 3 }");
        assert_ne!(before["f"].body_hash, after["f"].body_hash);
        assert_eq!(before["f"].signature, after["f"].signature);
    }

    #[test]
    fn test_parse_error_is_whole_file_failure() {
        let mut extractor = AstExtractor::new(Language::Rust).unwrap();
        let result = extractor.extract("fn broken( {{{");
        assert!(matches!(result, Err(ExtractError::Parse(_))));
    }

    #[test]
    fn test_python_class_methods_are_qualified() {
        let map = extract_python(
            r#"
def greet(name):
    return f"hello {name}"

class Greeter:
    def __init__(self, name):
        self.name = name

    def greet(self):
        return greet(self.name)
"#,
        );
        assert!(map.contains_key("greet"));
        assert!(map.contains_key("Greeter::__init__"));
        assert!(map.contains_key("Greeter::greet"));
        assert_eq!(map["greet"].signature, "def greet(name)");
    }

    #[test]
    fn test_python_return_annotation_in_signature() {
        let map = extract_python("def double(x: int) -> int:\n    return x * 2\n");
        assert_eq!(map["double"].signature, "def double(x: int) -> int");
    }

    #[test]
    fn test_python_decorated_function() {
        let map = extract_python(
            "@cached\ndef slow(x):\n    return x\n\nclass C:\n    @property\n    def v(self):\n        return 1\n",
        );
        assert!(map.contains_key("slow"));
        assert!(map.contains_key("C::v"));
    }

    #[test]
    fn test_unsupported_language() {
        assert!(AstExtractor::new(Language::JavaScript).is_err());
        assert!(AstExtractor::new(Language::Unknown).is_err());
    }
}
