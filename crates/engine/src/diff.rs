use storyline_protocol::{FingerprintDiff, FingerprintMap};

/// Compare two fingerprint maps into a classified diff.
///
/// Pure and order-independent. Per symbol key:
/// - present only after → `added`
/// - present only before → `removed`
/// - present in both with different signature strings → `signature_changed`
/// - same signature, both sides carry a body hash and they differ →
///   `body_changed`
/// - otherwise unchanged (no entry)
///
/// The priority is fixed: a signature difference always wins over a body
/// difference, since the contract change subsumes the implementation one.
/// An empty `before` (new file, or prior content unavailable) classifies
/// every `after` symbol as added.
pub fn diff_fingerprints(before: &FingerprintMap, after: &FingerprintMap) -> FingerprintDiff {
    let mut diff = FingerprintDiff::default();

    for (name, after_print) in after {
        match before.get(name) {
            None => {
                diff.added.insert(name.clone());
            }
            Some(before_print) => {
                if before_print.signature != after_print.signature {
                    diff.signature_changed.insert(name.clone());
                } else if let (Some(before_hash), Some(after_hash)) =
                    (&before_print.body_hash, &after_print.body_hash)
                {
                    if before_hash != after_hash {
                        diff.body_changed.insert(name.clone());
                    }
                }
            }
        }
    }

    for name in before.keys() {
        if !after.contains_key(name) {
            diff.removed.insert(name.clone());
        }
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use storyline_protocol::SymbolFingerprint;

    fn map(entries: &[(&str, &str, Option<&str>)]) -> FingerprintMap {
        entries
            .iter()
            .map(|(name, sig, hash)| {
                (
                    name.to_string(),
                    SymbolFingerprint::new(*sig, hash.map(String::from)),
                )
            })
            .collect()
    }

    #[test]
    fn test_identical_maps_yield_empty_diff() {
        let a = map(&[
            ("add", "fn add(a: i32, b: i32) -> i32", Some("h1")),
            ("Point::len", "fn Point::len(&self) -> f64", Some("h2")),
        ]);
        assert!(diff_fingerprints(&a, &a).is_empty());
    }

    #[test]
    fn test_disjoint_maps_split_into_added_and_removed() {
        let before = map(&[("old", "fn old()", Some("h"))]);
        let after = map(&[("new", "fn new()", Some("h"))]);
        let diff = diff_fingerprints(&before, &after);
        assert_eq!(diff.added.iter().collect::<Vec<_>>(), vec!["new"]);
        assert_eq!(diff.removed.iter().collect::<Vec<_>>(), vec!["old"]);
        assert!(diff.signature_changed.is_empty());
        assert!(diff.body_changed.is_empty());
    }

    #[test]
    fn test_signature_change_wins_over_body_change() {
        let before = map(&[("f", "fn f(a: u8)", Some("h1"))]);
        let after = map(&[("f", "fn f(a: u8, b: u8)", Some("h2"))]);
        let diff = diff_fingerprints(&before, &after);
        assert!(diff.signature_changed.contains("f"));
        assert!(!diff.body_changed.contains("f"));
    }

    #[test]
    fn test_body_change_with_same_signature() {
        let before = map(&[("f", "fn f()", Some("h1"))]);
        let after = map(&[("f", "fn f()", Some("h2"))]);
        let diff = diff_fingerprints(&before, &after);
        assert!(diff.body_changed.contains("f"));
        assert!(diff.signature_changed.is_empty());
    }

    #[test]
    fn test_missing_body_hash_never_counts_as_change() {
        // Pattern-backed fingerprints carry no hash; identical constant
        // signatures therefore always compare as unchanged.
        let before = map(&[("f", "function f()", None)]);
        let after = map(&[("f", "function f()", None)]);
        assert!(diff_fingerprints(&before, &after).is_empty());
    }

    #[test]
    fn test_empty_before_classifies_everything_as_added() {
        let after = map(&[
            ("a", "fn a()", Some("h1")),
            ("b", "fn b()", Some("h2")),
        ]);
        let diff = diff_fingerprints(&FingerprintMap::new(), &after);
        assert_eq!(diff.added.len(), 2);
        assert!(diff.signature_changed.is_empty());
        assert!(diff.body_changed.is_empty());
    }
}
