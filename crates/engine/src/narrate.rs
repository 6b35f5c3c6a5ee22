use storyline_protocol::{FileNarrative, FileStatus, FingerprintDiff};

/// Render a classified diff as per-symbol story lines and documentation
/// prompts.
///
/// Grouped by classification in fixed order: added, removed,
/// signature-changed, body-changed. Added and signature-changed symbols get
/// a companion prompt; removed (nothing actionable) and body-changed
/// (implementation detail, not contract-facing) do not.
///
/// A removed or renamed file status short-circuits to a single file-level
/// line with no symbol analysis.
pub fn narrate(filename: &str, status: FileStatus, diff: &FingerprintDiff) -> FileNarrative {
    if status.skips_analysis() {
        return FileNarrative {
            story_lines: vec![file_level_line(filename, status)],
            prompts: Vec::new(),
        };
    }

    let mut narrative = FileNarrative::default();
    for name in &diff.added {
        narrative
            .story_lines
            .push(format!("New function/method added: `{name}`."));
        narrative.prompts.push(format!(
            "ACTION: Write documentation for the new `{name}` in `{filename}`."
        ));
    }
    for name in &diff.removed {
        narrative
            .story_lines
            .push(format!("Function/method removed: `{name}`."));
    }
    for name in &diff.signature_changed {
        narrative
            .story_lines
            .push(format!("Signature changed for `{name}`."));
        narrative.prompts.push(format!(
            "REVIEW: The signature for `{name}` in `{filename}` has changed. Ensure all call sites are updated."
        ));
    }
    for name in &diff.body_changed {
        narrative
            .story_lines
            .push(format!("Implementation changed inside `{name}`."));
    }
    narrative
}

/// Single story line for a file whose status skips symbol analysis.
pub(crate) fn file_level_line(filename: &str, status: FileStatus) -> String {
    format!("File `{filename}` was {status}.")
}

/// Story line for a file that produced no symbol-level findings; emitted so
/// every file contributes exactly one storyline entry.
pub(crate) fn fallback_line(filename: &str, status: FileStatus) -> String {
    format!(
        "File `{filename}` was {status}, but no high-level changes were detected for this file type."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_diff() -> FingerprintDiff {
        let mut diff = FingerprintDiff::default();
        diff.added.insert("greet".to_string());
        diff.removed.insert("legacy".to_string());
        diff.signature_changed.insert("add".to_string());
        diff.body_changed.insert("render".to_string());
        diff
    }

    #[test]
    fn test_groups_in_fixed_order() {
        let narrative = narrate("src/lib.rs", FileStatus::Modified, &sample_diff());
        assert_eq!(
            narrative.story_lines,
            vec![
                "New function/method added: `greet`.",
                "Function/method removed: `legacy`.",
                "Signature changed for `add`.",
                "Implementation changed inside `render`.",
            ]
        );
    }

    #[test]
    fn test_prompts_only_for_added_and_signature_changed() {
        let narrative = narrate("src/lib.rs", FileStatus::Modified, &sample_diff());
        assert_eq!(
            narrative.prompts,
            vec![
                "ACTION: Write documentation for the new `greet` in `src/lib.rs`.",
                "REVIEW: The signature for `add` in `src/lib.rs` has changed. Ensure all call sites are updated.",
            ]
        );
    }

    #[test]
    fn test_removed_file_short_circuits() {
        let narrative = narrate("gone.rs", FileStatus::Removed, &sample_diff());
        assert_eq!(narrative.story_lines, vec!["File `gone.rs` was removed."]);
        assert!(narrative.prompts.is_empty());
    }

    #[test]
    fn test_renamed_file_short_circuits() {
        let narrative = narrate("moved.py", FileStatus::Renamed, &FingerprintDiff::default());
        assert_eq!(narrative.story_lines, vec!["File `moved.py` was renamed."]);
    }

    #[test]
    fn test_empty_diff_yields_no_lines() {
        let narrative = narrate("a.rs", FileStatus::Modified, &FingerprintDiff::default());
        assert!(narrative.story_lines.is_empty());
        assert!(narrative.prompts.is_empty());
    }
}
