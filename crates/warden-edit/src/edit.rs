// edit.rs — Ordered exact-text replacement.
//
// A request is a list of (old_text, new_text) pairs applied one after the
// other: edit k is matched against the output of edits 1..k-1, never against
// the original. Matching is exact and case-sensitive, every occurrence is
// replaced, and the first miss abandons the whole batch. Nothing partial ever
// leaves this module.

use serde::{Deserialize, Serialize};

use crate::error::EditError;

/// One replacement: every occurrence of `old_text` becomes `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edit {
    pub old_text: String,
    pub new_text: String,
}

impl Edit {
    pub fn new(old_text: impl Into<String>, new_text: impl Into<String>) -> Self {
        Self {
            old_text: old_text.into(),
            new_text: new_text.into(),
        }
    }
}

/// The result of a fully applied batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub original_lines: Vec<String>,
    pub modified_lines: Vec<String>,
    pub modified_content: String,
}

impl EditOutcome {
    /// True when the edits left the content byte-identical.
    pub fn is_unchanged(&self) -> bool {
        self.original_lines == self.modified_lines
    }
}

/// Apply `edits` in order to `original`.
///
/// Both sides of every edit have `\r\n` normalized to `\n` before matching,
/// so the caller's line-ending convention does not decide whether an edit
/// lands. The content itself is not normalized.
pub fn apply_edits(original: &str, edits: &[Edit]) -> Result<EditOutcome, EditError> {
    let mut modified = original.to_string();

    for (index, edit) in edits.iter().enumerate() {
        if edit.old_text.is_empty() {
            return Err(EditError::EmptyOldText { index });
        }
        let old_text = normalize_line_endings(&edit.old_text);
        let new_text = normalize_line_endings(&edit.new_text);

        if !modified.contains(old_text.as_str()) {
            return Err(EditError::TextNotFound { text: old_text });
        }
        modified = modified.replace(old_text.as_str(), &new_text);
    }

    Ok(EditOutcome {
        original_lines: split_lines(original),
        modified_lines: split_lines(&modified),
        modified_content: modified,
    })
}

/// Split on `\n`, dropping trailing empty segments.
pub fn split_lines(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = content.split('\n').map(ToOwned::to_owned).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_every_occurrence() {
        let outcome = apply_edits("foo foo baz", &[Edit::new("foo", "bar")]).unwrap();
        assert_eq!(outcome.modified_content, "bar bar baz");
    }

    #[test]
    fn later_edits_see_earlier_output() {
        let edits = [Edit::new("foo", "bar"), Edit::new("bar", "baz")];
        let outcome = apply_edits("foo", &edits).unwrap();
        assert_eq!(outcome.modified_content, "baz");
    }

    #[test]
    fn miss_aborts_whole_batch_naming_the_text() {
        let edits = [Edit::new("x", "y"), Edit::new("x", "z")];
        let err = apply_edits("y", &edits).unwrap_err();
        assert_eq!(
            err,
            EditError::TextNotFound {
                text: "x".to_string()
            }
        );
    }

    #[test]
    fn miss_after_successful_edits_still_aborts() {
        // The first edit consumes the only "x"; the second finds nothing.
        let edits = [Edit::new("x", "y"), Edit::new("x", "z")];
        let err = apply_edits("x", &edits).unwrap_err();
        assert!(matches!(err, EditError::TextNotFound { text } if text == "x"));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let err = apply_edits("Hello", &[Edit::new("hello", "bye")]).unwrap_err();
        assert!(matches!(err, EditError::TextNotFound { .. }));
    }

    #[test]
    fn crlf_in_edit_text_matches_lf_content() {
        let content = "fn a() {\n    1\n}\n";
        let edit = Edit::new("fn a() {\r\n    1\r\n}", "fn a() {\r\n    2\r\n}");
        let outcome = apply_edits(content, &[edit]).unwrap();
        assert_eq!(outcome.modified_content, "fn a() {\n    2\n}\n");
    }

    #[test]
    fn reports_normalized_text_on_miss() {
        let err = apply_edits("abc", &[Edit::new("a\r\nb", "")]).unwrap_err();
        assert_eq!(
            err,
            EditError::TextNotFound {
                text: "a\nb".to_string()
            }
        );
    }

    #[test]
    fn empty_old_text_is_rejected() {
        let edits = [Edit::new("a", "b"), Edit::new("", "x")];
        let err = apply_edits("abc", &edits).unwrap_err();
        assert_eq!(err, EditError::EmptyOldText { index: 1 });
    }

    #[test]
    fn outcome_carries_both_line_sets() {
        let outcome = apply_edits("one\ntwo\nthree\n", &[Edit::new("two", "2")]).unwrap();
        assert_eq!(outcome.original_lines, vec!["one", "two", "three"]);
        assert_eq!(outcome.modified_lines, vec!["one", "2", "three"]);
        assert!(!outcome.is_unchanged());
    }

    #[test]
    fn identity_edit_is_unchanged() {
        let outcome = apply_edits("same", &[Edit::new("same", "same")]).unwrap();
        assert!(outcome.is_unchanged());
    }

    #[test]
    fn empty_batch_returns_original() {
        let outcome = apply_edits("keep\n", &[]).unwrap();
        assert_eq!(outcome.modified_content, "keep\n");
    }

    #[test]
    fn split_lines_drops_trailing_empties_only() {
        assert_eq!(split_lines("a\n\nb\n\n"), vec!["a", "", "b"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn edit_deserializes_from_camel_case() {
        let edit: Edit = serde_json::from_str(r#"{"oldText":"a","newText":"b"}"#).unwrap();
        assert_eq!(edit, Edit::new("a", "b"));
    }
}
