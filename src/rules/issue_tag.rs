//! Detection of issue references in PR descriptions.

use std::sync::LazyLock;

use regex::Regex;

/// `close #12`, `Closes#3`, `improves #7`, `No issue`, `no associated issue`.
static ISSUE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:close|improve)s?\s*#\d+|no(?: associated)? issue")
        .expect("issue tag pattern is valid")
});

/// Returns true if the description links an issue or explicitly disclaims one.
///
/// Matching is case-insensitive and may occur anywhere in the text. A missing
/// or empty description never matches.
///
/// # Examples
///
/// ```
/// use review_bot::rules::contains_issue_tag;
///
/// assert!(contains_issue_tag(Some("Closes #42")));
/// assert!(contains_issue_tag(Some("No associated issue")));
/// assert!(!contains_issue_tag(Some("Fix typo")));
/// assert!(!contains_issue_tag(None));
/// ```
pub fn contains_issue_tag(text: Option<&str>) -> bool {
    match text {
        Some(text) if !text.is_empty() => ISSUE_TAG.is_match(text),
        _ => false,
    }
}
