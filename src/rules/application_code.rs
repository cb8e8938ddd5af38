//! Extraction of Event Pop application codes from PR text.
//!
//! After a merge, the author registers for the event and pastes the
//! application code into the PR description or a comment, usually as
//! `application #VV8VYR4H`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `application #AB12CD34`, `Application#AB12cd34`. Only the word is case
/// insensitive; the code itself is ASCII.
static MARKED_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?i:application)\s*#([A-Za-z0-9]{8})\b")
        .expect("marked code pattern is valid")
});

/// A bare `#AB12CD34`. Where the `#` sits is checked by [`starts_token`].
static BARE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([A-Za-z0-9]{8})\b").expect("bare code pattern is valid"));

/// An 8-character alphanumeric application code, case preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationCode(String);

impl ApplicationCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Finds the application code in `text`.
///
/// A code explicitly marked with `application` wins over a bare `#XXXXXXXX`.
/// Bare codes must contain at least one letter, so an eight-digit issue
/// reference like `Closes #12345678` is never taken for a code, and their
/// `#` must start a token, so URL fragments and anchor links are skipped.
/// Codes are ASCII only. Within each tier the first match in text order is
/// returned.
///
/// # Examples
///
/// ```
/// use review_bot::rules::find_application_code;
///
/// let code = find_application_code("My application #AB12CD34").unwrap();
/// assert_eq!(code.as_str(), "AB12CD34");
/// assert!(find_application_code("no code here").is_none());
/// ```
pub fn find_application_code(text: &str) -> Option<ApplicationCode> {
    if let Some(caps) = MARKED_CODE.captures(text) {
        return Some(ApplicationCode(caps[1].to_string()));
    }

    BARE_CODE
        .captures_iter(text)
        .filter(|caps| caps.get(0).is_some_and(|m| starts_token(&text[..m.start()])))
        .map(|caps| caps[1].to_string())
        .find(|code| code.chars().any(|c| c.is_ascii_alphabetic()))
        .map(ApplicationCode)
}

/// Returns true if a `#` preceded by `before` starts a token of its own,
/// rather than being a URL fragment (`/docs/hooks#overview`), a query
/// parameter, or a markdown anchor link (`[hooks](#overview)`).
fn starts_token(before: &str) -> bool {
    if before.ends_with("](") {
        return false;
    }
    match before.chars().next_back() {
        None => true,
        Some(c) => !(c.is_alphanumeric() || matches!(c, '_' | '/' | '#' | '&' | '?' | '=')),
    }
}

/// Builds the text scanned for an application code.
///
/// The PR body comes first, followed by every comment written by the PR
/// author, one per line. Comments from anyone else are ignored so a
/// maintainer quoting a code cannot trigger the workflow.
pub fn application_text<'a>(
    body: Option<&str>,
    author: &str,
    comments: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> String {
    let mut parts: Vec<&str> = Vec::new();
    parts.push(body.unwrap_or_default());
    parts.extend(
        comments
            .into_iter()
            .filter(|(comment_author, _)| *comment_author == author)
            .map(|(_, comment_body)| comment_body),
    );
    parts.join("\n")
}
