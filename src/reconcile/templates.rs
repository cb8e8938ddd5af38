//! Comment text posted by the bot.
//!
//! Replies to the PR author are prefixed with an `@` mention by
//! [`mention`]; the maintainer ping in [`application_received`] is part of
//! the template itself.

pub const ISSUE_TAG_FOUND: &str = "I found an issue tag now, thank you.";

pub const BUILD_PASSED: &str = "CI build passed now. Thank you!";

/// Prefixes `text` with a mention of `login`.
pub fn mention(login: &str, text: &str) -> String {
    format!("@{login} {text}")
}

pub fn issue_tag_missing() -> String {
    [
        "Please **update the pull request description** (not the title) to include an issue tag:",
        "",
        "- If this pull request solves an issue, say `Close #xx` where `xx` is the issue number.",
        "- If this pull request not associated with any issue, say `No associated issue`.",
        "",
        "Thank you. I will confirm with you again once the problem is fixed.",
    ]
    .join("\n")
}

/// Posted after merging a PR labelled ready-to-merge.
pub fn merged_congratulations(form_url: &str) -> String {
    [
        "Congratulations! Your PR has been merged. Please follow these steps to get your ticket.",
        "",
        &format!("1. Fill in this [form]({form_url})."),
        "2. Add reference code to this PR description.",
        "3. Wait for invitation email from Event Pop and follow the instruction from the email.",
        "",
        "Thank you for your contribution. See you in the event!",
    ]
    .join("\n")
}

/// Posted when the CI status turns failed. Statuses without a target URL
/// still get the notice, just without the link.
pub fn build_failed(target_url: Option<&str>) -> String {
    let log_line = match target_url {
        Some(url) => format!("Please [check the CI build log]({url}) for more information."),
        None => "Please check the CI build log for more information.".to_string(),
    };
    [
        "Sorry, the CI build failed. We cannot merge your pull request if CI build is not passing.",
        "",
        &log_line,
    ]
    .join("\n")
}

/// Asks `maintainer` to approve the application `code`.
pub fn application_received(maintainer: &str, code: &str) -> String {
    [
        "Your Event Pop application number have been received.",
        "",
        &format!("@{maintainer} Please approve application #{code}."),
    ]
    .join("\n")
}
