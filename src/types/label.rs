//! The label vocabulary the bot reads and writes.
//!
//! Labels double as the bot's only persisted state: every rule decides what to
//! do by checking label membership on a snapshot taken at the start of a pass.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A label the bot knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// The configured CI context reported failure or error.
    BuildFailed,
    /// The PR description has no issue-closing phrase or disclaimer.
    IssueTagMissing,
    /// Applied by a maintainer: the bot should merge the PR.
    ReadyToMerge,
    /// Ticketing finished; nothing more to do.
    TicketIssued,
    /// Merged; waiting for the author to submit an application code.
    TicketApplicationPending,
    /// Application code received; waiting for a maintainer to approve it.
    TicketIssuePending,
}

impl Label {
    pub const ALL: [Label; 6] = [
        Label::BuildFailed,
        Label::IssueTagMissing,
        Label::ReadyToMerge,
        Label::TicketIssued,
        Label::TicketApplicationPending,
        Label::TicketIssuePending,
    ];

    /// Returns the default wire name of this label.
    pub fn default_name(&self) -> &'static str {
        match self {
            Label::BuildFailed => "✖︎ Build failed",
            Label::IssueTagMissing => "✖︎ Issue tag missing",
            Label::ReadyToMerge => "✔︎ Ready to merge",
            Label::TicketIssued => "ticketing/issued",
            Label::TicketApplicationPending => "ticketing/application-pending",
            Label::TicketIssuePending => "ticketing/issue-pending",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_name())
    }
}

/// Wire names for each [`Label`].
///
/// Repositories may spell the labels differently, so the reconcilers never use
/// [`Label::default_name`] directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelNames {
    pub build_failed: String,
    pub issue_tag_missing: String,
    pub ready_to_merge: String,
    pub ticket_issued: String,
    pub ticket_application_pending: String,
    pub ticket_issue_pending: String,
}

impl LabelNames {
    pub fn name(&self, label: Label) -> &str {
        match label {
            Label::BuildFailed => &self.build_failed,
            Label::IssueTagMissing => &self.issue_tag_missing,
            Label::ReadyToMerge => &self.ready_to_merge,
            Label::TicketIssued => &self.ticket_issued,
            Label::TicketApplicationPending => &self.ticket_application_pending,
            Label::TicketIssuePending => &self.ticket_issue_pending,
        }
    }

    pub fn name_mut(&mut self, label: Label) -> &mut String {
        match label {
            Label::BuildFailed => &mut self.build_failed,
            Label::IssueTagMissing => &mut self.issue_tag_missing,
            Label::ReadyToMerge => &mut self.ready_to_merge,
            Label::TicketIssued => &mut self.ticket_issued,
            Label::TicketApplicationPending => &mut self.ticket_application_pending,
            Label::TicketIssuePending => &mut self.ticket_issue_pending,
        }
    }
}

impl Default for LabelNames {
    fn default() -> Self {
        LabelNames {
            build_failed: Label::BuildFailed.default_name().to_string(),
            issue_tag_missing: Label::IssueTagMissing.default_name().to_string(),
            ready_to_merge: Label::ReadyToMerge.default_name().to_string(),
            ticket_issued: Label::TicketIssued.default_name().to_string(),
            ticket_application_pending: Label::TicketApplicationPending
                .default_name()
                .to_string(),
            ticket_issue_pending: Label::TicketIssuePending.default_name().to_string(),
        }
    }
}

/// The labels attached to one PR at the moment it was fetched.
///
/// Names are compared exactly; GitHub label names are case-preserving and the
/// ticketing labels use decorated code points that must not be normalised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeSet<String>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.0.insert(name.into())
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        LabelSet(iter.into_iter().map(Into::into).collect())
    }
}
