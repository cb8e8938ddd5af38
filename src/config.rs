//! Process configuration.
//!
//! Everything is read from environment variables. Parsing goes through
//! [`Settings::from_lookup`] so tests can supply a map instead of mutating
//! the process environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `GITHUB_TOKEN` | required |
//! | `REVIEW_BOT_REPO` | required, `owner/repo` |
//! | `GITHUB_WEBHOOK_SECRET` | unset: `/webhook` is not mounted |
//! | `REVIEW_BOT_LISTEN` | `0.0.0.0:3000` |
//! | `REVIEW_BOT_CI_CONTEXT` | `ci/circleci` |
//! | `REVIEW_BOT_MAINTAINER` | `PanJ` |
//! | `REVIEW_BOT_FORM_URL` | the React Bangkok 2.0.0 application form |
//! | `REVIEW_BOT_MERGED_LIMIT` | `50`, at most 100 |
//! | `REVIEW_BOT_COMMENT_LIMIT` | `10`, at most 100 |
//! | `REVIEW_BOT_MERGE_METHOD` | `merge` |
//! | `REVIEW_BOT_TIMEOUT_SECS` | `10` |
//! | `REVIEW_BOT_POLL_INTERVAL_MINS` | `10` |
//! | `REVIEW_BOT_ONESHOT` | `false` |
//! | `REVIEW_BOT_LABEL_<NAME>` | see [`Label::default_name`] |

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::github::MergeMethod;
use crate::types::{Label, LabelNames, RepoId};
use crate::worker::PollConfig;

const DEFAULT_LISTEN: ([u8; 4], u16) = ([0, 0, 0, 0], 3000);
const DEFAULT_CI_CONTEXT: &str = "ci/circleci";
const DEFAULT_MAINTAINER: &str = "PanJ";
const DEFAULT_FORM_URL: &str = "https://www.eventpop.me/events/1809-react-bangkok-2-0-0/application_forms/109/applicants/new?token=VV8VYR4HCNLNYNDU";
const DEFAULT_MERGED_LIMIT: u32 = 50;
const DEFAULT_COMMENT_LIMIT: u32 = 10;
const DEFAULT_TIMEOUT_SECS: u32 = 10;
/// GraphQL connections return at most this many nodes per request.
const MAX_GRAPHQL_PAGE: u32 = 100;

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: String,
        value: String,
        reason: String,
    },
}

/// What the reconcilers need to know about the repository's policy.
///
/// This is the only configuration the reconciliation logic sees; everything
/// about transport and scheduling lives in [`Settings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub repo: RepoId,
    pub labels: LabelNames,
    /// The status context whose state drives the CI rule.
    pub ci_context: String,
    /// GitHub login (without `@`) asked to approve application codes.
    pub maintainer: String,
    /// Event registration form linked from the congratulation comment.
    pub registration_form_url: String,
    /// How many recently merged PRs the ticketing pass inspects.
    pub merged_query_limit: u32,
    /// How many recent comments per merged PR are scanned for a code.
    pub merged_comment_limit: u32,
}

impl BotConfig {
    /// Creates a configuration for `repo` with the default policy.
    pub fn new(repo: RepoId) -> Self {
        BotConfig {
            repo,
            labels: LabelNames::default(),
            ci_context: DEFAULT_CI_CONTEXT.to_string(),
            maintainer: DEFAULT_MAINTAINER.to_string(),
            registration_form_url: DEFAULT_FORM_URL.to_string(),
            merged_query_limit: DEFAULT_MERGED_LIMIT,
            merged_comment_limit: DEFAULT_COMMENT_LIMIT,
        }
    }

    /// Returns the wire name of `label` in this repository.
    pub fn label(&self, label: Label) -> &str {
        self.labels.name(label)
    }
}

/// Full process settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bot: BotConfig,
    pub github_token: String,
    pub webhook_secret: Option<Vec<u8>>,
    pub listen_addr: SocketAddr,
    pub poll: PollConfig,
    pub merge_method: MergeMethod,
    /// Per-request timeout applied to every GitHub call.
    pub request_timeout: Duration,
    /// Run one reconciliation pass and exit instead of serving.
    pub oneshot: bool,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which returns a variable's value if set.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let github_token = get("GITHUB_TOKEN").ok_or(ConfigError::Missing("GITHUB_TOKEN"))?;
        let repo: RepoId = parse_var("REVIEW_BOT_REPO", get("REVIEW_BOT_REPO"))?
            .ok_or(ConfigError::Missing("REVIEW_BOT_REPO"))?;

        let mut bot = BotConfig::new(repo);
        if let Some(context) = get("REVIEW_BOT_CI_CONTEXT") {
            bot.ci_context = context;
        }
        if let Some(maintainer) = get("REVIEW_BOT_MAINTAINER") {
            bot.maintainer = maintainer.trim_start_matches('@').to_string();
        }
        if let Some(url) = get("REVIEW_BOT_FORM_URL") {
            bot.registration_form_url = url;
        }
        if let Some(limit) = parse_var("REVIEW_BOT_MERGED_LIMIT", get("REVIEW_BOT_MERGED_LIMIT"))? {
            bot.merged_query_limit = page_size("REVIEW_BOT_MERGED_LIMIT", limit)?;
        }
        if let Some(limit) = parse_var("REVIEW_BOT_COMMENT_LIMIT", get("REVIEW_BOT_COMMENT_LIMIT"))?
        {
            bot.merged_comment_limit = page_size("REVIEW_BOT_COMMENT_LIMIT", limit)?;
        }
        for label in Label::ALL {
            let var = label_var(label);
            if let Some(name) = get(var.as_str()) {
                *bot.labels.name_mut(label) = name;
            }
        }

        let listen_addr = parse_var("REVIEW_BOT_LISTEN", get("REVIEW_BOT_LISTEN"))?
            .unwrap_or_else(|| SocketAddr::from(DEFAULT_LISTEN));

        let mut poll = PollConfig::new();
        if let Some(mins) = parse_var(
            "REVIEW_BOT_POLL_INTERVAL_MINS",
            get("REVIEW_BOT_POLL_INTERVAL_MINS"),
        )? {
            let mins = positive("REVIEW_BOT_POLL_INTERVAL_MINS", mins)?;
            poll.poll_interval = Duration::from_secs(u64::from(mins) * 60);
        }

        let merge_method = parse_var("REVIEW_BOT_MERGE_METHOD", get("REVIEW_BOT_MERGE_METHOD"))?
            .unwrap_or_default();
        let timeout_secs = match parse_var("REVIEW_BOT_TIMEOUT_SECS", get("REVIEW_BOT_TIMEOUT_SECS"))? {
            Some(secs) => positive("REVIEW_BOT_TIMEOUT_SECS", secs)?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Settings {
            bot,
            github_token,
            webhook_secret: get("GITHUB_WEBHOOK_SECRET").map(String::into_bytes),
            listen_addr,
            poll,
            merge_method,
            request_timeout: Duration::from_secs(u64::from(timeout_secs)),
            oneshot: parse_flag("REVIEW_BOT_ONESHOT", get("REVIEW_BOT_ONESHOT"))?,
        })
    }
}

/// `REVIEW_BOT_LABEL_BUILD_FAILED`, `REVIEW_BOT_LABEL_TICKET_ISSUED`, ...
fn label_var(label: Label) -> String {
    let suffix = match label {
        Label::BuildFailed => "BUILD_FAILED",
        Label::IssueTagMissing => "ISSUE_TAG_MISSING",
        Label::ReadyToMerge => "READY_TO_MERGE",
        Label::TicketIssued => "TICKET_ISSUED",
        Label::TicketApplicationPending => "TICKET_APPLICATION_PENDING",
        Label::TicketIssuePending => "TICKET_ISSUE_PENDING",
    };
    format!("REVIEW_BOT_LABEL_{suffix}")
}

fn parse_var<T>(var: &str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|value| {
            value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                var: var.to_string(),
                reason: e.to_string(),
                value,
            })
        })
        .transpose()
}

fn parse_flag(var: &str, value: Option<String>) -> Result<bool, ConfigError> {
    match value {
        None => Ok(false),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                var: var.to_string(),
                value,
                reason: "expected a boolean".to_string(),
            }),
        },
    }
}

fn positive(var: &str, value: u32) -> Result<u32, ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            var: var.to_string(),
            value: value.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

fn page_size(var: &str, value: u32) -> Result<u32, ConfigError> {
    let value = positive(var, value)?;
    if value > MAX_GRAPHQL_PAGE {
        return Err(ConfigError::Invalid {
            var: var.to_string(),
            value: value.to_string(),
            reason: format!("must be at most {MAX_GRAPHQL_PAGE}"),
        });
    }
    Ok(value)
}
