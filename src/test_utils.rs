//! Shared test utilities: an in-memory GitHub and proptest generators.

use std::collections::BTreeMap;
use std::sync::Mutex;

use proptest::prelude::*;
use thiserror::Error;

use crate::config::BotConfig;
use crate::effects::{
    CommentData, GitHubEffect, GitHubInterpreter, GitHubResponse, MergedPrData, PrData,
};
use crate::types::{CiState, Label, LabelSet, PrNumber, RepoId, Sha, StatusCheck};

/// Login the mock uses for comments the bot posts.
pub const BOT_LOGIN: &str = "review-bot";

pub fn test_config() -> BotConfig {
    BotConfig::new(RepoId::new("reactbkk", "2.0.0"))
}

/// Default wire name of `label`.
pub fn label(label: Label) -> &'static str {
    label.default_name()
}

// ─── In-memory repository ─────────────────────────────────────────────────────

/// A PR as stored by [`MockGitHub`].
#[derive(Debug, Clone)]
pub struct MockPr {
    pub data: PrData,
    pub labels: LabelSet,
    pub statuses: Vec<StatusCheck>,
    pub comments: Vec<CommentData>,
}

impl MockPr {
    /// An open PR by `alice` with head SHA `sha-<number>`.
    pub fn open(number: u64, body: Option<&str>) -> Self {
        MockPr {
            data: PrData {
                number: PrNumber(number),
                title: format!("PR {number}"),
                body: body.map(str::to_string),
                head_sha: Sha::new(format!("sha-{number}")),
                author: "alice".to_string(),
                merged: false,
            },
            labels: LabelSet::new(),
            statuses: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn merged(number: u64, body: Option<&str>) -> Self {
        let mut pr = Self::open(number, body);
        pr.data.merged = true;
        pr
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.data.title = title.to_string();
        self
    }

    pub fn with_labels<'a>(mut self, labels: impl IntoIterator<Item = &'a str>) -> Self {
        for name in labels {
            self.labels.insert(name);
        }
        self
    }

    pub fn with_status(mut self, context: &str, state: CiState, target_url: Option<&str>) -> Self {
        self.statuses.push(StatusCheck {
            context: context.to_string(),
            state,
            target_url: target_url.map(str::to_string),
        });
        self
    }

    pub fn with_comment(mut self, author: &str, body: &str) -> Self {
        self.comments.push(CommentData {
            author: author.to_string(),
            body: body.to_string(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mock GitHub: {0}")]
pub struct MockError(pub String);

type FailurePredicate = Box<dyn Fn(&GitHubEffect) -> bool + Send>;

#[derive(Default)]
struct MockState {
    prs: BTreeMap<PrNumber, MockPr>,
    effects: Vec<GitHubEffect>,
    fail_when: Option<FailurePredicate>,
}

/// A [`GitHubInterpreter`] backed by an in-memory repository.
///
/// Writes change the stored PRs the way GitHub would, so a second run sees
/// the first run's labels and comments. Every effect is recorded in order.
/// Removing a label the PR doesn't carry, or merging a merged PR, fails like
/// the real API.
#[derive(Default)]
pub struct MockGitHub {
    state: Mutex<MockState>,
}

impl MockGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prs(prs: impl IntoIterator<Item = MockPr>) -> Self {
        let gh = Self::new();
        {
            let mut state = gh.state.lock().unwrap();
            for pr in prs {
                state.prs.insert(pr.data.number, pr);
            }
        }
        gh
    }

    /// Makes every effect matching `predicate` fail. The effect is still
    /// recorded.
    pub fn fail_when(&self, predicate: impl Fn(&GitHubEffect) -> bool + Send + 'static) {
        self.state.lock().unwrap().fail_when = Some(Box::new(predicate));
    }

    /// Every effect interpreted so far, in order.
    pub fn effects(&self) -> Vec<GitHubEffect> {
        self.state.lock().unwrap().effects.clone()
    }

    /// The write effects interpreted so far, in order.
    pub fn writes(&self) -> Vec<GitHubEffect> {
        self.effects().into_iter().filter(|e| e.is_write()).collect()
    }

    pub fn clear_effects(&self) {
        self.state.lock().unwrap().effects.clear();
    }

    pub fn pr(&self, number: u64) -> MockPr {
        self.state.lock().unwrap().prs[&PrNumber(number)].clone()
    }

    /// Bodies of comments the bot posted on a PR.
    pub fn bot_comments(&self, number: u64) -> Vec<String> {
        self.pr(number)
            .comments
            .into_iter()
            .filter(|c| c.author == BOT_LOGIN)
            .map(|c| c.body)
            .collect()
    }

    fn apply(state: &mut MockState, effect: GitHubEffect) -> Result<GitHubResponse, MockError> {
        fn find(
            prs: &mut BTreeMap<PrNumber, MockPr>,
            pr: PrNumber,
        ) -> Result<&mut MockPr, MockError> {
            prs.get_mut(&pr)
                .ok_or_else(|| MockError(format!("PR {pr} not found")))
        }

        match effect {
            GitHubEffect::ListOpenPrs => Ok(GitHubResponse::PrList(
                state
                    .prs
                    .values()
                    .filter(|p| !p.data.merged)
                    .map(|p| p.data.clone())
                    .collect(),
            )),
            GitHubEffect::ListMergedPrsWithLabel {
                label,
                limit,
                comment_limit,
            } => {
                let matching: Vec<&MockPr> = state
                    .prs
                    .values()
                    .filter(|p| p.data.merged && p.labels.contains(&label))
                    .collect();
                let skip = matching.len().saturating_sub(limit as usize);
                Ok(GitHubResponse::MergedPrList(
                    matching
                        .into_iter()
                        .skip(skip)
                        .map(|p| {
                            let first = p.comments.len().saturating_sub(comment_limit as usize);
                            MergedPrData {
                                number: p.data.number,
                                title: p.data.title.clone(),
                                body: p.data.body.clone(),
                                author: p.data.author.clone(),
                                labels: p.labels.clone(),
                                comments: p.comments[first..].to_vec(),
                            }
                        })
                        .collect(),
                ))
            }
            GitHubEffect::GetPr { pr } => Ok(GitHubResponse::Pr(find(&mut state.prs, pr)?.data.clone())),
            GitHubEffect::GetLabels { pr } => {
                Ok(GitHubResponse::Labels(find(&mut state.prs, pr)?.labels.clone()))
            }
            GitHubEffect::GetStatuses { sha } => Ok(GitHubResponse::Statuses(
                state
                    .prs
                    .values()
                    .find(|p| p.data.head_sha == sha)
                    .map(|p| p.statuses.clone())
                    .unwrap_or_default(),
            )),
            GitHubEffect::AddLabel { pr, label } => {
                find(&mut state.prs, pr)?.labels.insert(label);
                Ok(GitHubResponse::LabelAdded)
            }
            GitHubEffect::RemoveLabel { pr, label } => {
                if find(&mut state.prs, pr)?.labels.remove(&label) {
                    Ok(GitHubResponse::LabelRemoved)
                } else {
                    Err(MockError(format!("label {label:?} does not exist on {pr}")))
                }
            }
            GitHubEffect::PostComment { pr, body } => {
                find(&mut state.prs, pr)?.comments.push(CommentData {
                    author: BOT_LOGIN.to_string(),
                    body,
                });
                Ok(GitHubResponse::CommentPosted)
            }
            GitHubEffect::UpdateTitle { pr, title } => {
                find(&mut state.prs, pr)?.data.title = title;
                Ok(GitHubResponse::TitleUpdated)
            }
            GitHubEffect::MergePr { pr } => {
                let stored = find(&mut state.prs, pr)?;
                if stored.data.merged {
                    return Err(MockError(format!("{pr} is already merged")));
                }
                stored.data.merged = true;
                Ok(GitHubResponse::Merged {
                    sha: Sha::new(format!("merge-{}", pr.0)),
                })
            }
        }
    }
}

impl GitHubInterpreter for MockGitHub {
    type Error = MockError;

    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
        let mut state = self.state.lock().unwrap();
        state.effects.push(effect.clone());
        if state.fail_when.as_ref().is_some_and(|f| f(&effect)) {
            return Err(MockError(format!("injected failure for {}", effect.name())));
        }
        Self::apply(&mut state, effect)
    }
}

// ─── Generators ───────────────────────────────────────────────────────────────

pub fn arb_pr_number() -> impl Strategy<Value = PrNumber> {
    (1..100_000u64).prop_map(PrNumber)
}

pub fn arb_label() -> impl Strategy<Value = Label> {
    prop::sample::select(Label::ALL.to_vec())
}

pub fn arb_ci_state() -> impl Strategy<Value = CiState> {
    prop_oneof![
        Just(CiState::Success),
        Just(CiState::Failure),
        Just(CiState::Error),
        Just(CiState::Pending),
    ]
}

/// PR descriptions drawn from the forms seen in practice.
pub fn arb_body() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just(String::new()),
        Just("Closes #42".to_string()),
        Just("No associated issue".to_string()),
        Just("improve #7 and application #A1B2C3D4".to_string()),
        "[a-zA-Z ]{0,40}",
    ])
}

/// An open PR with arbitrary labels, body and CI state.
pub fn arb_open_pr(number: u64) -> impl Strategy<Value = MockPr> {
    (
        arb_body(),
        prop::collection::btree_set(arb_label(), 0..4),
        prop::option::of(arb_ci_state()),
    )
        .prop_map(move |(body, labels, state)| {
            let mut pr = MockPr::open(number, body.as_deref())
                .with_labels(labels.iter().map(|l| l.default_name()));
            if let Some(state) = state {
                pr = pr.with_status("ci/circleci", state, Some("https://ci.example/1"));
            }
            pr
        })
}
