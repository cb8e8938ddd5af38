//! Reconciler tests against the in-memory repository.

use proptest::prelude::*;

use super::*;
use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::test_utils::{MockError, MockGitHub, MockPr, arb_open_pr, label, test_config};
use crate::types::{CiState, Label, PrNumber};

const CI: &str = "ci/circleci";

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// ─── Open PR pass ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_body_gets_tag_missing_label_and_instructions() {
    let gh = MockGitHub::with_prs([MockPr::open(1, Some(""))]);

    let outcome = reconcile_open_pr(&gh, &test_config(), PrNumber(1))
        .await
        .unwrap();

    assert_eq!(outcome.labels_added, vec![label(Label::IssueTagMissing)]);
    assert!(outcome.commented);
    assert!(gh.pr(1).labels.contains(label(Label::IssueTagMissing)));
    assert_eq!(
        gh.bot_comments(1),
        vec![format!("@alice {}", templates::issue_tag_missing())]
    );
}

#[tokio::test]
async fn missing_body_is_treated_as_empty() {
    let gh = MockGitHub::with_prs([MockPr::open(1, None)]);

    reconcile_open_pr(&gh, &test_config(), PrNumber(1))
        .await
        .unwrap();

    assert!(gh.pr(1).labels.contains(label(Label::IssueTagMissing)));
}

#[tokio::test]
async fn found_tag_removes_label_and_thanks_author() {
    let gh = MockGitHub::with_prs([
        MockPr::open(2, Some("Closes #42")).with_labels([label(Label::IssueTagMissing)])
    ]);

    let outcome = reconcile_open_pr(&gh, &test_config(), PrNumber(2))
        .await
        .unwrap();

    assert_eq!(outcome.labels_removed, vec![label(Label::IssueTagMissing)]);
    assert!(gh.pr(2).labels.is_empty());
    assert_eq!(
        gh.bot_comments(2),
        vec!["@alice I found an issue tag now, thank you."]
    );
}

#[tokio::test]
async fn tagged_pr_without_label_is_left_alone() {
    let gh = MockGitHub::with_prs([MockPr::open(3, Some("No associated issue"))]);

    let outcome = reconcile_open_pr(&gh, &test_config(), PrNumber(3))
        .await
        .unwrap();

    assert!(outcome.is_unchanged());
    assert!(gh.writes().is_empty());
}

#[tokio::test]
async fn ready_to_merge_merges_and_starts_ticketing() {
    let gh = MockGitHub::with_prs([
        MockPr::open(4, Some("Closes #1")).with_labels([label(Label::ReadyToMerge)])
    ]);
    let config = test_config();

    let outcome = reconcile_open_pr(&gh, &config, PrNumber(4)).await.unwrap();

    assert!(outcome.merged);
    assert_eq!(
        gh.writes(),
        vec![
            GitHubEffect::RemoveLabel {
                pr: PrNumber(4),
                label: label(Label::ReadyToMerge).to_string(),
            },
            GitHubEffect::MergePr { pr: PrNumber(4) },
            GitHubEffect::AddLabel {
                pr: PrNumber(4),
                label: label(Label::TicketApplicationPending).to_string(),
            },
            GitHubEffect::PostComment {
                pr: PrNumber(4),
                body: format!(
                    "@alice {}",
                    templates::merged_congratulations(&config.registration_form_url)
                ),
            },
        ]
    );
    let stored = gh.pr(4);
    assert!(stored.data.merged);
    assert!(stored.labels.contains(label(Label::TicketApplicationPending)));
    assert!(!stored.labels.contains(label(Label::ReadyToMerge)));
}

#[tokio::test]
async fn failed_build_adds_label_with_log_link() {
    let gh = MockGitHub::with_prs([MockPr::open(5, Some("closes #5")).with_status(
        CI,
        CiState::Failure,
        Some("https://circleci.com/gh/reactbkk/2.0.0/17"),
    )]);

    reconcile_open_pr(&gh, &test_config(), PrNumber(5))
        .await
        .unwrap();

    assert!(gh.pr(5).labels.contains(label(Label::BuildFailed)));
    let comments = gh.bot_comments(5);
    assert_eq!(comments.len(), 1);
    assert!(comments[0].starts_with("@alice Sorry, the CI build failed."));
    assert!(comments[0].contains("(https://circleci.com/gh/reactbkk/2.0.0/17)"));
}

#[tokio::test]
async fn errored_build_counts_as_failed() {
    let gh = MockGitHub::with_prs([
        MockPr::open(5, Some("closes #5")).with_status(CI, CiState::Error, None)
    ]);

    reconcile_open_pr(&gh, &test_config(), PrNumber(5))
        .await
        .unwrap();

    assert!(gh.pr(5).labels.contains(label(Label::BuildFailed)));
}

#[tokio::test]
async fn passing_build_clears_label() {
    let gh = MockGitHub::with_prs([MockPr::open(6, Some("closes #6"))
        .with_labels([label(Label::BuildFailed)])
        .with_status(CI, CiState::Success, None)]);

    reconcile_open_pr(&gh, &test_config(), PrNumber(6))
        .await
        .unwrap();

    assert!(gh.pr(6).labels.is_empty());
    assert_eq!(gh.bot_comments(6), vec!["@alice CI build passed now. Thank you!"]);
}

#[tokio::test]
async fn other_ci_contexts_are_ignored() {
    let gh = MockGitHub::with_prs([MockPr::open(7, Some("closes #7")).with_status(
        "travis",
        CiState::Failure,
        None,
    )]);

    reconcile_open_pr(&gh, &test_config(), PrNumber(7))
        .await
        .unwrap();

    assert!(gh.writes().is_empty());
}

#[tokio::test]
async fn pending_build_leaves_failed_label() {
    let gh = MockGitHub::with_prs([MockPr::open(8, Some("closes #8"))
        .with_labels([label(Label::BuildFailed)])
        .with_status(CI, CiState::Pending, None)]);

    reconcile_open_pr(&gh, &test_config(), PrNumber(8))
        .await
        .unwrap();

    assert!(gh.writes().is_empty());
}

#[tokio::test]
async fn several_rules_share_one_comment() {
    let gh = MockGitHub::with_prs([MockPr::open(9, Some(""))
        .with_labels([label(Label::ReadyToMerge)])
        .with_status(CI, CiState::Failure, Some("https://ci/9"))]);

    reconcile_open_pr(&gh, &test_config(), PrNumber(9))
        .await
        .unwrap();

    let comments = gh.bot_comments(9);
    assert_eq!(comments.len(), 1);
    let body = &comments[0];
    let tag = body.find("Please **update the pull request description**").unwrap();
    let merged = body.find("Congratulations!").unwrap();
    let ci = body.find("Sorry, the CI build failed.").unwrap();
    assert!(tag < merged && merged < ci);
}

#[tokio::test]
async fn rules_see_the_snapshot_taken_at_start() {
    // The ready-to-merge rule adds application-pending; the merged pass is the
    // only place that looks for codes, so the open pass must not swap labels
    // even though the body already carries one.
    let gh = MockGitHub::with_prs([MockPr::open(10, Some("Closes #1 application #A1B2C3D4"))
        .with_labels([label(Label::ReadyToMerge)])]);

    reconcile_open_pr(&gh, &test_config(), PrNumber(10))
        .await
        .unwrap();

    let stored = gh.pr(10);
    assert!(stored.labels.contains(label(Label::TicketApplicationPending)));
    assert!(!stored.labels.contains(label(Label::TicketIssuePending)));
}

#[tokio::test]
async fn open_pass_is_idempotent() {
    let gh = MockGitHub::with_prs([MockPr::open(11, None)
        .with_labels([label(Label::ReadyToMerge)])
        .with_status(CI, CiState::Failure, None)]);
    let config = test_config();

    reconcile_open_pr(&gh, &config, PrNumber(11)).await.unwrap();
    gh.clear_effects();
    let second = reconcile_open_pr(&gh, &config, PrNumber(11)).await.unwrap();

    assert!(second.is_unchanged());
    assert!(gh.writes().is_empty());
    assert_eq!(gh.bot_comments(11).len(), 1);
}

// ─── Failures ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn read_failure_aborts_before_any_write() {
    let gh = MockGitHub::with_prs([MockPr::open(12, None)]);
    gh.fail_when(|e| matches!(e, GitHubEffect::GetStatuses { .. }));

    let err = reconcile_open_pr(&gh, &test_config(), PrNumber(12))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReconcileError::GitHub {
            operation: "get_statuses",
            ..
        }
    ));
    assert!(gh.writes().is_empty());
}

#[tokio::test]
async fn write_failure_still_posts_queued_replies() {
    let gh = MockGitHub::with_prs([MockPr::open(13, Some(""))
        .with_labels([label(Label::ReadyToMerge)])
        .with_status(CI, CiState::Failure, None)]);
    gh.fail_when(|e| matches!(e, GitHubEffect::MergePr { .. }));

    let err = reconcile_open_pr(&gh, &test_config(), PrNumber(13))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReconcileError::GitHub {
            operation: "merge_pr",
            ..
        }
    ));
    // The tag reply was queued before the merge failed; the CI rule never ran.
    assert_eq!(
        gh.bot_comments(13),
        vec![format!("@alice {}", templates::issue_tag_missing())]
    );
    let stored = gh.pr(13);
    assert!(!stored.labels.contains(label(Label::BuildFailed)));
    assert!(!stored.labels.contains(label(Label::TicketApplicationPending)));
}

#[tokio::test]
async fn rule_error_wins_over_flush_error() {
    let gh = MockGitHub::with_prs([
        MockPr::open(14, Some("")).with_labels([label(Label::ReadyToMerge)])
    ]);
    gh.fail_when(|e| {
        matches!(
            e,
            GitHubEffect::MergePr { .. } | GitHubEffect::PostComment { .. }
        )
    });

    let err = reconcile_open_pr(&gh, &test_config(), PrNumber(14))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReconcileError::GitHub {
            operation: "merge_pr",
            ..
        }
    ));
}

#[tokio::test]
async fn flush_failure_is_reported() {
    let gh = MockGitHub::with_prs([MockPr::open(15, None)]);
    gh.fail_when(|e| matches!(e, GitHubEffect::PostComment { .. }));

    let err = reconcile_open_pr(&gh, &test_config(), PrNumber(15))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReconcileError::GitHub {
            operation: "post_comment",
            ..
        }
    ));
}

struct WrongShape;

impl GitHubInterpreter for WrongShape {
    type Error = MockError;

    async fn interpret(&self, _effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
        Ok(GitHubResponse::LabelAdded)
    }
}

#[tokio::test]
async fn mismatched_response_is_an_error() {
    let err = reconcile_open_pr(&WrongShape, &test_config(), PrNumber(1))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReconcileError::UnexpectedResponse {
            operation: "get_pr",
            ..
        }
    ));
}

// ─── Merged PR pass ───────────────────────────────────────────────────────────

fn pending_merged(number: u64, body: Option<&str>) -> MockPr {
    MockPr::merged(number, body)
        .with_title("Add sponsor logos")
        .with_labels([label(Label::TicketApplicationPending)])
}

#[tokio::test]
async fn application_code_moves_pr_to_issue_pending() {
    let gh = MockGitHub::with_prs([pending_merged(20, Some("Closes #3\n#A1B2C3D4"))]);

    let report = run_once(&gh, &test_config()).await.unwrap();

    assert!(report.is_success());
    let stored = gh.pr(20);
    assert!(!stored.labels.contains(label(Label::TicketApplicationPending)));
    assert!(stored.labels.contains(label(Label::TicketIssuePending)));
    assert_eq!(stored.data.title, "[Application #A1B2C3D4] Add sponsor logos");
    assert_eq!(
        gh.bot_comments(20),
        vec![
            "@alice Your Event Pop application number have been received.\n\n@PanJ Please approve application #A1B2C3D4."
        ]
    );
}

#[tokio::test]
async fn code_in_author_comment_is_found() {
    let gh = MockGitHub::with_prs([pending_merged(21, None)
        .with_comment("bob", "application #BBBBBBBB")
        .with_comment("alice", "here you go: application #Q1W2E3R4")]);

    run_once(&gh, &test_config()).await.unwrap();

    assert!(gh.pr(21).data.title.starts_with("[Application #Q1W2E3R4]"));
}

#[tokio::test]
async fn code_from_someone_else_is_ignored() {
    let gh = MockGitHub::with_prs([
        pending_merged(22, Some("Closes #3")).with_comment("bob", "application #BBBBBBBB")
    ]);

    let report = run_once(&gh, &test_config()).await.unwrap();

    assert!(report.is_success());
    assert!(gh.writes().is_empty());
}

#[tokio::test]
async fn link_fragment_in_body_is_not_a_code() {
    let gh = MockGitHub::with_prs([pending_merged(
        40,
        Some("Closes #3\nDocs: https://reactjs.org/docs/hooks#overview"),
    )]);

    let report = run_once(&gh, &test_config()).await.unwrap();

    assert!(report.is_success());
    assert!(gh.writes().is_empty());
    assert_eq!(gh.pr(40).data.title, "Add sponsor logos");
    assert!(gh.bot_comments(40).is_empty());
}

#[tokio::test]
async fn issued_tickets_are_not_reprocessed() {
    let gh = MockGitHub::with_prs([pending_merged(23, Some("application #A1B2C3D4"))
        .with_labels([label(Label::TicketIssued)])]);

    run_once(&gh, &test_config()).await.unwrap();

    assert!(gh.writes().is_empty());
}

#[tokio::test]
async fn prefixed_title_is_not_rewritten() {
    let gh = MockGitHub::with_prs([pending_merged(24, Some("application #A1B2C3D4"))
        .with_title("[Application #A1B2C3D4] Add sponsor logos")]);

    let report = run_once(&gh, &test_config()).await.unwrap();

    assert!(!report.outcomes[0].title_updated);
    assert!(
        !gh.writes()
            .iter()
            .any(|e| matches!(e, GitHubEffect::UpdateTitle { .. }))
    );
}

#[tokio::test]
async fn merged_query_uses_configured_bounds() {
    let gh = MockGitHub::new();
    let mut config = test_config();
    config.merged_query_limit = 5;
    config.merged_comment_limit = 2;

    run_once(&gh, &config).await.unwrap();

    assert_eq!(
        gh.effects(),
        vec![
            GitHubEffect::ListOpenPrs,
            GitHubEffect::ListMergedPrsWithLabel {
                label: label(Label::TicketApplicationPending).to_string(),
                limit: 5,
                comment_limit: 2,
            },
        ]
    );
}

// ─── Batch driver ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn one_failing_pr_does_not_stop_the_batch() {
    let gh = MockGitHub::with_prs([MockPr::open(30, None), MockPr::open(31, None)]);
    gh.fail_when(|e| matches!(e, GitHubEffect::GetPr { pr } if *pr == PrNumber(30)));

    let report = run_once(&gh, &test_config()).await.unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].pr, PrNumber(30));
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].pr, PrNumber(31));
    assert!(gh.pr(31).labels.contains(label(Label::IssueTagMissing)));
}

#[tokio::test]
async fn listing_failure_aborts_the_run() {
    let gh = MockGitHub::with_prs([MockPr::open(32, None)]);
    gh.fail_when(|e| matches!(e, GitHubEffect::ListOpenPrs));

    let err = run_once(&gh, &test_config()).await.unwrap_err();

    assert!(matches!(
        err,
        ReconcileError::GitHub {
            operation: "list_open_prs",
            ..
        }
    ));
    assert_eq!(gh.effects().len(), 1);
}

#[tokio::test]
async fn merge_then_code_completes_in_one_run() {
    let gh = MockGitHub::with_prs([MockPr::open(33, Some("Closes #2\napplication #Z9Y8X7W6"))
        .with_labels([label(Label::ReadyToMerge)])]);

    let report = run_once(&gh, &test_config()).await.unwrap();

    assert_eq!(report.changed(), 2);
    let stored = gh.pr(33);
    assert!(stored.data.merged);
    assert!(stored.labels.contains(label(Label::TicketIssuePending)));
    assert_eq!(gh.bot_comments(33).len(), 2);
}

#[tokio::test]
async fn second_run_writes_nothing() {
    let gh = MockGitHub::with_prs([
        MockPr::open(40, Some("")),
        MockPr::open(41, Some("Closes #2")).with_labels([label(Label::IssueTagMissing)]),
        MockPr::open(42, Some("closes #1"))
            .with_labels([label(Label::ReadyToMerge)])
            .with_status(CI, CiState::Success, None),
        pending_merged(43, Some("#A1B2C3D4")),
    ]);
    let config = test_config();

    run_once(&gh, &config).await.unwrap();
    gh.clear_effects();
    let second = run_once(&gh, &config).await.unwrap();

    assert_eq!(second.changed(), 0);
    assert!(gh.writes().is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn open_pass_converges_after_one_run(pr in arb_open_pr(1)) {
        let gh = MockGitHub::with_prs([pr]);
        let config = test_config();
        let rt = runtime();

        rt.block_on(reconcile_open_pr(&gh, &config, PrNumber(1))).unwrap();
        let comments_after_first = gh.bot_comments(1).len();
        prop_assert!(comments_after_first <= 1);

        gh.clear_effects();
        let second = rt.block_on(reconcile_open_pr(&gh, &config, PrNumber(1))).unwrap();

        prop_assert!(second.is_unchanged());
        prop_assert!(gh.writes().is_empty());
        prop_assert_eq!(gh.bot_comments(1).len(), comments_after_first);
    }
}
