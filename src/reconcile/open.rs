//! The open-PR pass.

use tracing::{debug, instrument};

use crate::config::BotConfig;
use crate::effects::{GitHubInterpreter, PrData};
use crate::rules::{contains_issue_tag, resolve_ci_status};
use crate::types::{CiState, Label, LabelSet, PrNumber, StatusCheck};

use super::pass::PrPass;
use super::templates;
use super::{Gateway, PrOutcome, ReconcileError};

/// Applies the issue tag, ready-to-merge and CI rules to one open PR.
///
/// The PR, its labels and the statuses of its head commit are read before
/// anything is written; a failed read aborts the pass with no writes. Every
/// rule then runs against that single label snapshot, in order. A failed
/// write skips the remaining rules, but replies queued so far are still
/// posted before the error is returned.
///
/// Picking up application codes after the merge is left to
/// [`super::reconcile_merged_pr`].
#[instrument(skip(gh, config), fields(pr = %pr_number))]
pub async fn reconcile_open_pr<G: GitHubInterpreter>(
    gh: &G,
    config: &BotConfig,
    pr_number: PrNumber,
) -> Result<PrOutcome, ReconcileError> {
    let gateway = Gateway::new(gh);

    debug!("Fetching pull request data");
    let pr = gateway.get_pr(pr_number).await?;
    let labels = gateway.get_labels(pr_number).await?;
    let statuses = gateway.get_statuses(&pr.head_sha).await?;

    let mut pass = PrPass::new(gateway, config, pr_number, &pr.author);
    let result = apply_rules(&mut pass, config, &pr, &labels, &statuses).await;
    pass.finish(result).await
}

async fn apply_rules<G: GitHubInterpreter>(
    pass: &mut PrPass<'_, G>,
    config: &BotConfig,
    pr: &PrData,
    labels: &LabelSet,
    statuses: &[StatusCheck],
) -> Result<(), ReconcileError> {
    let has = |label: Label| labels.contains(config.label(label));

    if contains_issue_tag(pr.body.as_deref()) {
        debug!("Issue tag OK");
        if has(Label::IssueTagMissing) {
            pass.remove_label(Label::IssueTagMissing).await?;
            pass.reply(templates::ISSUE_TAG_FOUND);
        }
    } else {
        debug!("No issue tag");
        if !has(Label::IssueTagMissing) {
            pass.add_label(Label::IssueTagMissing).await?;
            pass.reply(&templates::issue_tag_missing());
        }
    }

    if has(Label::ReadyToMerge) {
        debug!("Ready to merge");
        pass.remove_label(Label::ReadyToMerge).await?;
        pass.merge().await?;
        pass.add_label(Label::TicketApplicationPending).await?;
        pass.reply(&templates::merged_congratulations(
            &config.registration_form_url,
        ));
    }

    let status = resolve_ci_status(statuses, &config.ci_context);
    debug!(state = %status.state, "CI status");
    match status.state {
        CiState::Success if has(Label::BuildFailed) => {
            pass.remove_label(Label::BuildFailed).await?;
            pass.reply(templates::BUILD_PASSED);
        }
        state if state.is_failed() && !has(Label::BuildFailed) => {
            pass.add_label(Label::BuildFailed).await?;
            pass.reply(&templates::build_failed(status.target_url.as_deref()));
        }
        _ => {}
    }

    Ok(())
}
