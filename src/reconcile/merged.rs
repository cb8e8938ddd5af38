//! The merged-PR ticketing pass.
//!
//! After a PR is merged through the ready-to-merge rule it sits in
//! `ticketing/application-pending` until its author posts the Event Pop
//! application code, in the description or in a comment. This pass finds
//! the code, moves the PR to `ticketing/issue-pending`, records the code in
//! the title and asks the maintainer to approve it.

use tracing::{debug, info, instrument};

use crate::config::BotConfig;
use crate::effects::{GitHubInterpreter, MergedPrData};
use crate::rules::{ApplicationCode, application_text, find_application_code};
use crate::types::Label;

use super::pass::PrPass;
use super::templates;
use super::{Gateway, PrOutcome, ReconcileError};

/// Returns `title` prefixed with `[Application #<code>] `.
///
/// A title that already carries the prefix is returned unchanged.
pub fn application_title(code: &ApplicationCode, title: &str) -> String {
    let prefix = format!("[Application #{code}]");
    if title.starts_with(&prefix) {
        title.to_string()
    } else {
        format!("{prefix} {title}")
    }
}

/// Advances one merged PR from application-pending to issue-pending once
/// its author has posted an application code.
///
/// PRs already issued or pending issue are left alone. Without a code the
/// pass ends silently.
#[instrument(skip(gh, config, pr), fields(pr = %pr.number))]
pub async fn reconcile_merged_pr<G: GitHubInterpreter>(
    gh: &G,
    config: &BotConfig,
    pr: &MergedPrData,
) -> Result<PrOutcome, ReconcileError> {
    let has = |label: Label| pr.labels.contains(config.label(label));
    if has(Label::TicketIssued) || has(Label::TicketIssuePending) {
        debug!("Ticket already in progress");
        return Ok(PrOutcome::new(pr.number));
    }

    let text = application_text(
        pr.body.as_deref(),
        &pr.author,
        pr.comments
            .iter()
            .map(|c| (c.author.as_str(), c.body.as_str())),
    );
    let Some(code) = find_application_code(&text) else {
        debug!("No application code yet");
        return Ok(PrOutcome::new(pr.number));
    };
    info!(code = %code, "Received application number");

    let mut pass = PrPass::new(Gateway::new(gh), config, pr.number, &pr.author);
    let result = issue_pending(&mut pass, config, pr, &code).await;
    pass.finish(result).await
}

async fn issue_pending<G: GitHubInterpreter>(
    pass: &mut PrPass<'_, G>,
    config: &BotConfig,
    pr: &MergedPrData,
    code: &ApplicationCode,
) -> Result<(), ReconcileError> {
    pass.remove_label(Label::TicketApplicationPending).await?;
    pass.add_label(Label::TicketIssuePending).await?;
    let title = application_title(code, &pr.title);
    if title != pr.title {
        pass.update_title(title).await?;
    }
    pass.reply(&templates::application_received(
        &config.maintainer,
        code.as_str(),
    ));
    Ok(())
}
