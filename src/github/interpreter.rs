//! GitHub effect interpreter using octocrab.
//!
//! This module implements the `GitHubInterpreter` trait, executing GitHub effects
//! against the real GitHub API via octocrab.
//!
//! Key implementation details:
//! - Uses GraphQL for the merged-PRs-by-label query (REST has no label filter on pulls)
//! - Raw REST routes where octocrab has no typed builder (statuses, merge)
//! - Proper categorization of errors (transient vs permanent)

use serde::{Deserialize, Serialize};

use crate::effects::{
    CommentData, GitHubEffect, GitHubInterpreter, GitHubResponse, MergedPrData, PrData,
};
use crate::types::{CiState, LabelSet, PrNumber, Sha, StatusCheck};

use super::client::OctocrabClient;
use super::error::GitHubApiError;

/// Page size for paginated REST listings.
const PER_PAGE: u8 = 100;

// ─── GraphQL Types ────────────────────────────────────────────────────────────

/// GraphQL query for merged PRs carrying a label, with their latest comments.
const MERGED_WITH_LABEL_QUERY: &str = r#"
query($owner: String!, $repo: String!, $label: String!, $limit: Int!, $comments: Int!) {
    repository(owner: $owner, name: $repo) {
        pullRequests(states: MERGED, labels: [$label], last: $limit) {
            nodes {
                number
                title
                body
                author { login }
                labels(first: 100) {
                    nodes { name }
                }
                comments(last: $comments) {
                    nodes {
                        body
                        author { login }
                    }
                }
            }
        }
    }
}
"#;

/// Envelope of every GraphQL response.
#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct MergedQueryData {
    repository: Option<MergedQueryRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MergedQueryRepository {
    pull_requests: Connection<MergedQueryPr>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Connection<T> {
    #[serde(default)]
    nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Actor {
    login: String,
}

#[derive(Debug, Deserialize)]
struct MergedQueryPr {
    number: u64,
    title: String,
    body: Option<String>,
    author: Option<Actor>,
    labels: Connection<LabelNode>,
    comments: Connection<MergedQueryComment>,
}

#[derive(Debug, Deserialize)]
struct LabelNode {
    name: String,
}

#[derive(Debug, Deserialize)]
struct MergedQueryComment {
    body: String,
    author: Option<Actor>,
}

/// Converts the GraphQL payload into response data.
///
/// Deleted accounts come back as a `null` author; they map to an empty login,
/// which never equals a real PR author.
///
/// This is a pure function extracted for testability.
fn merged_prs_from_query(
    response: GraphQlResponse<MergedQueryData>,
) -> Result<Vec<MergedPrData>, GitHubApiError> {
    if let Some(first) = response.errors.first() {
        return Err(GitHubApiError::permanent_without_source(format!(
            "GraphQL query failed: {}",
            first.message
        )));
    }

    let repository = response
        .data
        .and_then(|d| d.repository)
        .ok_or_else(|| GitHubApiError::permanent_without_source("repository not found"))?;

    Ok(repository
        .pull_requests
        .nodes
        .into_iter()
        .map(|pr| MergedPrData {
            number: PrNumber(pr.number),
            title: pr.title,
            body: pr.body,
            author: pr.author.map(|a| a.login).unwrap_or_default(),
            labels: pr.labels.nodes.into_iter().map(|l| l.name).collect(),
            comments: pr
                .comments
                .nodes
                .into_iter()
                .map(|c| CommentData {
                    author: c.author.map(|a| a.login).unwrap_or_default(),
                    body: c.body,
                })
                .collect(),
        })
        .collect())
}

// ─── REST Types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StatusResponse {
    context: String,
    state: String,
    target_url: Option<String>,
}

impl From<StatusResponse> for StatusCheck {
    fn from(status: StatusResponse) -> Self {
        StatusCheck {
            state: CiState::from_api_str(&status.state),
            context: status.context,
            target_url: status.target_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MergeResponse {
    sha: Option<String>,
    merged: bool,
    message: Option<String>,
}

// ─── Interpreter Implementation ───────────────────────────────────────────────

impl GitHubInterpreter for OctocrabClient {
    type Error = GitHubApiError;

    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
        interpret_github_effect(self, effect).await
    }
}

/// Executes one effect against the repository `client` is scoped to.
///
/// Each effect is attempted once. A failed call aborts the PR's pass and the
/// next run re-derives everything from labels, so nothing is retried here.
pub async fn interpret_github_effect(
    client: &OctocrabClient,
    effect: GitHubEffect,
) -> Result<GitHubResponse, GitHubApiError> {
    match effect {
        GitHubEffect::ListOpenPrs => list_open_prs(client).await,
        GitHubEffect::ListMergedPrsWithLabel {
            label,
            limit,
            comment_limit,
        } => list_merged_prs_with_label(client, label, limit, comment_limit).await,
        GitHubEffect::GetPr { pr } => get_pr(client, pr).await,
        GitHubEffect::GetLabels { pr } => get_labels(client, pr).await,
        GitHubEffect::GetStatuses { sha } => get_statuses(client, sha).await,
        GitHubEffect::AddLabel { pr, label } => add_label(client, pr, label).await,
        GitHubEffect::RemoveLabel { pr, label } => remove_label(client, pr, label).await,
        GitHubEffect::PostComment { pr, body } => post_comment(client, pr, body).await,
        GitHubEffect::UpdateTitle { pr, title } => update_title(client, pr, title).await,
        GitHubEffect::MergePr { pr } => merge_pr(client, pr).await,
    }
}

// ─── PR Queries ───────────────────────────────────────────────────────────────

fn pr_data_from_pull(pull: octocrab::models::pulls::PullRequest) -> PrData {
    PrData {
        number: PrNumber(pull.number),
        title: pull.title.unwrap_or_default(),
        body: pull.body,
        head_sha: Sha::new(pull.head.sha),
        author: pull.user.map(|u| u.login).unwrap_or_default(),
        merged: pull.merged_at.is_some() || pull.merged == Some(true),
    }
}

async fn list_open_prs(client: &OctocrabClient) -> Result<GitHubResponse, GitHubApiError> {
    let mut page = 1u32;
    let mut all_prs = Vec::new();

    loop {
        let result = client
            .inner()
            .pulls(client.owner(), client.repo_name())
            .list()
            .state(octocrab::params::State::Open)
            .per_page(PER_PAGE)
            .page(page)
            .send()
            .await;

        match result {
            Ok(page_result) => {
                let items = page_result.items;
                let is_last_page = items.len() < usize::from(PER_PAGE);

                all_prs.extend(items.into_iter().map(pr_data_from_pull));

                if is_last_page {
                    break;
                }
                page += 1;
            }
            Err(e) => return Err(GitHubApiError::from_octocrab(e)),
        }
    }

    Ok(GitHubResponse::PrList(all_prs))
}

async fn list_merged_prs_with_label(
    client: &OctocrabClient,
    label: String,
    limit: u32,
    comment_limit: u32,
) -> Result<GitHubResponse, GitHubApiError> {
    #[derive(Serialize)]
    struct Variables<'a> {
        owner: &'a str,
        repo: &'a str,
        label: String,
        limit: u32,
        comments: u32,
    }

    let variables = Variables {
        owner: client.owner(),
        repo: client.repo_name(),
        label,
        limit,
        comments: comment_limit,
    };

    let result: Result<GraphQlResponse<MergedQueryData>, _> = client
        .inner()
        .graphql(&serde_json::json!({
            "query": MERGED_WITH_LABEL_QUERY,
            "variables": variables,
        }))
        .await;

    match result {
        Ok(response) => merged_prs_from_query(response).map(GitHubResponse::MergedPrList),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

async fn get_pr(client: &OctocrabClient, pr: PrNumber) -> Result<GitHubResponse, GitHubApiError> {
    let result = client
        .inner()
        .pulls(client.owner(), client.repo_name())
        .get(pr.0)
        .await;

    match result {
        Ok(pull) => Ok(GitHubResponse::Pr(pr_data_from_pull(pull))),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

async fn get_labels(
    client: &OctocrabClient,
    pr: PrNumber,
) -> Result<GitHubResponse, GitHubApiError> {
    let mut page = 1u32;
    let mut labels = LabelSet::new();

    loop {
        let result = client
            .inner()
            .issues(client.owner(), client.repo_name())
            .list_labels_for_issue(pr.0)
            .per_page(PER_PAGE)
            .page(page)
            .send()
            .await;

        match result {
            Ok(page_result) => {
                let items = page_result.items;
                let is_last_page = items.len() < usize::from(PER_PAGE);

                for label in items {
                    labels.insert(label.name);
                }

                if is_last_page {
                    break;
                }
                page += 1;
            }
            Err(e) => return Err(GitHubApiError::from_octocrab(e)),
        }
    }

    Ok(GitHubResponse::Labels(labels))
}

async fn get_statuses(
    client: &OctocrabClient,
    sha: Sha,
) -> Result<GitHubResponse, GitHubApiError> {
    // Newest first, which is what the CI resolver relies on. One page is
    // plenty: older reports for the same context are superseded anyway.
    let url = format!(
        "/repos/{}/{}/commits/{}/statuses?per_page={}",
        client.owner(),
        client.repo_name(),
        sha,
        PER_PAGE
    );

    let result: Result<Vec<StatusResponse>, _> = client.inner().get(&url, None::<&()>).await;

    match result {
        Ok(statuses) => Ok(GitHubResponse::Statuses(
            statuses.into_iter().map(StatusCheck::from).collect(),
        )),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

// ─── Labels ───────────────────────────────────────────────────────────────────

async fn add_label(
    client: &OctocrabClient,
    pr: PrNumber,
    label: String,
) -> Result<GitHubResponse, GitHubApiError> {
    let result = client
        .inner()
        .issues(client.owner(), client.repo_name())
        .add_labels(pr.0, &[label])
        .await;

    match result {
        Ok(_) => Ok(GitHubResponse::LabelAdded),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

async fn remove_label(
    client: &OctocrabClient,
    pr: PrNumber,
    label: String,
) -> Result<GitHubResponse, GitHubApiError> {
    let result = client
        .inner()
        .issues(client.owner(), client.repo_name())
        .remove_label(pr.0, &label)
        .await;

    match result {
        Ok(_) => Ok(GitHubResponse::LabelRemoved),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

// ─── PR Mutations ─────────────────────────────────────────────────────────────

async fn post_comment(
    client: &OctocrabClient,
    pr: PrNumber,
    body: String,
) -> Result<GitHubResponse, GitHubApiError> {
    let result = client
        .inner()
        .issues(client.owner(), client.repo_name())
        .create_comment(pr.0, body)
        .await;

    match result {
        Ok(_) => Ok(GitHubResponse::CommentPosted),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

async fn update_title(
    client: &OctocrabClient,
    pr: PrNumber,
    title: String,
) -> Result<GitHubResponse, GitHubApiError> {
    let result = client
        .inner()
        .pulls(client.owner(), client.repo_name())
        .update(pr.0)
        .title(title)
        .send()
        .await;

    match result {
        Ok(_) => Ok(GitHubResponse::TitleUpdated),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

async fn merge_pr(client: &OctocrabClient, pr: PrNumber) -> Result<GitHubResponse, GitHubApiError> {
    let url = format!(
        "/repos/{}/{}/pulls/{}/merge",
        client.owner(),
        client.repo_name(),
        pr.0
    );

    #[derive(Serialize)]
    struct MergeRequest {
        merge_method: &'static str,
    }

    let request = MergeRequest {
        merge_method: client.merge_method().as_api_str(),
    };

    let result: Result<MergeResponse, _> = client.inner().put(&url, Some(&request)).await;

    match result {
        Ok(response) => merge_outcome(pr, response),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

/// Interprets the body of a merge call.
///
/// This is a pure function extracted for testability.
fn merge_outcome(pr: PrNumber, response: MergeResponse) -> Result<GitHubResponse, GitHubApiError> {
    match (response.merged, response.sha) {
        (true, Some(sha)) => Ok(GitHubResponse::Merged { sha: Sha::new(sha) }),
        (true, None) => Err(GitHubApiError::permanent_without_source(format!(
            "PR {} reported merged without a merge commit SHA",
            pr
        ))),
        (false, _) => Err(GitHubApiError::permanent_without_source(format!(
            "Merge request for PR {} returned merged=false: {}",
            pr,
            response.message.as_deref().unwrap_or("unknown reason")
        ))),
    }
}
