//! GitHub effect interpreter using octocrab.
//!
//! Key implementation details:
//! - A 404 on `GetContent` is an answer (`Content(None)`), not an error
//! - Raw REST for the contents API so the base64 payload is kept verbatim
//! - GraphQL for draft toggling (REST cannot change draft state)

use serde::{Deserialize, Serialize};

use crate::effects::{FileContent, GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::types::{PrNumber, RepoId};

use super::client::OctocrabClient;
use super::error::GitHubApiError;

// ─── GraphQL Types ────────────────────────────────────────────────────────────

const CONVERT_TO_DRAFT_MUTATION: &str = r#"
mutation($id: ID!) {
    convertPullRequestToDraft(input: { pullRequestId: $id }) {
        pullRequest { isDraft }
    }
}
"#;

const MARK_READY_MUTATION: &str = r#"
mutation($id: ID!) {
    markPullRequestReadyForReview(input: { pullRequestId: $id }) {
        pullRequest { isDraft }
    }
}
"#;

/// Only the `errors` array is inspected; GraphQL reports failures with HTTP 200.
#[derive(Debug, Deserialize)]
struct GraphQlEnvelope {
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

// ─── REST Types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ContentResponse {
    path: String,
    content: Option<String>,
}

// ─── Interpreter Implementation ───────────────────────────────────────────────

impl GitHubInterpreter for OctocrabClient {
    type Error = GitHubApiError;

    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
        interpret_github_effect(self, effect).await
    }
}

/// Executes a GitHub effect against the GitHub API.
pub async fn interpret_github_effect(
    client: &OctocrabClient,
    effect: GitHubEffect,
) -> Result<GitHubResponse, GitHubApiError> {
    tracing::debug!(effect = effect.name(), repo = %client.repo(), "executing GitHub effect");

    match effect {
        GitHubEffect::GetContent { repo, path } => get_content(client, &repo, &path).await,
        GitHubEffect::ListPrFiles { pr } => list_pr_files(client, pr).await,
        GitHubEffect::RequestReviewers { pr, reviewers } => {
            request_reviewers(client, pr, reviewers).await
        }
        GitHubEffect::SetDraft { pr_node_id, draft } => set_draft(client, &pr_node_id, draft).await,
        GitHubEffect::PostComment { pr, body } => post_comment(client, pr, body).await,
        GitHubEffect::CheckCollaborator { username } => check_collaborator(client, &username).await,
    }
}

// ─── Contents ─────────────────────────────────────────────────────────────────

async fn get_content(
    client: &OctocrabClient,
    repo: &RepoId,
    path: &str,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = format!("/repos/{}/{}/contents/{}", repo.owner, repo.repo, path);

    let result: Result<ContentResponse, _> = client.inner().get(&url, None::<&()>).await;

    match result {
        Ok(file) => Ok(GitHubResponse::Content(Some(FileContent {
            path: file.path,
            content: file.content,
        }))),
        Err(e) => {
            let err = GitHubApiError::from_octocrab(e);
            if err.is_not_found() {
                Ok(GitHubResponse::Content(None))
            } else {
                Err(err)
            }
        }
    }
}

// ─── PR Operations ────────────────────────────────────────────────────────────

async fn list_pr_files(
    client: &OctocrabClient,
    pr: PrNumber,
) -> Result<GitHubResponse, GitHubApiError> {
    let first_page = client
        .inner()
        .pulls(client.owner(), client.repo_name())
        .list_files(pr.0)
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    let entries = client
        .inner()
        .all_pages(first_page)
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    Ok(GitHubResponse::Files(
        entries.into_iter().map(|entry| entry.filename).collect(),
    ))
}

async fn request_reviewers(
    client: &OctocrabClient,
    pr: PrNumber,
    reviewers: Vec<String>,
) -> Result<GitHubResponse, GitHubApiError> {
    client
        .inner()
        .pulls(client.owner(), client.repo_name())
        .request_reviews(pr.0, reviewers, Vec::<String>::new())
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    Ok(GitHubResponse::ReviewersRequested)
}

async fn set_draft(
    client: &OctocrabClient,
    pr_node_id: &str,
    draft: bool,
) -> Result<GitHubResponse, GitHubApiError> {
    #[derive(Serialize)]
    struct Variables<'a> {
        id: &'a str,
    }

    let query = if draft {
        CONVERT_TO_DRAFT_MUTATION
    } else {
        MARK_READY_MUTATION
    };

    let response: GraphQlEnvelope = client
        .inner()
        .graphql(&serde_json::json!({
            "query": query,
            "variables": Variables { id: pr_node_id },
        }))
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    if !response.errors.is_empty() {
        let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
        return Err(GitHubApiError::without_source(format!(
            "GraphQL draft update failed: {}",
            messages.join("; ")
        )));
    }

    Ok(GitHubResponse::DraftSet)
}

// ─── Comments ─────────────────────────────────────────────────────────────────

async fn post_comment(
    client: &OctocrabClient,
    pr: PrNumber,
    body: String,
) -> Result<GitHubResponse, GitHubApiError> {
    client
        .inner()
        .issues(client.owner(), client.repo_name())
        .create_comment(pr.0, body)
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    Ok(GitHubResponse::CommentPosted)
}

// ─── Collaborators ────────────────────────────────────────────────────────────

async fn check_collaborator(
    client: &OctocrabClient,
    username: &str,
) -> Result<GitHubResponse, GitHubApiError> {
    let is_collaborator = client
        .inner()
        .repos(client.owner(), client.repo_name())
        .is_collaborator(username)
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    Ok(GitHubResponse::IsCollaborator(is_collaborator))
}
