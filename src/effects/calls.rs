//! Typed wrappers around [`GitHubInterpreter::interpret`].
//!
//! Each helper builds one effect, runs it, and unpacks the matching
//! [`GitHubResponse`] variant. Interpreter errors are boxed so callers do not
//! need to be generic over the interpreter's error type.

use thiserror::Error;

use super::github::{FileContent, GitHubEffect, GitHubResponse};
use super::interpreter::GitHubInterpreter;
use crate::types::{PrNumber, RepoId};

/// Failure of a single effect.
#[derive(Debug, Error)]
pub enum EffectError {
    /// The interpreter returned an error.
    #[error("GitHub {effect} failed: {source}")]
    Failed {
        effect: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The interpreter answered with the wrong response variant.
    #[error("GitHub {effect} returned unexpected response: {response:?}")]
    UnexpectedResponse {
        effect: &'static str,
        response: GitHubResponse,
    },
}

async fn run<G>(github: &G, effect: GitHubEffect) -> Result<GitHubResponse, EffectError>
where
    G: GitHubInterpreter + Sync,
{
    let name = effect.name();
    github
        .interpret(effect)
        .await
        .map_err(|e| EffectError::Failed {
            effect: name,
            source: Box::new(e),
        })
}

fn unexpected(effect: &'static str, response: GitHubResponse) -> EffectError {
    EffectError::UnexpectedResponse { effect, response }
}

/// Fetches a file. `Ok(None)` means the file does not exist.
pub async fn get_content<G>(
    github: &G,
    repo: &RepoId,
    path: &str,
) -> Result<Option<FileContent>, EffectError>
where
    G: GitHubInterpreter + Sync,
{
    let effect = GitHubEffect::GetContent {
        repo: repo.clone(),
        path: path.to_string(),
    };
    match run(github, effect).await? {
        GitHubResponse::Content(content) => Ok(content),
        other => Err(unexpected("get_content", other)),
    }
}

/// Lists the paths changed by a PR.
pub async fn list_pr_files<G>(github: &G, pr: PrNumber) -> Result<Vec<String>, EffectError>
where
    G: GitHubInterpreter + Sync,
{
    match run(github, GitHubEffect::ListPrFiles { pr }).await? {
        GitHubResponse::Files(files) => Ok(files),
        other => Err(unexpected("list_pr_files", other)),
    }
}

/// Returns whether `username` is a collaborator on the interpreter's repository.
pub async fn is_collaborator<G>(github: &G, username: &str) -> Result<bool, EffectError>
where
    G: GitHubInterpreter + Sync,
{
    let effect = GitHubEffect::CheckCollaborator {
        username: username.to_string(),
    };
    match run(github, effect).await? {
        GitHubResponse::IsCollaborator(yes) => Ok(yes),
        other => Err(unexpected("check_collaborator", other)),
    }
}

pub async fn request_reviewers<G>(
    github: &G,
    pr: PrNumber,
    reviewers: Vec<String>,
) -> Result<(), EffectError>
where
    G: GitHubInterpreter + Sync,
{
    match run(github, GitHubEffect::RequestReviewers { pr, reviewers }).await? {
        GitHubResponse::ReviewersRequested => Ok(()),
        other => Err(unexpected("request_reviewers", other)),
    }
}

pub async fn set_draft<G>(github: &G, pr_node_id: &str, draft: bool) -> Result<(), EffectError>
where
    G: GitHubInterpreter + Sync,
{
    let effect = GitHubEffect::SetDraft {
        pr_node_id: pr_node_id.to_string(),
        draft,
    };
    match run(github, effect).await? {
        GitHubResponse::DraftSet => Ok(()),
        other => Err(unexpected("set_draft", other)),
    }
}

pub async fn post_comment<G>(github: &G, pr: PrNumber, body: String) -> Result<(), EffectError>
where
    G: GitHubInterpreter + Sync,
{
    match run(github, GitHubEffect::PostComment { pr, body }).await? {
        GitHubResponse::CommentPosted => Ok(()),
        other => Err(unexpected("post_comment", other)),
    }
}
