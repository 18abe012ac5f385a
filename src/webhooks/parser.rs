//! GitHub webhook payload parser.
//!
//! Parses raw webhook JSON payloads into [`PullRequestEvent`] values.
//!
//! # Parsing Strategy
//!
//! 1. The event type is determined from the `X-GitHub-Event` header
//! 2. Anything but `pull_request` returns `Ok(None)` (ignored, not error)
//! 3. Unknown pull request actions parse to [`PrAction::Other`]
//! 4. Malformed payloads return `Err` with details

use serde::Deserialize;
use thiserror::Error;

use crate::types::{PrNumber, RepoId};

use super::events::{PrAction, PullRequestEvent};

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Parses a webhook payload into a typed event.
///
/// * `Ok(Some(event))` - a `pull_request` event
/// * `Ok(None)` - any other event type
/// * `Err(e)` - malformed payload or missing required fields
///
/// # Examples
///
/// ```
/// use pullie::webhooks::parse_webhook;
///
/// let payload = br#"{
///     "action": "opened",
///     "pull_request": {
///         "number": 42,
///         "node_id": "PR_kwDO",
///         "title": "Add feature",
///         "user": { "login": "octocat" },
///         "author_association": "MEMBER"
///     },
///     "repository": {
///         "owner": { "login": "owner" },
///         "name": "repo",
///         "private": true
///     }
/// }"#;
///
/// let event = parse_webhook("pull_request", payload).unwrap().unwrap();
/// assert_eq!(event.title, "Add feature");
/// ```
pub fn parse_webhook(
    event_type: &str,
    payload: &[u8],
) -> Result<Option<PullRequestEvent>, ParseError> {
    match event_type {
        "pull_request" => parse_pull_request(payload).map(Some),
        _ => Ok(None),
    }
}

// ─── Raw Payload Structures ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawPullRequestPayload {
    action: String,
    pull_request: RawPullRequest,
    repository: RawRepository,
    enterprise: Option<RawEnterprise>,
    changes: Option<RawChanges>,
}

#[derive(Debug, Deserialize)]
struct RawPullRequest {
    number: u64,
    node_id: String,
    title: String,
    draft: Option<bool>,
    user: RawUser,
    #[serde(default)]
    author_association: String,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    owner: RawUser,
    name: String,
    #[serde(default)]
    private: bool,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawEnterprise {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RawChanges {
    title: Option<RawChangedField>,
}

#[derive(Debug, Deserialize)]
struct RawChangedField {
    from: String,
}

fn parse_pull_request(payload: &[u8]) -> Result<PullRequestEvent, ParseError> {
    let raw: RawPullRequestPayload = serde_json::from_slice(payload)?;
    let pr = raw.pull_request;

    Ok(PullRequestEvent {
        repo: RepoId::new(raw.repository.owner.login, raw.repository.name),
        repo_private: raw.repository.private,
        enterprise_id: raw.enterprise.map(|e| e.id),
        action: PrAction::from_webhook(&raw.action),
        pr_number: PrNumber(pr.number),
        node_id: pr.node_id,
        title: pr.title,
        is_draft: pr.draft.unwrap_or(false),
        author_login: pr.user.login,
        author_association: pr.author_association,
        previous_title: raw.changes.and_then(|c| c.title).map(|t| t.from),
    })
}
