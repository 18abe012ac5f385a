//! GitHub API effect types.
//!
//! These describe the GitHub operations plugins and the dispatcher need,
//! without executing them. An interpreter scoped to the event's repository
//! runs them; tests substitute an in-memory interpreter.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{PrNumber, RepoId};

/// A GitHub API effect.
///
/// Effects other than `GetContent` are scoped to the repository the
/// interpreter was built for. `GetContent` names its repository because
/// organization configuration is read from `<owner>/.github`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GitHubEffect {
    // ─── Repository Contents ──────────────────────────────────────────────────
    /// Fetch a file from a repository's default branch.
    GetContent { repo: RepoId, path: String },

    // ─── Pull Requests ────────────────────────────────────────────────────────
    /// List the paths of all files changed by a PR.
    ListPrFiles { pr: PrNumber },

    /// Request reviews from the given users.
    RequestReviewers { pr: PrNumber, reviewers: Vec<String> },

    /// Convert a PR to draft (`draft: true`) or mark it ready for review.
    ///
    /// Uses the PR's GraphQL node ID, since REST cannot toggle draft state.
    SetDraft { pr_node_id: String, draft: bool },

    // ─── Comments ─────────────────────────────────────────────────────────────
    /// Post a new comment on a PR.
    PostComment { pr: PrNumber, body: String },

    // ─── Collaborators ────────────────────────────────────────────────────────
    /// Check whether a user is a collaborator on the repository.
    CheckCollaborator { username: String },
}

impl GitHubEffect {
    /// Short name for log fields and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            GitHubEffect::GetContent { .. } => "get_content",
            GitHubEffect::ListPrFiles { .. } => "list_pr_files",
            GitHubEffect::RequestReviewers { .. } => "request_reviewers",
            GitHubEffect::SetDraft { .. } => "set_draft",
            GitHubEffect::PostComment { .. } => "post_comment",
            GitHubEffect::CheckCollaborator { .. } => "check_collaborator",
        }
    }
}

// ─── Response Types ───────────────────────────────────────────────────────────

/// A file fetched through the contents API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileContent {
    /// Path of the file within its repository.
    pub path: String,

    /// Base64 content as returned by GitHub (may contain line breaks).
    /// `None` for entries without inline content, such as directories.
    pub content: Option<String>,
}

/// Errors decoding a [`FileContent`].
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("invalid base64 content: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid JSON content: {0}")]
    Json(#[from] serde_json::Error),
}

impl FileContent {
    /// Builds a file from plain text, encoding it the way GitHub does.
    pub fn from_text(path: impl Into<String>, text: &str) -> Self {
        FileContent {
            path: path.into(),
            content: Some(STANDARD.encode(text)),
        }
    }

    /// Decodes the raw bytes. Returns `None` when there is no inline content.
    pub fn decode_bytes(&self) -> Result<Option<Vec<u8>>, ContentError> {
        let Some(content) = &self.content else {
            return Ok(None);
        };
        let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
        Ok(Some(STANDARD.decode(compact)?))
    }

    /// Decodes the content as JSON. Returns `None` when there is no inline content.
    pub fn decode_json<T: DeserializeOwned>(&self) -> Result<Option<T>, ContentError> {
        match self.decode_bytes()? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

/// Response from a GitHub effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GitHubResponse {
    /// Response to `GetContent`. `None` means the file does not exist (HTTP 404).
    Content(Option<FileContent>),

    /// Response to `ListPrFiles`.
    Files(Vec<String>),

    /// Response to `CheckCollaborator`.
    IsCollaborator(bool),

    /// Response to `RequestReviewers`.
    ReviewersRequested,

    /// Response to `SetDraft`.
    DraftSet,

    /// Response to `PostComment`.
    CommentPosted,
}
