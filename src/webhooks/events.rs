//! GitHub webhook event types.
//!
//! Only `pull_request` events drive the bot, and only three of their actions
//! (opened, edited, ready_for_review) are dispatched to plugins.

use serde::{Deserialize, Serialize};

use crate::types::{PrNumber, RepoId};

/// Action performed on a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrAction {
    /// PR was opened.
    Opened,
    /// PR was edited (title, body, or base branch changed).
    Edited,
    /// PR was marked ready for review.
    ReadyForReview,
    /// Any other action (closed, labeled, synchronize, ...). Never dispatched.
    Other,
}

impl PrAction {
    pub fn from_webhook(action: &str) -> Self {
        match action {
            "opened" => PrAction::Opened,
            "edited" => PrAction::Edited,
            "ready_for_review" => PrAction::ReadyForReview,
            _ => PrAction::Other,
        }
    }

    /// Returns true for the actions plugins are run for.
    pub fn is_dispatched(&self) -> bool {
        !matches!(self, PrAction::Other)
    }
}

/// A pull request event, reduced to the fields the dispatcher and plugins read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestEvent {
    pub repo: RepoId,

    /// Whether the repository is private.
    pub repo_private: bool,

    /// The GitHub Enterprise the repository belongs to, if any.
    pub enterprise_id: Option<u64>,

    pub action: PrAction,

    pub pr_number: PrNumber,

    /// GraphQL node ID of the PR (needed to toggle draft state).
    pub node_id: String,

    pub title: String,

    pub is_draft: bool,

    pub author_login: String,

    /// `author_association` from the payload, e.g. `FIRST_TIME_CONTRIBUTOR`.
    pub author_association: String,

    /// The title before this edit, when the edit changed it.
    pub previous_title: Option<String>,
}

impl PullRequestEvent {
    pub fn is_edit(&self) -> bool {
        self.action == PrAction::Edited
    }

    /// Returns true if this is an edit whose title differs from the previous one.
    pub fn title_changed(&self) -> bool {
        self.previous_title
            .as_deref()
            .is_some_and(|old| old != self.title)
    }
}
