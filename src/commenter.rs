//! Per-event comment aggregation.
//!
//! Plugins never post to the pull request directly. Each one queues notices
//! on the event's [`Commenter`], and the dispatcher flushes the queue into a
//! single comment once every plugin has run. Notices are ordered by
//! descending [`Priority`]; notices of equal priority keep the order in which
//! they were queued, so output follows plugin invocation order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator placed between notices in the flushed comment body.
pub const COMMENT_SEPARATOR: &str = "\n\n---\n\n";

/// How prominently a notice should appear in the aggregated comment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Priority {
    /// Informational notices (ticket links, greetings).
    #[default]
    Low = 0,
    /// Notices about actions the bot took (review requests).
    Medium = 1,
    /// Problems the author should fix before merging.
    High = 2,
}

/// A single queued notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub message: String,
    pub priority: Priority,
}

/// Errors raised when a plugin queues an invalid notice.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommentError {
    /// The notice body was empty.
    #[error("comment message must not be empty")]
    EmptyMessage,
}

/// Collects prioritized notices for one pull request event.
#[derive(Debug, Default)]
pub struct Commenter {
    comments: Vec<Comment>,
}

impl Commenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a notice.
    ///
    /// An empty message is a plugin defect and is rejected rather than
    /// silently dropped.
    pub fn add_comment(
        &mut self,
        message: impl Into<String>,
        priority: Priority,
    ) -> Result<(), CommentError> {
        let message = message.into();
        if message.is_empty() {
            return Err(CommentError::EmptyMessage);
        }

        self.comments.push(Comment { message, priority });
        Ok(())
    }

    /// Returns the notices queued so far, in insertion order.
    pub fn pending(&self) -> &[Comment] {
        &self.comments
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Drains the queue into one comment body.
    ///
    /// Returns `None` when nothing is queued. A second call right after a
    /// flush therefore also returns `None`.
    pub fn flush_to_string(&mut self) -> Option<String> {
        if self.comments.is_empty() {
            return None;
        }

        let mut comments = std::mem::take(&mut self.comments);
        // `sort_by` is stable, so equal priorities keep insertion order.
        comments.sort_by(|a, b| b.priority.cmp(&a.priority));

        let body = comments
            .into_iter()
            .map(|c| c.message)
            .collect::<Vec<_>>()
            .join(COMMENT_SEPARATOR);

        Some(body)
    }
}
