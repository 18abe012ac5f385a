//! `wip`: keeps draft state in step with a `WIP` marker in the PR title.
//!
//! A non-draft PR whose title contains the word `WIP` is converted to a
//! draft. Editing `WIP` out of a draft PR's title marks it ready for review.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::commenter::Commenter;
use crate::effects::{GitHubInterpreter, calls};

use super::{Plugin, PluginContext, PluginError};

static WIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bWIP\b").expect("WIP regex is valid"));

fn has_wip(title: &str) -> bool {
    WIP_RE.is_match(title)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WipPlugin;

impl WipPlugin {
    /// Returns the draft state the PR should move to, if any.
    fn desired_draft_state(
        title: &str,
        is_draft: bool,
        previous_title: Option<&str>,
    ) -> Option<bool> {
        if has_wip(title) {
            return (!is_draft).then_some(true);
        }
        match previous_title {
            Some(old) if is_draft && has_wip(old) => Some(false),
            _ => None,
        }
    }
}

impl Plugin for WipPlugin {
    fn name(&self) -> &'static str {
        "wip"
    }

    fn processes_edits(&self) -> bool {
        true
    }

    async fn process_request<G>(
        &self,
        ctx: &PluginContext<'_, G>,
        _commenter: &mut Commenter,
        _config: &Value,
    ) -> Result<(), PluginError>
    where
        G: GitHubInterpreter + Sync,
    {
        let event = ctx.event;
        if event.is_edit() && !event.title_changed() {
            return Ok(());
        }

        let previous_title = event.previous_title.as_deref().filter(|_| event.is_edit());
        let Some(draft) = Self::desired_draft_state(&event.title, event.is_draft, previous_title)
        else {
            return Ok(());
        };

        tracing::info!(pr = %event.pr_number, draft, "updating draft state from title");
        calls::set_draft(ctx.github, &event.node_id, draft).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::GitHubEffect;
    use crate::test_utils::{MockGitHub, pull_request_event, title_edit_event};
    use crate::webhooks::{PrAction, PullRequestEvent};
    use serde_json::json;

    async fn run(event: &PullRequestEvent, github: &MockGitHub) -> Result<(), PluginError> {
        let ctx = PluginContext { event, github };
        WipPlugin
            .process_request(&ctx, &mut Commenter::new(), &json!({}))
            .await
    }

    fn draft_changes(github: &MockGitHub) -> Vec<bool> {
        github
            .effects()
            .into_iter()
            .filter_map(|e| match e {
                GitHubEffect::SetDraft { draft, .. } => Some(draft),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn wip_must_be_a_whole_word() {
        assert!(has_wip("WIP: widgets"));
        assert!(has_wip("[WIP] widgets"));
        assert!(has_wip("widgets (WIP)"));
        assert!(!has_wip("SWIPE left"));
        assert!(!has_wip("wip lowercase"));
    }

    #[tokio::test]
    async fn opened_wip_pr_becomes_draft() {
        let github = MockGitHub::new();
        let event = PullRequestEvent {
            title: "WIP: widgets".to_string(),
            ..pull_request_event(PrAction::Opened)
        };

        run(&event, &github).await.unwrap();

        assert_eq!(
            github.effects(),
            vec![GitHubEffect::SetDraft {
                pr_node_id: "PR_kwDOtest7".to_string(),
                draft: true,
            }]
        );
    }

    #[tokio::test]
    async fn already_draft_wip_pr_is_left_alone() {
        let github = MockGitHub::new();
        let event = PullRequestEvent {
            title: "WIP: widgets".to_string(),
            is_draft: true,
            ..pull_request_event(PrAction::Opened)
        };

        run(&event, &github).await.unwrap();
        assert!(draft_changes(&github).is_empty());
    }

    #[tokio::test]
    async fn removing_wip_from_draft_marks_ready() {
        let github = MockGitHub::new();
        let event = PullRequestEvent {
            is_draft: true,
            ..title_edit_event("WIP: widgets", "widgets")
        };

        run(&event, &github).await.unwrap();
        assert_eq!(draft_changes(&github), vec![false]);
    }

    #[tokio::test]
    async fn keeping_wip_in_a_draft_title_does_nothing() {
        let github = MockGitHub::new();
        let event = PullRequestEvent {
            is_draft: true,
            ..title_edit_event("WIP: widgets", "WIP: more widgets")
        };

        run(&event, &github).await.unwrap();
        assert!(draft_changes(&github).is_empty());
    }

    #[tokio::test]
    async fn adding_wip_on_edit_converts_to_draft() {
        let github = MockGitHub::new();
        run(&title_edit_event("widgets", "WIP widgets"), &github)
            .await
            .unwrap();
        assert_eq!(draft_changes(&github), vec![true]);
    }

    #[tokio::test]
    async fn edit_without_title_change_is_ignored() {
        let github = MockGitHub::new();
        let event = PullRequestEvent {
            title: "WIP: widgets".to_string(),
            ..pull_request_event(PrAction::Edited)
        };

        run(&event, &github).await.unwrap();
        assert!(github.effects().is_empty());
    }

    #[tokio::test]
    async fn draft_update_failure_is_an_error() {
        let github = MockGitHub::new().failing("set_draft");
        let event = PullRequestEvent {
            title: "WIP".to_string(),
            ..pull_request_event(PrAction::Opened)
        };

        assert!(matches!(
            run(&event, &github).await,
            Err(PluginError::GitHub(_))
        ));
    }
}
