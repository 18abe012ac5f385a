//! `welcome`: greets first-time contributors.
//!
//! GitHub marks the author of a PR with an `author_association`; the two
//! first-timer values trigger a low-priority greeting. `config.message`
//! replaces the default text.

use serde_json::Value;

use crate::commenter::{Commenter, Priority};
use crate::effects::GitHubInterpreter;

use super::{Plugin, PluginContext, PluginError, config_str};

const FIRST_TIMER_ASSOCIATIONS: [&str; 2] = ["FIRST_TIME_CONTRIBUTOR", "FIRST_TIMER"];

#[derive(Debug, Clone, Copy, Default)]
pub struct WelcomePlugin;

fn default_message(author: &str) -> String {
    format!(
        "Welcome @{}, and thanks for your first contribution to this repository! \
         A maintainer will take a look soon.",
        author
    )
}

impl Plugin for WelcomePlugin {
    fn name(&self) -> &'static str {
        "welcome"
    }

    async fn process_request<G>(
        &self,
        ctx: &PluginContext<'_, G>,
        commenter: &mut Commenter,
        config: &Value,
    ) -> Result<(), PluginError>
    where
        G: GitHubInterpreter + Sync,
    {
        let event = ctx.event;
        if !FIRST_TIMER_ASSOCIATIONS.contains(&event.author_association.as_str()) {
            return Ok(());
        }

        let message = match config_str(config, "message")? {
            Some(message) => message.to_string(),
            None => default_message(&event.author_login),
        };
        commenter.add_comment(message, Priority::Low)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockGitHub, pull_request_event};
    use crate::webhooks::{PrAction, PullRequestEvent};
    use serde_json::json;

    async fn run(association: &str, config: Value) -> (Result<(), PluginError>, Commenter) {
        let event = PullRequestEvent {
            author_association: association.to_string(),
            ..pull_request_event(PrAction::Opened)
        };
        let github = MockGitHub::new();
        let ctx = PluginContext {
            event: &event,
            github: &github,
        };
        let mut commenter = Commenter::new();
        let result = WelcomePlugin
            .process_request(&ctx, &mut commenter, &config)
            .await;
        (result, commenter)
    }

    #[tokio::test]
    async fn greets_first_time_contributors() {
        for association in FIRST_TIMER_ASSOCIATIONS {
            let (result, mut commenter) = run(association, json!({})).await;
            result.unwrap();
            let comment = commenter.flush_to_string().unwrap();
            assert!(comment.starts_with("Welcome @octocat"), "{}", comment);
        }
    }

    #[tokio::test]
    async fn configured_message_replaces_default() {
        let (result, mut commenter) =
            run("FIRST_TIMER", json!({ "message": "Hi there, read CONTRIBUTING.md" })).await;
        result.unwrap();
        assert_eq!(
            commenter.flush_to_string().unwrap(),
            "Hi there, read CONTRIBUTING.md"
        );
    }

    #[tokio::test]
    async fn ignores_returning_contributors() {
        for association in ["MEMBER", "CONTRIBUTOR", "OWNER", "NONE"] {
            let (result, commenter) = run(association, json!({})).await;
            result.unwrap();
            assert!(commenter.is_empty());
        }
    }

    #[tokio::test]
    async fn empty_configured_message_is_a_comment_error() {
        let (result, _) = run("FIRST_TIMER", json!({ "message": "" })).await;
        assert!(matches!(result, Err(PluginError::Comment(_))));
    }
}
