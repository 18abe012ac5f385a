//! Shared test utilities: a scripted GitHub interpreter, event builders and
//! arbitrary generators for property-based testing.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use serde_json::json;
use thiserror::Error;

use crate::commenter::Priority;
use crate::effects::{FileContent, GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::pullierc::{PluginList, PluginRef};
use crate::server::GitHubConnector;
use crate::types::{PrNumber, RepoId};
use crate::webhooks::{PrAction, PullRequestEvent};

// ─── MockGitHub ───────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("mock GitHub failure for {0}")]
pub struct MockError(pub String);

/// In-memory GitHub interpreter.
///
/// Answers from scripted repository files, PR files and collaborators, and
/// records every effect it receives. Effects can be made to fail by name
/// (see [`GitHubEffect::name`]) or, for content, by path.
#[derive(Default)]
pub struct MockGitHub {
    files: HashMap<(RepoId, String), FileContent>,
    pr_files: Vec<String>,
    collaborators: HashSet<String>,
    failing_effects: HashSet<&'static str>,
    failing_paths: HashSet<(RepoId, String)>,
    failing_users: HashSet<String>,
    recorded: Mutex<Vec<GitHubEffect>>,
}

impl MockGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text file to `repo`.
    pub fn with_file(mut self, repo: &RepoId, path: &str, text: &str) -> Self {
        self.files.insert(
            (repo.clone(), path.to_string()),
            FileContent::from_text(path, text),
        );
        self
    }

    /// Adds a JSON file to `repo`.
    pub fn with_json(self, repo: &RepoId, path: &str, value: serde_json::Value) -> Self {
        let text = value.to_string();
        self.with_file(repo, path, &text)
    }

    /// Adds a file whose content is not valid base64.
    pub fn with_corrupt_file(mut self, repo: &RepoId, path: &str) -> Self {
        self.files.insert(
            (repo.clone(), path.to_string()),
            FileContent {
                path: path.to_string(),
                content: Some("%%% not base64 %%%".to_string()),
            },
        );
        self
    }

    pub fn with_pr_files(mut self, files: &[&str]) -> Self {
        self.pr_files = files.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_collaborators(mut self, users: &[&str]) -> Self {
        self.collaborators = users.iter().map(|u| u.to_string()).collect();
        self
    }

    /// Makes every effect with this name fail.
    pub fn failing(mut self, effect_name: &'static str) -> Self {
        self.failing_effects.insert(effect_name);
        self
    }

    /// Makes `GetContent` for this file fail (as opposed to returning 404).
    pub fn failing_content(mut self, repo: &RepoId, path: &str) -> Self {
        self.failing_paths.insert((repo.clone(), path.to_string()));
        self
    }

    /// Makes `CheckCollaborator` fail for this user only.
    pub fn failing_collaborator_check(mut self, user: &str) -> Self {
        self.failing_users.insert(user.to_string());
        self
    }

    /// Returns every effect received so far, in order.
    pub fn effects(&self) -> Vec<GitHubEffect> {
        self.recorded
            .lock()
            .map(|effects| effects.clone())
            .unwrap_or_default()
    }

    /// Returns the bodies of all posted comments.
    pub fn posted_comments(&self) -> Vec<String> {
        self.effects()
            .into_iter()
            .filter_map(|e| match e {
                GitHubEffect::PostComment { body, .. } => Some(body),
                _ => None,
            })
            .collect()
    }

    /// Returns how many effects with this name were received.
    pub fn count(&self, effect_name: &str) -> usize {
        self.effects()
            .iter()
            .filter(|e| e.name() == effect_name)
            .count()
    }

    fn respond(&self, effect: &GitHubEffect) -> Result<GitHubResponse, MockError> {
        if self.failing_effects.contains(effect.name()) {
            return Err(MockError(effect.name().to_string()));
        }

        match effect {
            GitHubEffect::GetContent { repo, path } => {
                let key = (repo.clone(), path.clone());
                if self.failing_paths.contains(&key) {
                    return Err(MockError(format!("get_content {}/{}", repo, path)));
                }
                Ok(GitHubResponse::Content(self.files.get(&key).cloned()))
            }
            GitHubEffect::ListPrFiles { .. } => Ok(GitHubResponse::Files(self.pr_files.clone())),
            GitHubEffect::CheckCollaborator { username } => {
                if self.failing_users.contains(username) {
                    return Err(MockError(format!("check_collaborator {}", username)));
                }
                Ok(GitHubResponse::IsCollaborator(
                    self.collaborators.contains(username),
                ))
            }
            GitHubEffect::RequestReviewers { .. } => Ok(GitHubResponse::ReviewersRequested),
            GitHubEffect::SetDraft { .. } => Ok(GitHubResponse::DraftSet),
            GitHubEffect::PostComment { .. } => Ok(GitHubResponse::CommentPosted),
        }
    }
}

impl GitHubInterpreter for MockGitHub {
    type Error = MockError;

    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send {
        let result = self.respond(&effect);
        if let Ok(mut recorded) = self.recorded.lock() {
            recorded.push(effect);
        }
        async move { result }
    }
}

impl GitHubInterpreter for Arc<MockGitHub> {
    type Error = MockError;

    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send {
        self.as_ref().interpret(effect)
    }
}

/// Every repository shares the one mock, so tests can inspect what the
/// server did.
impl GitHubConnector for Arc<MockGitHub> {
    type Client = Arc<MockGitHub>;

    fn connect(&self, _repo: &RepoId) -> Arc<MockGitHub> {
        Arc::clone(self)
    }
}

// ─── Event Builders ───────────────────────────────────────────────────────────

/// The repository used by [`pull_request_event`].
pub fn test_repo() -> RepoId {
    RepoId::new("acme", "widgets")
}

/// A pull request event on `acme/widgets` #7 by `octocat`.
pub fn pull_request_event(action: PrAction) -> PullRequestEvent {
    PullRequestEvent {
        repo: test_repo(),
        repo_private: true,
        enterprise_id: None,
        action,
        pr_number: PrNumber(7),
        node_id: "PR_kwDOtest7".to_string(),
        title: "Add widgets".to_string(),
        is_draft: false,
        author_login: "octocat".to_string(),
        author_association: "MEMBER".to_string(),
        previous_title: None,
    }
}

/// An `edited` event whose title changed from `from` to `to`.
pub fn title_edit_event(from: &str, to: &str) -> PullRequestEvent {
    PullRequestEvent {
        title: to.to_string(),
        previous_title: Some(from.to_string()),
        ..pull_request_event(PrAction::Edited)
    }
}

// ─── Strategies ───────────────────────────────────────────────────────────────

pub fn arb_pr_number() -> impl Strategy<Value = PrNumber> {
    any::<u64>().prop_map(PrNumber)
}

pub fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::Low),
        Just(Priority::Medium),
        Just(Priority::High),
    ]
}

/// Plugin names, including one (`fake`) that no catalog knows.
pub fn arb_plugin_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["one", "two", "three", "four", "fake"])
}

pub fn arb_plugin_ref() -> impl Strategy<Value = PluginRef> {
    prop_oneof![
        arb_plugin_name().prop_map(|n| PluginRef::named(n)),
        (arb_plugin_name(), any::<u8>())
            .prop_map(|(n, v)| PluginRef::configured(n, json!({ "v": v }))),
        arb_plugin_name().prop_map(|n| PluginRef::Configured {
            plugin: n.to_string(),
            config: None,
        }),
    ]
}

/// A plugin list with no two entries naming the same plugin.
pub fn arb_unique_plugin_list() -> impl Strategy<Value = PluginList> {
    prop::collection::vec(arb_plugin_ref(), 0..6).prop_map(|refs| {
        let mut out: PluginList = Vec::new();
        for r in refs {
            if !out.iter().any(|o| o.same_plugin(&r)) {
                out.push(r);
            }
        }
        out
    })
}
