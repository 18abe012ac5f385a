//! Pull request plugins and the registry that names them.
//!
//! Every plugin implements [`Plugin`]. The set of plugins is fixed at build
//! time and enumerated by [`PluginKind`]; [`PluginRegistry`] maps the
//! case-sensitive names used in `.pullierc` files to instances.

use std::collections::HashMap;
use std::future::Future;

use serde_json::Value;
use thiserror::Error;

use crate::commenter::{CommentError, Commenter};
use crate::effects::{ContentError, EffectError, GitHubInterpreter};
use crate::pullierc::{PluginCatalog, shallow_merge};
use crate::settings::Settings;
use crate::webhooks::PullRequestEvent;

pub mod jira;
pub mod required_file;
pub mod reviewers;
pub mod welcome;
pub mod wip;

pub use jira::{JiraError, JiraPlugin};
pub use required_file::RequiredFilePlugin;
pub use reviewers::ReviewersPlugin;
pub use welcome::WelcomePlugin;
pub use wip::WipPlugin;

/// Errors a plugin can fail with. The dispatcher logs these and moves on.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The plugin's `.pullierc` configuration is unusable.
    #[error("invalid plugin config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    GitHub(#[from] EffectError),

    #[error("failed to decode repository file: {0}")]
    Content(#[from] ContentError),

    #[error(transparent)]
    Jira(#[from] JiraError),

    #[error(transparent)]
    Comment(#[from] CommentError),
}

/// What a plugin sees of the event it is processing.
pub struct PluginContext<'a, G> {
    pub event: &'a PullRequestEvent,

    /// Interpreter scoped to the event's repository.
    pub github: &'a G,
}

/// The capability contract shared by all plugins.
pub trait Plugin {
    /// Name used to reference the plugin in `.pullierc`.
    fn name(&self) -> &'static str;

    /// Whether the plugin runs for `edited` actions.
    fn processes_edits(&self) -> bool {
        false
    }

    /// Whether the plugin runs for `ready_for_review` actions.
    fn processes_ready_for_review(&self) -> bool {
        false
    }

    /// Merges a repository's config for this plugin over the organization's.
    fn merge_config(&self, base: &Value, overrides: &Value) -> Value {
        shallow_merge(base, overrides)
    }

    /// Processes one event, queueing any notices on `commenter`.
    fn process_request<G>(
        &self,
        ctx: &PluginContext<'_, G>,
        commenter: &mut Commenter,
        config: &Value,
    ) -> impl Future<Output = Result<(), PluginError>> + Send
    where
        G: GitHubInterpreter + Sync;
}

/// One of the built-in plugins.
#[derive(Debug, Clone)]
pub enum PluginKind {
    Jira(JiraPlugin),
    RequiredFile(RequiredFilePlugin),
    Reviewers(ReviewersPlugin),
    Welcome(WelcomePlugin),
    Wip(WipPlugin),
}

macro_rules! each_plugin {
    ($kind:expr, $p:ident => $body:expr) => {
        match $kind {
            PluginKind::Jira($p) => $body,
            PluginKind::RequiredFile($p) => $body,
            PluginKind::Reviewers($p) => $body,
            PluginKind::Welcome($p) => $body,
            PluginKind::Wip($p) => $body,
        }
    };
}

impl PluginKind {
    pub fn name(&self) -> &'static str {
        each_plugin!(self, p => p.name())
    }

    pub fn processes_edits(&self) -> bool {
        each_plugin!(self, p => p.processes_edits())
    }

    pub fn processes_ready_for_review(&self) -> bool {
        each_plugin!(self, p => p.processes_ready_for_review())
    }

    pub fn merge_config(&self, base: &Value, overrides: &Value) -> Value {
        each_plugin!(self, p => p.merge_config(base, overrides))
    }

    pub async fn process_request<G>(
        &self,
        ctx: &PluginContext<'_, G>,
        commenter: &mut Commenter,
        config: &Value,
    ) -> Result<(), PluginError>
    where
        G: GitHubInterpreter + Sync,
    {
        each_plugin!(self, p => p.process_request(ctx, commenter, config).await)
    }
}

/// Name-to-plugin lookup. Built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct PluginRegistry {
    plugins: HashMap<&'static str, PluginKind>,
}

impl PluginRegistry {
    /// Builds the registry of all built-in plugins.
    pub fn new(settings: &Settings) -> Self {
        Self::from_plugins([
            PluginKind::Jira(JiraPlugin::new(settings.jira.clone())),
            PluginKind::RequiredFile(RequiredFilePlugin),
            PluginKind::Reviewers(ReviewersPlugin::new(
                settings.reviewers_comment_format.clone(),
            )),
            PluginKind::Welcome(WelcomePlugin),
            PluginKind::Wip(WipPlugin),
        ])
    }

    pub fn from_plugins(plugins: impl IntoIterator<Item = PluginKind>) -> Self {
        PluginRegistry {
            plugins: plugins.into_iter().map(|p| (p.name(), p)).collect(),
        }
    }

    /// Looks up a plugin by exact name.
    pub fn get(&self, name: &str) -> Option<&PluginKind> {
        self.plugins.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.plugins.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl PluginCatalog for PluginRegistry {
    fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    fn merge_plugin_config(&self, name: &str, base: &Value, overrides: &Value) -> Value {
        match self.get(name) {
            Some(plugin) => plugin.merge_config(base, overrides),
            None => shallow_merge(base, overrides),
        }
    }
}

/// Reads an optional string field from a plugin config object.
pub(crate) fn config_str<'a>(config: &'a Value, key: &str) -> Result<Option<&'a str>, PluginError> {
    match config.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(PluginError::InvalidConfig(format!(
            "`{}` must be a string, got {}",
            key, other
        ))),
    }
}
