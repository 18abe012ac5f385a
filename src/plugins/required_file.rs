//! `requiredFile`: warns when a PR does not touch files the repository
//! requires every change to update (a changelog, for instance).
//!
//! ```json
//! { "plugin": "requiredFile",
//!   "config": { "files": ["CHANGELOG.md", { "path": "docs/api.md", "message": "Update the API docs" }] } }
//! ```
//!
//! A required file that does not exist in the repository is not enforced.

use serde_json::{Map, Value};

use crate::commenter::{Commenter, Priority};
use crate::effects::{GitHubInterpreter, calls};

use super::{Plugin, PluginContext, PluginError};

/// One entry of the `files` list.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RequiredFile {
    path: String,
    message: Option<String>,
}

impl RequiredFile {
    fn from_value(value: &Value) -> Result<Self, PluginError> {
        let (path, message) = match value {
            Value::String(path) => (Some(path.as_str()), None),
            Value::Object(map) => (
                map.get("path").and_then(Value::as_str),
                map.get("message")
                    .and_then(Value::as_str)
                    .filter(|m| !m.is_empty()),
            ),
            _ => (None, None),
        };

        match path {
            Some(path) if !path.is_empty() => Ok(RequiredFile {
                path: path.to_string(),
                message: message.map(str::to_string),
            }),
            _ => Err(PluginError::InvalidConfig(
                "no file path specified for required file".to_string(),
            )),
        }
    }

    fn warning(&self) -> String {
        match &self.message {
            Some(message) => format!("⚠️ {}", message),
            None => format!(
                "⚠️ You're missing a change to {}, which is a requirement for changes to this repo.",
                self.path
            ),
        }
    }
}

fn required_files(config: &Value) -> Result<Vec<RequiredFile>, PluginError> {
    match config.get("files") {
        None | Some(Value::Null) => Err(PluginError::InvalidConfig(
            "missing `files` field in plugin config".to_string(),
        )),
        Some(Value::Array(items)) => items.iter().map(RequiredFile::from_value).collect(),
        Some(other) => Err(PluginError::InvalidConfig(format!(
            "`files` must be a list, got {}",
            other
        ))),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredFilePlugin;

impl Plugin for RequiredFilePlugin {
    fn name(&self) -> &'static str {
        "requiredFile"
    }

    /// Shallow merge, except that `files` always comes from `overrides`
    /// (and disappears when `overrides` has none). Lists of files are never
    /// concatenated across layers.
    fn merge_config(&self, base: &Value, overrides: &Value) -> Value {
        let Some(override_map) = overrides.as_object() else {
            return base.clone();
        };

        let mut merged: Map<String, Value> = base.as_object().cloned().unwrap_or_default();
        merged.remove("files");
        for (key, value) in override_map {
            merged.insert(key.clone(), value.clone());
        }
        Value::Object(merged)
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
        let files = required_files(config)?;
        let mut changed: Option<Vec<String>> = None;

        for file in &files {
            if calls::get_content(ctx.github, &ctx.event.repo, &file.path)
                .await?
                .is_none()
            {
                tracing::debug!(path = %file.path, "required file not in repository, skipping");
                continue;
            }

            if changed.is_none() {
                changed = Some(calls::list_pr_files(ctx.github, ctx.event.pr_number).await?);
            }
            let changed_files = changed.as_deref().unwrap_or_default();

            if !changed_files.iter().any(|f| f == &file.path) {
                commenter.add_comment(file.warning(), Priority::High)?;
            }
        }

        Ok(())
    }
}
