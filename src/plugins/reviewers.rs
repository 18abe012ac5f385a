//! `reviewers`: requests reviews from a configured list of users, or from the
//! people named in the repository's `package.json`.
//!
//! Config keys:
//! - `reviewers`: candidate list (usernames or `Name <user@host>` strings).
//!   When absent, `contributors`, `maintainers` and `author` from
//!   `package.json` are used.
//! - `howMany`: request a random subset of this size.
//! - `commentFormat`: queue a comment with `%s` replaced by the `@user` list.

use std::sync::LazyLock;

use rand::seq::SliceRandom;
use regex::Regex;
use serde_json::Value;

use crate::commenter::{Commenter, Priority};
use crate::effects::{GitHubInterpreter, calls};

use super::{Plugin, PluginContext, PluginError, config_str};

/// Extracts `user` from `user@host` (the local part of an email address).
static REVIEWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9_-]+)@").expect("reviewer regex is valid"));

const PACKAGE_JSON_PATH: &str = "package.json";

#[derive(Debug, Clone, Default)]
pub struct ReviewersPlugin {
    default_comment_format: Option<String>,
}

impl ReviewersPlugin {
    pub fn new(default_comment_format: Option<String>) -> Self {
        ReviewersPlugin {
            default_comment_format,
        }
    }
}

/// Turns a raw candidate (string, or object with `email`) into a username.
fn candidate_username(candidate: &Value) -> Option<String> {
    let subject = match candidate {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("email").and_then(Value::as_str).unwrap_or(""),
        _ => return None,
    };

    let username = match REVIEWER_RE.captures(subject) {
        Some(caps) => caps.get(1).map_or(subject, |m| m.as_str()),
        None => subject,
    };
    (!username.is_empty()).then(|| username.to_string())
}

/// Normalizes candidates, drops the PR author and removes duplicates
/// (first occurrence wins).
fn usernames(candidates: &[Value], author: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in candidates.iter().filter_map(candidate_username) {
        if name != author && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

/// A `package.json` people field may be a list, a single string or a single
/// object.
fn people_field(package: &Value, key: &str) -> Vec<Value> {
    match package.get(key) {
        Some(Value::Array(items)) => items.clone(),
        Some(v @ (Value::String(_) | Value::Object(_))) => vec![v.clone()],
        _ => Vec::new(),
    }
}

fn package_candidates(package: &Value) -> Vec<Value> {
    let mut candidates = people_field(package, "contributors");
    candidates.extend(people_field(package, "maintainers"));
    if let Some(author) = package.get("author").filter(|a| !a.is_null()) {
        candidates.push(author.clone());
    }
    candidates
}

fn how_many(config: &Value) -> Result<Option<usize>, PluginError> {
    match config.get("howMany") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(0) => Ok(None),
            Some(n) => Ok(Some(usize::try_from(n).unwrap_or(usize::MAX))),
            None => Err(PluginError::InvalidConfig(format!(
                "`howMany` must be a positive integer, got {}",
                n
            ))),
        },
        Some(other) => Err(PluginError::InvalidConfig(format!(
            "`howMany` must be a number, got {}",
            other
        ))),
    }
}

impl ReviewersPlugin {
    async fn load_candidates<G>(&self, ctx: &PluginContext<'_, G>, config: &Value) -> Result<Vec<Value>, PluginError>
    where
        G: GitHubInterpreter + Sync,
    {
        match config.get("reviewers") {
            Some(Value::Array(items)) => return Ok(items.clone()),
            None | Some(Value::Null) => {}
            Some(other) => {
                return Err(PluginError::InvalidConfig(format!(
                    "`reviewers` must be a list, got {}",
                    other
                )));
            }
        }

        let Some(file) = calls::get_content(ctx.github, &ctx.event.repo, PACKAGE_JSON_PATH).await? else {
            return Ok(Vec::new());
        };
        let package: Value = file.decode_json()?.unwrap_or(Value::Null);
        Ok(package_candidates(&package))
    }

    /// Keeps candidates that are collaborators. A failed check drops the
    /// candidate rather than failing the plugin.
    async fn collaborators<G>(&self, ctx: &PluginContext<'_, G>, users: Vec<String>) -> Vec<String>
    where
        G: GitHubInterpreter + Sync,
    {
        let mut confirmed = Vec::with_capacity(users.len());
        for user in users {
            match calls::is_collaborator(ctx.github, &user).await {
                Ok(true) => confirmed.push(user),
                Ok(false) => {}
                Err(e) => {
                    tracing::debug!(user = %user, error = %e, "collaborator check failed, dropping candidate");
                }
            }
        }
        confirmed
    }
}

impl Plugin for ReviewersPlugin {
    fn name(&self) -> &'static str {
        "reviewers"
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
        let comment_format = config_str(config, "commentFormat")?
            .map(str::to_string)
            .or_else(|| self.default_comment_format.clone());
        let how_many = how_many(config)?;

        let candidates = self.load_candidates(ctx, config).await?;
        let users = usernames(&candidates, &ctx.event.author_login);
        let mut users = self.collaborators(ctx, users).await;
        if users.is_empty() {
            return Ok(());
        }

        if let Some(n) = how_many {
            users.shuffle(&mut rand::thread_rng());
            users.truncate(n);
        }
        users.sort();

        if let Some(format) = comment_format.filter(|f| !f.is_empty()) {
            let mentions: Vec<String> = users.iter().map(|u| format!("@{}", u)).collect();
            commenter.add_comment(format.replacen("%s", &mentions.join(", "), 1), Priority::Medium)?;
        }

        calls::request_reviewers(ctx.github, ctx.event.pr_number, users).await?;
        Ok(())
    }
}
