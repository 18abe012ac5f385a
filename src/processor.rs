//! Per-event dispatch.
//!
//! [`process_pull_request`] takes one pull request event through admission,
//! configuration loading, the plugin loop and the final comment. Each step
//! either continues or ends processing for the event; nothing is retried and
//! no failure escapes to the caller.

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::commenter::Commenter;
use crate::effects::{GitHubInterpreter, calls};
use crate::plugins::{PluginContext, PluginRegistry};
use crate::pullierc::{load_pullierc, resolve_config_with};
use crate::settings::Settings;
use crate::types::DeliveryId;
use crate::webhooks::{PrAction, PullRequestEvent};

/// Why an event was turned away before any configuration was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The event's enterprise does not match `GH_ENTERPRISE_ID`.
    Enterprise,
    /// The repository is public and `NO_PUBLIC_REPOS` is set.
    PublicRepository,
}

/// What happened in the plugin loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Plugins whose `process_request` completed.
    pub succeeded: Vec<&'static str>,
    /// Plugins whose `process_request` returned an error.
    pub failed: Vec<&'static str>,
    /// Plugins not run because of the event action.
    pub filtered: Vec<&'static str>,
    /// Plugin references that did not resolve to a registered plugin.
    pub unknown: Vec<String>,
    pub comment_posted: bool,
}

/// How processing of one event ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Rejected(Rejection),
    /// The repository has no `.pullierc`.
    NoRepoConfig,
    /// The repository's `.pullierc` could not be fetched or decoded.
    RepoConfigFailed,
    /// The effective configuration enables no plugins.
    NoPlugins,
    Dispatched(DispatchReport),
}

fn admission(event: &PullRequestEvent, settings: &Settings) -> Result<(), Rejection> {
    if !settings.enterprise.admits(event.enterprise_id) {
        return Err(Rejection::Enterprise);
    }
    if settings.no_public_repos && !event.repo_private {
        return Err(Rejection::PublicRepository);
    }
    Ok(())
}

/// Processes one pull request event end to end.
///
/// Plugins run sequentially in configuration order against a fresh
/// [`Commenter`]. A failing plugin is logged and the loop moves on; whatever
/// the remaining plugins queued is posted as a single comment.
pub async fn process_pull_request<G>(
    event: &PullRequestEvent,
    github: &G,
    settings: &Settings,
    registry: &PluginRegistry,
    delivery_id: &DeliveryId,
) -> DispatchOutcome
where
    G: GitHubInterpreter + Sync,
{
    let repo = &event.repo;
    let pr = event.pr_number;

    if let Err(rejection) = admission(event, settings) {
        info!(
            repo = %repo,
            pr = %pr,
            delivery_id = %delivery_id,
            reason = ?rejection,
            "Event not admitted"
        );
        return DispatchOutcome::Rejected(rejection);
    }

    let repo_config = match load_pullierc(github, repo).await {
        Ok(Some(config)) => config,
        Ok(None) => {
            info!(repo = %repo, delivery_id = %delivery_id, "No .pullierc in repository");
            return DispatchOutcome::NoRepoConfig;
        }
        Err(e) => {
            error!(repo = %repo, delivery_id = %delivery_id, error = %e, "Failed to load repository config");
            return DispatchOutcome::RepoConfigFailed;
        }
    };

    let org_repo = repo.org_meta_repo();
    let org_config = match load_pullierc(github, &org_repo).await {
        Ok(config) => config,
        Err(e) => {
            warn!(
                repo = %org_repo,
                delivery_id = %delivery_id,
                error = %e,
                "Failed to load organization config, continuing without it"
            );
            None
        }
    };

    let resolved = resolve_config_with(org_config.as_ref(), Some(&repo_config), registry, |name| {
        error!(repo = %repo, plugin = name, delivery_id = %delivery_id, "Invalid plugin in .pullierc");
    });

    let plugin_refs = resolved.plugin_list();
    if plugin_refs.is_empty() {
        info!(repo = %repo, pr = %pr, delivery_id = %delivery_id, "No plugins enabled");
        return DispatchOutcome::NoPlugins;
    }

    let ctx = PluginContext { event, github };
    let mut commenter = Commenter::new();
    let mut report = DispatchReport::default();
    let empty_config = Value::Object(Default::default());

    for plugin_ref in plugin_refs {
        let Some(plugin) = plugin_ref.name().and_then(|name| registry.get(name)) else {
            error!(
                repo = %repo,
                pr = %pr,
                plugin = %plugin_ref.describe(),
                delivery_id = %delivery_id,
                "Plugin not found"
            );
            report.unknown.push(plugin_ref.describe());
            continue;
        };

        let eligible = match event.action {
            PrAction::Edited => plugin.processes_edits(),
            PrAction::ReadyForReview => plugin.processes_ready_for_review(),
            PrAction::Opened | PrAction::Other => true,
        };
        if !eligible {
            debug!(plugin = plugin.name(), action = ?event.action, "Plugin does not handle this action");
            report.filtered.push(plugin.name());
            continue;
        }

        let config = plugin_ref.config().unwrap_or(&empty_config);
        match plugin.process_request(&ctx, &mut commenter, config).await {
            Ok(()) => {
                debug!(repo = %repo, pr = %pr, plugin = plugin.name(), "Plugin finished");
                report.succeeded.push(plugin.name());
            }
            Err(e) => {
                error!(
                    repo = %repo,
                    pr = %pr,
                    plugin = plugin.name(),
                    delivery_id = %delivery_id,
                    error = %e,
                    "Plugin failed"
                );
                report.failed.push(plugin.name());
            }
        }
    }

    if let Some(body) = commenter.flush_to_string() {
        match calls::post_comment(github, pr, body).await {
            Ok(()) => {
                info!(repo = %repo, pr = %pr, delivery_id = %delivery_id, "Posted comment");
                report.comment_posted = true;
            }
            Err(e) => {
                error!(
                    repo = %repo,
                    pr = %pr,
                    delivery_id = %delivery_id,
                    error = %e,
                    "Failed to post comment"
                );
            }
        }
    }

    DispatchOutcome::Dispatched(report)
}
