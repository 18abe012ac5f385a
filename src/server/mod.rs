//! HTTP server for the pull request bot.
//!
//! # Endpoints
//!
//! - `POST /webhook` - Accepts GitHub webhook deliveries and processes pull
//!   request events before responding
//! - `GET /health` - Returns 200 if server is running

use std::sync::Arc;

use octocrab::Octocrab;

use crate::effects::GitHubInterpreter;
use crate::github::OctocrabClient;
use crate::plugins::PluginRegistry;
use crate::settings::Settings;
use crate::types::RepoId;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::{WebhookError, webhook_handler};

/// Produces a GitHub interpreter scoped to the repository an event came from.
pub trait GitHubConnector: Send + Sync + 'static {
    type Client: GitHubInterpreter + Send + Sync;

    fn connect(&self, repo: &RepoId) -> Self::Client;
}

impl GitHubConnector for Octocrab {
    type Client = OctocrabClient;

    fn connect(&self, repo: &RepoId) -> OctocrabClient {
        OctocrabClient::new(self.clone(), repo.clone())
    }
}

/// Shared application state, passed to handlers via axum's `State`
/// extractor. Everything in it is read-only after startup.
pub struct AppState<C> {
    inner: Arc<AppStateInner<C>>,
}

// Manual impl: `C` itself need not be `Clone`.
impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct AppStateInner<C> {
    connector: C,
    settings: Settings,
    registry: PluginRegistry,

    /// Webhook secret for HMAC-SHA256 signature verification.
    webhook_secret: Vec<u8>,
}

impl<C: GitHubConnector> AppState<C> {
    /// Builds the state, including the plugin registry derived from
    /// `settings`.
    pub fn new(connector: C, settings: Settings, webhook_secret: impl Into<Vec<u8>>) -> Self {
        let registry = PluginRegistry::new(&settings);
        AppState {
            inner: Arc::new(AppStateInner {
                connector,
                settings,
                registry,
                webhook_secret: webhook_secret.into(),
            }),
        }
    }

    pub fn connector(&self) -> &C {
        &self.inner.connector
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.inner.registry
    }

    pub fn webhook_secret(&self) -> &[u8] {
        &self.inner.webhook_secret
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<C: GitHubConnector>(app_state: AppState<C>) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler::<C>))
        .route("/health", get(health_handler))
        .with_state(app_state)
}
