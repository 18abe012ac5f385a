use std::process::ExitCode;

use pullie::github::OctocrabClient;
use pullie::server::{AppState, build_router};
use pullie::settings::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pullie=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let (Some(token), Some(secret)) = (settings.github_token.clone(), settings.webhook_secret.clone())
    else {
        tracing::error!("GITHUB_TOKEN and WEBHOOK_SECRET must both be set");
        return ExitCode::FAILURE;
    };

    let octocrab = match OctocrabClient::build_octocrab(&token, settings.github_api_url.as_deref()) {
        Ok(octocrab) => octocrab,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build GitHub client");
            return ExitCode::FAILURE;
        }
    };

    let addr = settings.bind_addr;
    tracing::debug!(settings = ?settings, "Loaded settings");
    let app = build_router(AppState::new(octocrab, settings, secret.into_bytes()));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
