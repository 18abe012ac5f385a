//! Webhook endpoint handler.
//!
//! Verifies the delivery's signature, parses pull request events and runs
//! the dispatcher before replying. GitHub sees 200 for every authentic,
//! well-formed delivery; processing failures only show up in the logs.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{AppState, GitHubConnector};
use crate::processor::process_pull_request;
use crate::types::DeliveryId;
use crate::webhooks::{ParseError, SignatureError, parse_webhook, verify_signature};

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header name for GitHub signature.
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

/// Errors that can occur when processing a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("invalid signature: {0}")]
    InvalidSignature(#[from] SignatureError),

    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] ParseError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            WebhookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
        };

        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Required headers:
///   - `X-GitHub-Event`: Event type (e.g., "pull_request")
///   - `X-GitHub-Delivery`: Unique delivery ID
///   - `X-Hub-Signature-256`: HMAC-SHA256 signature of the payload
/// - Body: JSON webhook payload
///
/// # Response
///
/// - 200 OK: Event processed, or ignored because it is not a dispatched
///   pull request action
/// - 400 Bad Request: Missing header or malformed payload
/// - 401 Unauthorized: Invalid signature
pub async fn webhook_handler<C: GitHubConnector>(
    State(app_state): State<AppState<C>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError> {
    let event_type = get_header(&headers, HEADER_EVENT)?;
    let delivery_id = DeliveryId::new(get_header(&headers, HEADER_DELIVERY)?);
    let signature_header = get_header(&headers, HEADER_SIGNATURE)?;

    debug!(delivery_id = %delivery_id, event_type = %event_type, "Received webhook");

    // Nothing in the body is looked at before the signature checks out.
    if let Err(e) = verify_signature(&body, &signature_header, app_state.webhook_secret()) {
        warn!(delivery_id = %delivery_id, error = %e, "Invalid webhook signature");
        return Err(e.into());
    }

    let event = match parse_webhook(&event_type, &body) {
        Ok(Some(event)) if event.action.is_dispatched() => event,
        Ok(_) => {
            debug!(delivery_id = %delivery_id, event_type = %event_type, "Ignoring webhook");
            return Ok((StatusCode::OK, "Ignored"));
        }
        Err(e) => {
            warn!(delivery_id = %delivery_id, error = %e, "Malformed webhook payload");
            return Err(e.into());
        }
    };

    info!(
        delivery_id = %delivery_id,
        repo = %event.repo,
        pr = %event.pr_number,
        action = ?event.action,
        "Processing pull request event"
    );

    let github = app_state.connector().connect(&event.repo);
    let outcome = process_pull_request(
        &event,
        &github,
        app_state.settings(),
        app_state.registry(),
        &delivery_id,
    )
    .await;

    debug!(delivery_id = %delivery_id, outcome = ?outcome, "Finished processing");
    Ok((StatusCode::OK, "OK"))
}

/// Extracts a required header value as a string.
fn get_header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or(WebhookError::MissingHeader(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_header_present() {
        let mut headers = HeaderMap::new();
        headers.insert("x-github-event", "pull_request".parse().unwrap());

        assert_eq!(get_header(&headers, HEADER_EVENT).unwrap(), "pull_request");
    }

    #[test]
    fn get_header_missing() {
        let headers = HeaderMap::new();
        assert!(matches!(
            get_header(&headers, HEADER_DELIVERY),
            Err(WebhookError::MissingHeader("x-github-delivery"))
        ));
    }

    #[test]
    fn error_status_codes() {
        let status = |e: WebhookError| e.into_response().status();

        assert_eq!(
            status(WebhookError::MissingHeader(HEADER_SIGNATURE)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(WebhookError::InvalidSignature(SignatureError::Mismatch)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(WebhookError::InvalidSignature(SignatureError::Malformed)),
            StatusCode::UNAUTHORIZED
        );

        let json_error = serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err();
        assert_eq!(
            status(WebhookError::InvalidPayload(ParseError::from(json_error))),
            StatusCode::BAD_REQUEST
        );
    }
}
