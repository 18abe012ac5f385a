//! `jira`: links Jira tickets mentioned in the PR title.
//!
//! Ticket keys (`ABC-123`) are looked up through Jira's search API and the
//! ones that exist are listed in a low-priority comment. On edits, only keys
//! that were not already in the previous title are looked up.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::commenter::{Commenter, Priority};
use crate::effects::GitHubInterpreter;
use crate::settings::JiraSettings;

use super::{Plugin, PluginContext, PluginError};

static TICKET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]+-[1-9][0-9]*").expect("ticket regex is valid"));

#[derive(Debug, Error)]
pub enum JiraError {
    #[error("Jira host is not configured")]
    NotConfigured,

    #[error("Jira request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Error retrieving Jira ticket info. Status code: {0} from Jira.")]
    Status(u16),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    jql: String,
    start_at: u32,
    fields: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<Issue>,
}

#[derive(Debug, Deserialize)]
struct Issue {
    key: String,
    fields: IssueFields,
}

#[derive(Debug, Deserialize)]
struct IssueFields {
    #[serde(default)]
    summary: String,
}

/// Returns the distinct ticket keys in `text`, in order of appearance.
fn ticket_keys(text: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for m in TICKET_RE.find_iter(text) {
        if !keys.iter().any(|k| k == m.as_str()) {
            keys.push(m.as_str().to_string());
        }
    }
    keys
}

fn jql_for(keys: &[String]) -> String {
    format!("id in ('{}')", keys.join("', '"))
}

fn render_comment(base_url: &str, issues: &[Issue]) -> String {
    let mut comment = String::from("I found the following Jira ticket(s) referenced in this PR:\n");
    for issue in issues {
        comment.push_str(&format!(
            "\n- [\\[{key}\\] {summary}]({base}/browse/{key})",
            key = issue.key,
            summary = issue.fields.summary,
            base = base_url,
        ));
    }
    comment
}

#[derive(Debug, Clone)]
pub struct JiraPlugin {
    settings: JiraSettings,
    http: reqwest::Client,
}

impl JiraPlugin {
    pub fn new(settings: JiraSettings) -> Self {
        JiraPlugin {
            settings,
            http: reqwest::Client::new(),
        }
    }

    async fn search(&self, base_url: &str, keys: &[String]) -> Result<Vec<Issue>, JiraError> {
        let mut request = self
            .http
            .post(format!("{}/rest/api/2/search", base_url))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&SearchRequest {
                jql: jql_for(keys),
                start_at: 0,
                fields: ["summary"],
            });
        if let Some(username) = &self.settings.username {
            request = request.basic_auth(username, self.settings.password.as_ref());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(JiraError::Status(status.as_u16()));
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.issues)
    }
}

impl Plugin for JiraPlugin {
    fn name(&self) -> &'static str {
        "jira"
    }

    fn processes_edits(&self) -> bool {
        true
    }

    async fn process_request<G>(
        &self,
        ctx: &PluginContext<'_, G>,
        commenter: &mut Commenter,
        _config: &Value,
    ) -> Result<(), PluginError>
    where
        G: GitHubInterpreter + Sync,
    {
        let event = ctx.event;
        if event.is_edit() && !event.title_changed() {
            return Ok(());
        }

        let mut keys = ticket_keys(&event.title);
        if let Some(old_title) = event.previous_title.as_deref().filter(|_| event.is_edit()) {
            let old_keys = ticket_keys(old_title);
            keys.retain(|k| !old_keys.contains(k));
        }
        if keys.is_empty() {
            return Ok(());
        }

        let base_url = self.settings.base_url().ok_or(JiraError::NotConfigured)?;
        let issues = self.search(&base_url, &keys).await?;
        tracing::debug!(tickets = ?keys, found = issues.len(), "looked up Jira tickets");

        if !issues.is_empty() {
            commenter.add_comment(render_comment(&base_url, &issues), Priority::Low)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockGitHub, pull_request_event, title_edit_event};
    use crate::webhooks::{PrAction, PullRequestEvent};
    use axum::http::{HeaderMap, StatusCode};
    use axum::{Json, Router, routing::post};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Seen {
        bodies: Vec<Value>,
        auth: Vec<Option<String>>,
    }

    /// Serves Jira's search endpoint on a local port.
    async fn jira_stub(status: StatusCode, response: Value) -> (String, Arc<Mutex<Seen>>) {
        let seen = Arc::new(Mutex::new(Seen::default()));
        let recorder = seen.clone();
        let app = Router::new().route(
            "/rest/api/2/search",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let recorder = recorder.clone();
                let response = response.clone();
                async move {
                    let mut seen = recorder.lock().unwrap();
                    seen.bodies.push(body);
                    seen.auth.push(
                        headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string),
                    );
                    (status, Json(response))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr.to_string(), seen)
    }

    fn plugin_for(host: &str) -> JiraPlugin {
        JiraPlugin::new(JiraSettings {
            protocol: "http".to_string(),
            host: Some(host.to_string()),
            username: Some("bot".to_string()),
            password: Some("pw".to_string()),
        })
    }

    async fn run(plugin: &JiraPlugin, event: &PullRequestEvent) -> (Result<(), PluginError>, Commenter) {
        let github = MockGitHub::new();
        let ctx = PluginContext {
            event,
            github: &github,
        };
        let mut commenter = Commenter::new();
        let result = plugin.process_request(&ctx, &mut commenter, &json!({})).await;
        (result, commenter)
    }

    fn titled(title: &str) -> PullRequestEvent {
        PullRequestEvent {
            title: title.to_string(),
            ..pull_request_event(PrAction::Opened)
        }
    }

    #[test]
    fn extracts_distinct_ticket_keys() {
        assert_eq!(
            ticket_keys("ABC-12 and XY-3, again ABC-12; not ABC-0 or abc-4"),
            vec!["ABC-12", "XY-3"]
        );
        assert!(ticket_keys("no tickets").is_empty());
    }

    #[test]
    fn jql_quotes_each_key() {
        assert_eq!(
            jql_for(&["A-1".to_string(), "B-2".to_string()]),
            "id in ('A-1', 'B-2')"
        );
    }

    #[tokio::test]
    async fn links_found_tickets() {
        let (host, seen) = jira_stub(
            StatusCode::OK,
            json!({ "issues": [
                { "key": "ABC-12", "fields": { "summary": "Fix the widget" } },
                { "key": "XY-3", "fields": { "summary": "Polish" } }
            ] }),
        )
        .await;
        let plugin = plugin_for(&host);

        let (result, mut commenter) = run(&plugin, &titled("ABC-12 XY-3 widgets")).await;

        result.unwrap();
        assert_eq!(commenter.pending()[0].priority, Priority::Low);
        assert_eq!(
            commenter.flush_to_string().unwrap(),
            format!(
                "I found the following Jira ticket(s) referenced in this PR:\n\
                 \n- [\\[ABC-12\\] Fix the widget](http://{host}/browse/ABC-12)\
                 \n- [\\[XY-3\\] Polish](http://{host}/browse/XY-3)"
            )
        );

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen.bodies[0],
            json!({ "jql": "id in ('ABC-12', 'XY-3')", "startAt": 0, "fields": ["summary"] })
        );
        // base64("bot:pw")
        assert_eq!(seen.auth[0].as_deref(), Some("Basic Ym90OnB3"));
    }

    #[tokio::test]
    async fn no_tickets_means_no_request() {
        let plugin = JiraPlugin::new(JiraSettings::default());
        let (result, commenter) = run(&plugin, &titled("plain title")).await;

        result.unwrap();
        assert!(commenter.is_empty());
    }

    #[tokio::test]
    async fn unchanged_title_edit_is_ignored() {
        let plugin = JiraPlugin::new(JiraSettings::default());
        let event = PullRequestEvent {
            title: "ABC-1 thing".to_string(),
            ..pull_request_event(PrAction::Edited)
        };

        let (result, commenter) = run(&plugin, &event).await;

        // Would fail with NotConfigured if it tried to search.
        result.unwrap();
        assert!(commenter.is_empty());
    }

    #[tokio::test]
    async fn edits_only_look_up_new_tickets() {
        let (host, seen) = jira_stub(
            StatusCode::OK,
            json!({ "issues": [{ "key": "NEW-2", "fields": { "summary": "New" } }] }),
        )
        .await;
        let plugin = plugin_for(&host);

        let (result, _) = run(&plugin, &title_edit_event("OLD-1 thing", "OLD-1 NEW-2 thing")).await;

        result.unwrap();
        assert_eq!(seen.lock().unwrap().bodies[0]["jql"], json!("id in ('NEW-2')"));
    }

    #[tokio::test]
    async fn edit_without_new_tickets_does_nothing() {
        let plugin = JiraPlugin::new(JiraSettings::default());
        let (result, commenter) = run(&plugin, &title_edit_event("OLD-1 a", "OLD-1 b")).await;

        result.unwrap();
        assert!(commenter.is_empty());
    }

    #[tokio::test]
    async fn zero_issues_queue_nothing() {
        let (host, _) = jira_stub(StatusCode::OK, json!({ "issues": [] })).await;
        let (result, commenter) = run(&plugin_for(&host), &titled("ABC-1")).await;

        result.unwrap();
        assert!(commenter.is_empty());
    }

    #[tokio::test]
    async fn error_status_is_a_plugin_error() {
        let (host, _) = jira_stub(StatusCode::UNAUTHORIZED, json!({})).await;
        let (result, _) = run(&plugin_for(&host), &titled("ABC-1")).await;

        assert!(matches!(
            result,
            Err(PluginError::Jira(JiraError::Status(401)))
        ));
    }

    #[tokio::test]
    async fn missing_host_is_a_plugin_error() {
        let plugin = JiraPlugin::new(JiraSettings::default());
        let (result, _) = run(&plugin, &titled("ABC-1")).await;

        assert!(matches!(
            result,
            Err(PluginError::Jira(JiraError::NotConfigured))
        ));
    }
}
