//! Process settings read from the environment.
//!
//! Settings are loaded once at startup and shared read-only by every event.
//! [`Settings::from_lookup`] takes any key lookup so tests do not have to
//! touch the real process environment.

use std::net::SocketAddr;

use thiserror::Error;

/// Default listen address for the HTTP server.
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Default scheme for Jira URLs.
const DEFAULT_JIRA_PROTOCOL: &str = "https";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid PULLIE_BIND_ADDR {value:?}: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Which GitHub Enterprise installations this process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterpriseFilter {
    /// `GH_ENTERPRISE_ID` unset: serve every event.
    Any,

    /// Serve only events from this enterprise.
    Only(u64),

    /// `GH_ENTERPRISE_ID` was set but is not a number: nothing matches.
    RejectAll,
}

impl EnterpriseFilter {
    fn parse(raw: Option<String>) -> Self {
        match raw {
            None => EnterpriseFilter::Any,
            Some(raw) => match raw.trim().parse() {
                Ok(id) => EnterpriseFilter::Only(id),
                Err(_) => EnterpriseFilter::RejectAll,
            },
        }
    }

    /// Returns true if an event from `enterprise_id` should be processed.
    pub fn admits(&self, enterprise_id: Option<u64>) -> bool {
        match self {
            EnterpriseFilter::Any => true,
            EnterpriseFilter::Only(expected) => enterprise_id == Some(*expected),
            EnterpriseFilter::RejectAll => false,
        }
    }
}

/// Connection details for the Jira plugin.
#[derive(Clone, Default)]
pub struct JiraSettings {
    pub protocol: String,
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl JiraSettings {
    /// Returns `<protocol>://<host>`, or `None` when no host is configured.
    pub fn base_url(&self) -> Option<String> {
        self.host
            .as_deref()
            .map(|host| format!("{}://{}", self.protocol, host))
    }
}

impl std::fmt::Debug for JiraSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraSettings")
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Process-wide settings.
#[derive(Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub github_token: Option<String>,

    /// API root for GitHub Enterprise Server. `None` uses api.github.com.
    pub github_api_url: Option<String>,

    pub webhook_secret: Option<String>,
    pub enterprise: EnterpriseFilter,

    /// When true, events from public repositories are ignored.
    pub no_public_repos: bool,

    /// Default `commentFormat` for the reviewers plugin.
    pub reviewers_comment_format: Option<String>,

    pub jira: JiraSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            github_token: None,
            github_api_url: None,
            webhook_secret: None,
            enterprise: EnterpriseFilter::Any,
            no_public_repos: false,
            reviewers_comment_format: None,
            jira: JiraSettings {
                protocol: DEFAULT_JIRA_PROTOCOL.to_string(),
                ..JiraSettings::default()
            },
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let bind_raw = get("PULLIE_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse()
            .map_err(|source| SettingsError::BindAddr {
                value: bind_raw.clone(),
                source,
            })?;

        Ok(Settings {
            bind_addr,
            github_token: get("GITHUB_TOKEN"),
            github_api_url: get("GITHUB_API_URL"),
            webhook_secret: get("WEBHOOK_SECRET"),
            enterprise: EnterpriseFilter::parse(get("GH_ENTERPRISE_ID")),
            no_public_repos: get("NO_PUBLIC_REPOS").is_some_and(|v| v == "true"),
            reviewers_comment_format: get("REVIEWERS_COMMENT_FORMAT"),
            jira: JiraSettings {
                protocol: get("JIRA_PROTOCOL").unwrap_or_else(|| DEFAULT_JIRA_PROTOCOL.to_string()),
                host: get("JIRA_HOST"),
                username: get("JIRA_USERNAME"),
                password: get("JIRA_PASSWORD"),
            },
        })
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("bind_addr", &self.bind_addr)
            .field("github_api_url", &self.github_api_url)
            .field("enterprise", &self.enterprise)
            .field("no_public_repos", &self.no_public_repos)
            .field("jira", &self.jira)
            .finish_non_exhaustive()
    }
}
