//! GitHub API error types.
//!
//! "Not found" is split out because several callers treat a 404 as an
//! answer rather than a failure (a missing `.pullierc`, a required file that
//! does not exist). Every other failure is reported as is; requests are not
//! retried.

use std::fmt;
use thiserror::Error;

/// The kind of GitHub API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubErrorKind {
    /// HTTP 404.
    NotFound,

    /// Any other failure.
    Other,
}

/// A GitHub API error with its HTTP status, when known.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    pub kind: GitHubErrorKind,

    /// The HTTP status code, if available.
    pub status_code: Option<u16>,

    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    /// Creates an error without an octocrab source, e.g. for a GraphQL
    /// response that carried an `errors` array.
    pub fn without_source(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Other,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == GitHubErrorKind::NotFound
    }

    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = match &err {
            octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
            _ => None,
        };

        Self {
            kind: kind_for(status_code),
            status_code,
            message: err.to_string(),
            source: Some(err),
        }
    }
}

fn kind_for(status_code: Option<u16>) -> GitHubErrorKind {
    match status_code {
        Some(404) => GitHubErrorKind::NotFound,
        _ => GitHubErrorKind::Other,
    }
}
