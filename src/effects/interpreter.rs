//! Effect interpreter trait.
//!
//! Plugins and the dispatcher only ever see this trait. The production
//! implementation talks to GitHub through octocrab; tests use an in-memory
//! interpreter that records every effect it receives.

use std::future::Future;

use super::github::{GitHubEffect, GitHubResponse};

/// Interprets GitHub effects against the GitHub API.
///
/// Implementations are constructed with a `RepoId`, so all effects executed
/// through a single interpreter instance are scoped to that repository
/// (except `GetContent`, which names its own).
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct CannedGitHub {
///     responses: HashMap<GitHubEffect, GitHubResponse>,
/// }
///
/// impl GitHubInterpreter for CannedGitHub {
///     type Error = CannedError;
///
///     async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
///         self.responses.get(&effect).cloned().ok_or(CannedError(effect))
///     }
/// }
/// ```
pub trait GitHubInterpreter {
    /// The error type returned by this interpreter.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Execute a GitHub effect and return its response.
    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send;
}
