//! GitHub API client and effect interpreter.
//!
//! Executes [`GitHubEffect`](crate::effects::GitHubEffect)s through octocrab.
//! REST covers everything except toggling draft state, which needs GraphQL.

mod client;
mod error;
mod interpreter;

pub use client::OctocrabClient;
pub use error::{GitHubApiError, GitHubErrorKind};
pub use interpreter::interpret_github_effect;
