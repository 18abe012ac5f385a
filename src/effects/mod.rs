//! Effects-as-data for GitHub operations.
//!
//! Plugins and the dispatcher describe what they want done as
//! [`GitHubEffect`] values and hand them to a [`GitHubInterpreter`]. This keeps
//! the processing logic independent of the HTTP client and lets tests observe
//! exactly which calls were made.

pub mod calls;
pub mod github;
pub mod interpreter;

pub use calls::EffectError;
pub use github::{ContentError, FileContent, GitHubEffect, GitHubResponse};
pub use interpreter::GitHubInterpreter;
