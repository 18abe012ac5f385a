//! Pullie - a GitHub bot that runs configurable plugins on pull requests.
//!
//! Each repository opts in with a `.pullierc` file, layered over an
//! organization-wide one in the owner's `.github` repository. Plugins queue
//! notices on a shared [`commenter::Commenter`], which is posted as a single
//! comment once every plugin has run.

pub mod commenter;
pub mod effects;
pub mod github;
pub mod plugins;
pub mod processor;
pub mod pullierc;
pub mod server;
pub mod settings;
pub mod types;
pub mod webhooks;

#[cfg(test)]
pub(crate) mod test_utils;
