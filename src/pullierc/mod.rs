//! `.pullierc` configuration: plugin references and org/repo layering.
//!
//! The organization's `.pullierc` lives in its `.github` meta repository;
//! each repository may commit its own. [`resolve_config_with`] merges the
//! two into a [`ResolvedConfig`] whose plugin list drives dispatch.

pub mod load;
pub mod merge;
pub mod plugin_ref;
pub mod resolve;

use thiserror::Error;

use crate::effects::{ContentError, EffectError};
use crate::types::RepoId;

pub use load::load_pullierc;
pub use merge::{deep_merge, shallow_merge};
pub use plugin_ref::{PluginList, PluginRef, plugin_list_from_value};
pub use resolve::{
    PluginCatalog, ResolvedConfig, apply_exclude_list, apply_include_list, resolve_config,
    resolve_config_with,
};

/// Path of the configuration file, relative to a repository root.
pub const PULLIERC_PATH: &str = ".pullierc";

/// Errors loading a `.pullierc` file. A missing file is not an error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The GitHub API call failed for a reason other than "not found".
    #[error("failed to fetch {PULLIERC_PATH} from {repo}: {source}")]
    Fetch {
        repo: RepoId,
        #[source]
        source: EffectError,
    },

    /// The file was fetched but is not base64-encoded JSON.
    #[error("failed to decode {PULLIERC_PATH} from {repo}: {source}")]
    Decode {
        repo: RepoId,
        #[source]
        source: ContentError,
    },
}
