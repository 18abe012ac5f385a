//! Fetching `.pullierc` files through the GitHub interpreter.

use serde_json::Value;

use crate::effects::{GitHubInterpreter, calls};
use crate::types::RepoId;

use super::{ConfigError, PULLIERC_PATH};

/// Loads and parses `repo`'s `.pullierc`.
///
/// Returns `Ok(None)` when the file does not exist. A JSON `null` document
/// is also treated as absent.
pub async fn load_pullierc<G>(github: &G, repo: &RepoId) -> Result<Option<Value>, ConfigError>
where
    G: GitHubInterpreter + Sync,
{
    let file = calls::get_content(github, repo, PULLIERC_PATH)
        .await
        .map_err(|source| ConfigError::Fetch {
            repo: repo.clone(),
            source,
        })?;

    let Some(file) = file else {
        return Ok(None);
    };

    let value: Option<Value> = file.decode_json().map_err(|source| ConfigError::Decode {
        repo: repo.clone(),
        source,
    })?;
    Ok(value.filter(|v| !v.is_null()))
}
