//! Layering of organization and repository `.pullierc` files.
//!
//! A plain `plugins` list in the repository file is an include list merged
//! over the organization's. Alternatively the repository carries a merge
//! manifest `{ "exclude": [...], "include": [...] }` that first removes
//! organization plugins by name and then includes new ones. Every other
//! field is deep merged, with repository values winning. Without a
//! repository file the organization's configuration is used as is.
//!
//! Resolution never fails. Unknown plugin names in an include list are
//! reported through a callback and skipped; shapes that cannot be
//! interpreted leave the organization's plugin list untouched.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::merge::{deep_merge_maps, shallow_merge};
use super::plugin_ref::{PluginList, PluginRef, plugin_list_from_value};

/// Lookup used by the include algorithm: which plugin names exist, and how
/// each plugin merges its own configuration object.
pub trait PluginCatalog {
    /// Returns true if a plugin with this exact (case-sensitive) name exists.
    fn contains(&self, name: &str) -> bool;

    /// Merges `overrides` over `base` using the named plugin's rules.
    ///
    /// Unknown names fall back to a shallow merge.
    fn merge_plugin_config(&self, name: &str, base: &Value, overrides: &Value) -> Value {
        let _ = name;
        shallow_merge(base, overrides)
    }
}

/// The effective configuration for one pull request event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedConfig {
    /// Plugins to invoke, in order. `None` when no layer supplied a list.
    pub plugins: Option<PluginList>,

    /// All non-plugin fields, deep merged. Holds `plugins` too when an
    /// organization-only config has a `plugins` value that is not a list.
    pub settings: Map<String, Value>,

    /// An organization document that is not an object, kept as read.
    verbatim: Option<Value>,
}

impl ResolvedConfig {
    /// Returns the plugin list, treating an absent list as empty.
    pub fn plugin_list(&self) -> &[PluginRef] {
        self.plugins.as_deref().unwrap_or(&[])
    }

    /// Renders the configuration back into `.pullierc` JSON form.
    pub fn to_value(&self) -> Value {
        if let Some(verbatim) = &self.verbatim {
            return verbatim.clone();
        }
        let mut map = self.settings.clone();
        if let Some(plugins) = &self.plugins {
            map.insert(
                "plugins".to_string(),
                Value::Array(plugins.iter().map(PluginRef::to_value).collect()),
            );
        }
        Value::Object(map)
    }

    /// The organization's configuration, unchanged, for events whose
    /// repository has no configuration of its own.
    fn from_org_only(org: Option<&Value>) -> Self {
        match org {
            Some(Value::Object(map)) => {
                let mut settings = map.clone();
                let plugins = match settings.remove("plugins") {
                    Some(value @ Value::Array(_)) => plugin_list_from_value(&value),
                    Some(other) => {
                        settings.insert("plugins".to_string(), other);
                        None
                    }
                    None => None,
                };
                ResolvedConfig {
                    plugins,
                    settings,
                    verbatim: None,
                }
            }
            Some(other) => ResolvedConfig {
                verbatim: Some(other.clone()),
                ..ResolvedConfig::default()
            },
            // A missing org config behaves like `{ "plugins": [] }`.
            None => ResolvedConfig {
                plugins: Some(Vec::new()),
                ..ResolvedConfig::default()
            },
        }
    }
}

impl Serialize for ResolvedConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Resolves org and repo configuration without reporting invalid plugins.
pub fn resolve_config<C>(org: Option<&Value>, repo: Option<&Value>, catalog: &C) -> ResolvedConfig
where
    C: PluginCatalog + ?Sized,
{
    resolve_config_with(org, repo, catalog, |_| {})
}

/// Resolves org and repo configuration into one [`ResolvedConfig`].
///
/// `on_invalid_plugin` is called once for every include-list entry that
/// does not name a registered plugin.
pub fn resolve_config_with<C, F>(
    org: Option<&Value>,
    repo: Option<&Value>,
    catalog: &C,
    mut on_invalid_plugin: F,
) -> ResolvedConfig
where
    C: PluginCatalog + ?Sized,
    F: FnMut(&str),
{
    let org = org.filter(|v| !v.is_null());
    let repo = repo.filter(|v| !v.is_null());

    let Some(repo) = repo else {
        return ResolvedConfig::from_org_only(org);
    };

    let (org_plugins, org_settings) = match org {
        Some(org) => {
            let (plugins, settings) = split_plugins(org);
            (plugins.and_then(plugin_list_from_value), settings)
        }
        // A missing org config behaves like `{ "plugins": [] }`.
        None => (Some(Vec::new()), Map::new()),
    };

    let (repo_plugins, repo_settings) = split_plugins(repo);
    let settings = deep_merge_maps(&org_settings, &repo_settings);

    let plugins = match repo_plugins {
        Some(Value::Array(items)) => {
            let include: PluginList = items.iter().map(PluginRef::from).collect();
            Some(apply_include_list(
                org_plugins.as_deref().unwrap_or(&[]),
                &include,
                catalog,
                &mut on_invalid_plugin,
            ))
        }
        Some(Value::Object(manifest)) => Some(apply_manifest(
            org_plugins.unwrap_or_default(),
            manifest,
            catalog,
            &mut on_invalid_plugin,
        )),
        _ => org_plugins,
    };

    ResolvedConfig {
        plugins,
        settings,
        verbatim: None,
    }
}

/// Splits a config object into its `plugins` value and everything else.
/// Non-object configs contribute nothing.
fn split_plugins(config: &Value) -> (Option<&Value>, Map<String, Value>) {
    match config.as_object() {
        Some(map) => {
            let mut rest = map.clone();
            rest.remove("plugins");
            (map.get("plugins"), rest)
        }
        None => {
            tracing::debug!("ignoring non-object .pullierc contents");
            (None, Map::new())
        }
    }
}

/// Applies a `{ exclude, include }` manifest: exclusions first, then
/// inclusions against the result.
fn apply_manifest<C, F>(
    org_plugins: PluginList,
    manifest: &Map<String, Value>,
    catalog: &C,
    on_invalid_plugin: &mut F,
) -> PluginList
where
    C: PluginCatalog + ?Sized,
    F: FnMut(&str),
{
    let mut plugins = org_plugins;

    if let Some(exclude) = manifest.get("exclude").and_then(Value::as_array) {
        let names: Vec<String> = exclude
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
        plugins = apply_exclude_list(&plugins, &names);
    }

    if let Some(include) = manifest.get("include").and_then(plugin_list_from_value) {
        plugins = apply_include_list(&plugins, &include, catalog, on_invalid_plugin);
    }

    plugins
}

/// Merges `include` into a copy of `org_plugins`.
///
/// - Unknown names are reported and skipped.
/// - New plugins are appended in include order.
/// - A bare name never overrides an existing entry.
/// - An object replaces an existing bare name (or config-less object) in
///   place, or has its config merged into the existing config using the
///   plugin's own merge rules.
pub fn apply_include_list<C, F>(
    org_plugins: &[PluginRef],
    include: &[PluginRef],
    catalog: &C,
    mut on_invalid_plugin: F,
) -> PluginList
where
    C: PluginCatalog + ?Sized,
    F: FnMut(&str),
{
    let mut plugins = org_plugins.to_vec();

    for entry in include {
        let Some(name) = entry.name() else {
            on_invalid_plugin(&entry.describe());
            continue;
        };
        if !catalog.contains(name) {
            on_invalid_plugin(name);
            continue;
        }

        let Some(idx) = plugins.iter().position(|p| p.same_plugin(entry)) else {
            plugins.push(entry.clone());
            continue;
        };

        let PluginRef::Configured {
            config: overrides, ..
        } = entry
        else {
            continue;
        };

        match &mut plugins[idx] {
            PluginRef::Configured {
                config: Some(base), ..
            } => {
                let null = Value::Null;
                let overrides = overrides.as_ref().unwrap_or(&null);
                *base = catalog.merge_plugin_config(name, base, overrides);
            }
            slot => *slot = entry.clone(),
        }
    }

    plugins
}

/// Returns `org_plugins` without any entry named in `exclude`.
///
/// Unrecognized entries cannot be matched by name and are always kept.
pub fn apply_exclude_list(org_plugins: &[PluginRef], exclude: &[String]) -> PluginList {
    org_plugins
        .iter()
        .filter(|p| match p.name() {
            Some(name) => !exclude.iter().any(|e| e == name),
            None => true,
        })
        .cloned()
        .collect()
}
