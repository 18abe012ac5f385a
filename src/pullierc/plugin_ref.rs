//! Plugin references as they appear in a `plugins` list.
//!
//! A `.pullierc` names plugins either as bare strings (`"reviewers"`) or as
//! objects carrying configuration (`{ "plugin": "requiredFile", "config": {...} }`).
//! Both forms refer to the same plugin when the names match. Entries that are
//! neither are kept verbatim so they survive merging, and are skipped at
//! dispatch time.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// An ordered list of plugin references. Order is invocation order.
pub type PluginList = Vec<PluginRef>;

/// One entry in a plugin list.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginRef {
    /// A bare plugin name.
    Named(String),

    /// A plugin name with optional plugin-specific configuration.
    Configured {
        plugin: String,
        config: Option<Value>,
    },

    /// Anything else found in the list (numbers, objects without a string
    /// `plugin` field, ...). Never matched by name.
    Unrecognized(Value),
}

impl PluginRef {
    pub fn named(name: impl Into<String>) -> Self {
        PluginRef::Named(name.into())
    }

    pub fn configured(name: impl Into<String>, config: Value) -> Self {
        PluginRef::Configured {
            plugin: name.into(),
            config: Some(config),
        }
    }

    /// Returns the plugin name, or `None` for unrecognized entries.
    pub fn name(&self) -> Option<&str> {
        match self {
            PluginRef::Named(name) => Some(name),
            PluginRef::Configured { plugin, .. } => Some(plugin),
            PluginRef::Unrecognized(_) => None,
        }
    }

    /// Returns the attached configuration, if any.
    pub fn config(&self) -> Option<&Value> {
        match self {
            PluginRef::Configured { config, .. } => config.as_ref(),
            _ => None,
        }
    }

    /// Returns true if both entries name the same plugin, regardless of form.
    pub fn same_plugin(&self, other: &PluginRef) -> bool {
        match (self.name(), other.name()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// A short rendering for log fields: the name, or the raw JSON.
    pub fn describe(&self) -> String {
        match self.name() {
            Some(name) => name.to_string(),
            None => self.to_value().to_string(),
        }
    }

    /// Converts back into the JSON shape it was read from.
    pub fn to_value(&self) -> Value {
        match self {
            PluginRef::Named(name) => Value::String(name.clone()),
            PluginRef::Configured { plugin, config } => {
                let mut map = Map::new();
                map.insert("plugin".to_string(), Value::String(plugin.clone()));
                if let Some(config) = config {
                    map.insert("config".to_string(), config.clone());
                }
                Value::Object(map)
            }
            PluginRef::Unrecognized(value) => value.clone(),
        }
    }
}

impl From<&Value> for PluginRef {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(name) => PluginRef::Named(name.clone()),
            Value::Object(map) => match map.get("plugin") {
                Some(Value::String(name)) => PluginRef::Configured {
                    plugin: name.clone(),
                    config: map.get("config").filter(|c| !c.is_null()).cloned(),
                },
                _ => PluginRef::Unrecognized(value.clone()),
            },
            other => PluginRef::Unrecognized(other.clone()),
        }
    }
}

impl From<Value> for PluginRef {
    fn from(value: Value) -> Self {
        PluginRef::from(&value)
    }
}

impl Serialize for PluginRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PluginRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(PluginRef::from)
    }
}

/// Reads a JSON array into a plugin list. Non-arrays yield `None`.
pub fn plugin_list_from_value(value: &Value) -> Option<PluginList> {
    value
        .as_array()
        .map(|items| items.iter().map(PluginRef::from).collect())
}
