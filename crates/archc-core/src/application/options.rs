//! Resolved compilation options, namespaced per plugin id.
//!
//! ```toml
//! [plugins.living-doc]
//! title = "Order service"
//! include-ports = true
//!
//! [plugins.repository-stub]
//! extension = "java"
//! skip = ["com.acme.AuditRepository"]
//! ```
//!
//! Accessors never fail: an absent key, or a value of another type, yields
//! the caller's default. A type mismatch is logged at debug level.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Integer(i64),
    String(String),
    List(Vec<OptionValue>),
    Map(BTreeMap<String, OptionValue>),
}

impl OptionValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    #[serde(default)]
    plugins: BTreeMap<String, BTreeMap<String, OptionValue>>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, plugin: impl Into<String>, key: impl Into<String>, value: OptionValue) {
        self.plugins
            .entry(plugin.into())
            .or_default()
            .insert(key.into(), value);
    }

    pub fn with(mut self, plugin: impl Into<String>, key: impl Into<String>, value: OptionValue) -> Self {
        self.set(plugin, key, value);
        self
    }

    /// The view of one plugin. Unknown plugins see an empty namespace.
    pub fn for_plugin<'a>(&'a self, plugin: &'a str) -> PluginOptions<'a> {
        PluginOptions {
            plugin,
            values: self.plugins.get(plugin),
        }
    }

    pub fn plugin_ids(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// Read-only options of one plugin.
#[derive(Debug, Clone, Copy)]
pub struct PluginOptions<'a> {
    plugin: &'a str,
    values: Option<&'a BTreeMap<String, OptionValue>>,
}

impl<'a> PluginOptions<'a> {
    pub fn empty(plugin: &'a str) -> Self {
        Self { plugin, values: None }
    }

    pub fn get(&self, key: &str) -> Option<&'a OptionValue> {
        self.values.and_then(|values| values.get(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn string(&self, key: &str, default: &str) -> String {
        self.typed(key, "string", |value| match value {
            OptionValue::String(s) => Some(s.clone()),
            _ => None,
        })
        .unwrap_or_else(|| default.to_string())
    }

    pub fn bool(&self, key: &str, default: bool) -> bool {
        self.typed(key, "boolean", |value| match value {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        })
        .unwrap_or(default)
    }

    pub fn integer(&self, key: &str, default: i64) -> i64 {
        self.typed(key, "integer", |value| match value {
            OptionValue::Integer(i) => Some(*i),
            _ => None,
        })
        .unwrap_or(default)
    }

    /// String items of a list; non-string items are skipped.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.typed(key, "list", |value| match value {
            OptionValue::List(items) => Some(
                items
                    .iter()
                    .filter_map(|item| match item {
                        OptionValue::String(s) => Some(s.clone()),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        })
        .unwrap_or_default()
    }

    pub fn map(&self, key: &str) -> BTreeMap<String, OptionValue> {
        self.typed(key, "map", |value| match value {
            OptionValue::Map(map) => Some(map.clone()),
            _ => None,
        })
        .unwrap_or_default()
    }

    fn typed<T>(&self, key: &str, expected: &str, extract: impl FnOnce(&OptionValue) -> Option<T>) -> Option<T> {
        let value = self.get(key)?;
        let extracted = extract(value);
        if extracted.is_none() {
            tracing::debug!(
                plugin = self.plugin,
                key,
                expected,
                found = value.type_name(),
                "option has another type, using default"
            );
        }
        extracted
    }
}
