//! Value tree for arguments captured from loader calls.

use serde::Serialize;
use std::fmt;

/// Verbatim slice of function source, never escaped or re-quoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawSource(String);

impl RawSource {
    pub fn new(source: impl Into<String>) -> Self {
        RawSource(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RawSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A value literal from the bootstrap source.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Object(ConfigObject),
    Array(Vec<ConfigValue>),
    String(String),
    /// Numeric literal as written, including any sign
    Number(String),
    Bool(bool),
    Null,
    Undefined,
    /// Function or arrow function literal
    Function(RawSource),
}

impl ConfigValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConfigValue::Object(_) => "an object",
            ConfigValue::Array(_) => "an array",
            ConfigValue::String(_) => "a string",
            ConfigValue::Number(_) => "a number",
            ConfigValue::Bool(_) => "a boolean",
            ConfigValue::Null => "null",
            ConfigValue::Undefined => "undefined",
            ConfigValue::Function(_) => "a function",
        }
    }

    pub fn as_object(&self) -> Option<&ConfigObject> {
        match self {
            ConfigValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Object literal with keys in source order.
///
/// Assigning an existing key keeps its original position, matching how
/// duplicate keys behave when the literal is evaluated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigObject {
    entries: Vec<(String, ConfigValue)>,
}

impl ConfigObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigValue> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Look up a nested value by a path of object keys.
    pub fn get_path(&self, path: &[String]) -> Option<&ConfigValue> {
        let (first, rest) = path.split_first()?;
        let value = self.get(first)?;
        if rest.is_empty() {
            return Some(value);
        }
        value.as_object()?.get_path(rest)
    }

    pub fn get_path_mut(&mut self, path: &[String]) -> Option<&mut ConfigValue> {
        let (first, rest) = path.split_first()?;
        let value = self.get_mut(first)?;
        if rest.is_empty() {
            return Some(value);
        }
        match value {
            ConfigValue::Object(obj) => obj.get_path_mut(rest),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
