//! Argument values for one invocation.
//!
//! An [`ArgumentSet`] holds raw values as parsed from the command line and,
//! after validation, the normalized values handed to a backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ArgValue;

/// Parsed arguments for one command invocation.
///
/// Holds option values keyed by option key plus the literal invocation
/// string (the program name as the user typed it), which is used when
/// printing copy-pasteable hints.
///
/// # Examples
///
/// ```
/// use buildcmd_core::{ArgValue, ArgumentSet};
///
/// let args = ArgumentSet::new("buildcmd")
///     .with("platform", "android")
///     .with("no-prompt", true);
///
/// assert_eq!(args.get_str("platform"), Some("android"));
/// assert_eq!(args.get("no-prompt"), Some(&ArgValue::Flag(true)));
/// assert_eq!(args.invocation(), "buildcmd");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSet {
    values: BTreeMap<String, ArgValue>,
    invocation: String,
}

impl ArgumentSet {
    /// Creates an empty argument set for the given invocation string.
    pub fn new(invocation: impl Into<String>) -> Self {
        Self {
            values: BTreeMap::new(),
            invocation: invocation.into(),
        }
    }

    /// Sets a value and returns the set.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a value, returning the previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> Option<ArgValue> {
        self.values.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.values.get(key)
    }

    /// Returns the value as text, if it is text.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(ArgValue::as_str)
    }

    /// Returns `true` when the key is set to `true`.
    pub fn is_set(&self, key: &str) -> bool {
        self.values.get(key).and_then(ArgValue::as_bool) == Some(true)
    }

    /// Whether `key` holds a non-blank value.
    pub fn is_present(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(|v| !v.is_blank())
    }

    pub fn remove(&mut self, key: &str) -> Option<ArgValue> {
        self.values.remove(key)
    }

    /// Iterates values in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The literal invocation string.
    pub fn invocation(&self) -> &str {
        &self.invocation
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Renders the values as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.values).unwrap_or(serde_json::Value::Null)
    }
}
