//! Option type definitions for command configuration surfaces.
//!
//! This module defines the data model a command uses to declare which
//! options it recognizes. The types serialize with [`serde`] so platform
//! handlers can ship their option sets as YAML or JSON next to the handler.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Value type of an option.
///
/// Drives the coercion the validator applies to raw input before any
/// allowed-values check runs.
///
/// # Examples
///
/// ```
/// use buildcmd_core::ValueType;
///
/// assert_eq!(ValueType::default(), ValueType::String);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Boolean switch (no value on the command line).
    Bool,
    /// Free-form string value (the default).
    #[default]
    String,
    /// Numeric value, parsed as `f64`.
    Number,
    /// Directory path, resolved against the working directory.
    Directory,
}

/// A raw or normalized option value.
///
/// Serialized untagged so that YAML defaults read naturally
/// (`default: development`, `default: true`, `default: 3`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// A boolean switch.
    Flag(bool),
    /// A number.
    Number(f64),
    /// Text as typed by the user.
    Text(String),
}

impl ArgValue {
    /// Returns the text if this is a [`ArgValue::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Returns the boolean if this is a [`ArgValue::Flag`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Returns the number if this is a [`ArgValue::Number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ArgValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether this value counts as "not supplied".
    ///
    /// Only text can be blank: an empty or whitespace-only string.
    ///
    /// # Examples
    ///
    /// ```
    /// use buildcmd_core::ArgValue;
    ///
    /// assert!(ArgValue::from("   ").is_blank());
    /// assert!(!ArgValue::from("ios").is_blank());
    /// assert!(!ArgValue::Flag(false).is_blank());
    /// ```
    pub fn is_blank(&self) -> bool {
        matches!(self, ArgValue::Text(text) if text.trim().is_empty())
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Flag(flag) => write!(f, "{flag}"),
            ArgValue::Number(n) => write!(f, "{n}"),
            ArgValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Text(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Text(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Flag(value)
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::Number(value)
    }
}

type PromptCheck = dyn Fn(&str) -> Result<String, String> + Send + Sync;

/// Accept/reject function attached to an interactive prompt.
///
/// Receives the line the user typed and returns either the normalized value
/// to store or a message explaining the rejection.
#[derive(Clone)]
pub struct PromptValidator(Arc<PromptCheck>);

impl PromptValidator {
    /// Wraps a closure as a prompt validator.
    pub fn new(check: impl Fn(&str) -> Result<String, String> + Send + Sync + 'static) -> Self {
        Self(Arc::new(check))
    }

    /// Runs the validator against one line of input.
    pub fn check(&self, input: &str) -> Result<String, String> {
        (self.0)(input)
    }
}

impl fmt::Debug for PromptValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PromptValidator(..)")
    }
}

/// How to ask for an option interactively when it is missing or invalid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptSpec {
    /// Label shown before the cursor.
    pub label: String,
    /// Message shown when the entered value is rejected without a more
    /// specific reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Optional validator; runs before the option's own type and
    /// allowed-values checks.
    #[serde(skip)]
    pub validator: Option<PromptValidator>,
}

impl PromptSpec {
    /// Creates a prompt with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            error: None,
            validator: None,
        }
    }

    /// Sets the generic rejection message.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Attaches a validator.
    pub fn with_validator(
        mut self,
        check: impl Fn(&str) -> Result<String, String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(PromptValidator::new(check));
        self
    }
}

/// One recognized command-line option.
///
/// Use [`OptionSpec::value`] or [`OptionSpec::flag`] and chain the builder
/// methods.
///
/// # Examples
///
/// ```
/// use buildcmd_core::{ArgValue, OptionSpec};
///
/// let build_type = OptionSpec::value("build-type")
///     .with_abbr('b')
///     .with_default("development")
///     .with_values(["production", "development"]);
///
/// assert_eq!(build_type.abbr, Some('b'));
/// assert_eq!(build_type.default, Some(ArgValue::from("development")));
/// assert!(build_type.accepts("production"));
/// assert!(!build_type.accepts("Production"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionSpec {
    /// Long name, used as `--key` and as the argument set key.
    pub key: String,
    /// Single-character short alias (`-b`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abbr: Option<char>,
    /// Value type used for coercion.
    pub value_type: ValueType,
    /// Value applied when the option is not supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<ArgValue>,
    /// Help text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Placeholder shown in help (`--platform <platform>`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Allowed values; exact, case-sensitive matches only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    /// Whether the option must end up with a non-blank value.
    pub required: bool,
    /// Interactive prompt used to recover a missing or invalid value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<PromptSpec>,
}

impl OptionSpec {
    /// Creates an option that takes a string value.
    pub fn value(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Creates a boolean switch.
    pub fn flag(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value_type: ValueType::Bool,
            ..Default::default()
        }
    }

    /// Sets the short alias.
    pub fn with_abbr(mut self, abbr: char) -> Self {
        self.abbr = Some(abbr);
        self
    }

    /// Sets the value type.
    pub fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, default: impl Into<ArgValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Sets the help placeholder.
    pub fn with_hint(mut self, hint: &str) -> Self {
        self.hint = Some(hint.to_string());
        self
    }

    /// Restricts input to the given values.
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Marks the option as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attaches an interactive prompt.
    pub fn with_prompt(mut self, prompt: PromptSpec) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Whether this option is a boolean switch.
    pub fn is_flag(&self) -> bool {
        self.value_type == ValueType::Bool
    }

    /// Checks `value` against the allowed-values set.
    ///
    /// Options without a set accept anything.
    pub fn accepts(&self, value: &str) -> bool {
        match &self.values {
            Some(values) => values.iter().any(|v| v == value),
            None => true,
        }
    }
}

/// Ordered collection of [`OptionSpec`]s keyed by option key.
///
/// Insertion order is kept for help rendering; inserting an existing key
/// replaces the spec in place.
///
/// # Examples
///
/// ```
/// use buildcmd_core::{OptionSchema, OptionSpec};
///
/// let schema = OptionSchema::new()
///     .with_option(OptionSpec::value("platform").with_abbr('p'))
///     .with_option(OptionSpec::value("dir").with_abbr('d'));
///
/// assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["platform", "dir"]);
/// assert_eq!(schema.get_by_abbr('d').map(|s| s.key.as_str()), Some("dir"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSchema {
    options: Vec<OptionSpec>,
}

impl OptionSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an option, replacing any existing option with the same key.
    pub fn with_option(mut self, spec: OptionSpec) -> Self {
        self.insert(spec);
        self
    }

    /// Inserts an option and returns the spec it replaced, if any.
    pub fn insert(&mut self, spec: OptionSpec) -> Option<OptionSpec> {
        match self.options.iter_mut().find(|s| s.key == spec.key) {
            Some(slot) => Some(std::mem::replace(slot, spec)),
            None => {
                self.options.push(spec);
                None
            }
        }
    }

    /// Finds an option by key.
    pub fn get(&self, key: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|s| s.key == key)
    }

    /// Finds the option that owns a short alias.
    pub fn get_by_abbr(&self, abbr: char) -> Option<&OptionSpec> {
        self.options.iter().find(|s| s.abbr == Some(abbr))
    }

    /// Whether an option with `key` exists.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates options in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, OptionSpec> {
        self.options.iter()
    }

    /// Iterates option keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|s| s.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl FromIterator<OptionSpec> for OptionSchema {
    fn from_iter<T: IntoIterator<Item = OptionSpec>>(iter: T) -> Self {
        let mut schema = OptionSchema::new();
        for spec in iter {
            schema.insert(spec);
        }
        schema
    }
}

impl<'a> IntoIterator for &'a OptionSchema {
    type Item = &'a OptionSpec;
    type IntoIter = std::slice::Iter<'a, OptionSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_spec_builder() {
        let spec = OptionSpec::value("platform")
            .with_abbr('p')
            .with_hint("platform")
            .with_description("the target build platform")
            .with_values(["android", "ios"])
            .required();

        assert_eq!(spec.key, "platform");
        assert!(spec.required);
        assert!(!spec.is_flag());
        assert!(spec.accepts("ios"));
        assert!(!spec.accepts("bogus"));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut schema = OptionSchema::new()
            .with_option(OptionSpec::value("a"))
            .with_option(OptionSpec::value("b"));

        let replaced = schema.insert(OptionSpec::value("a").with_abbr('x'));

        assert!(replaced.is_some());
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(schema.get("a").and_then(|s| s.abbr), Some('x'));
    }

    #[test]
    fn test_prompt_validator_runs_closure() {
        let prompt = PromptSpec::new("Target platform").with_validator(|input| {
            let trimmed = input.trim();
            if trimmed.is_empty() {
                Err("Invalid platform".to_string())
            } else {
                Ok(trimmed.to_string())
            }
        });

        let validator = prompt.validator.as_ref().unwrap();
        assert_eq!(validator.check("  ios "), Ok("ios".to_string()));
        assert!(validator.check("   ").is_err());
    }

    #[test]
    fn test_schema_deserializes_from_yaml() {
        let yaml = r#"
- key: target
  abbr: T
  hint: target
  values: [emulator, device]
  default: emulator
- key: retries
  value_type: number
  default: 3
"#;
        let schema: OptionSchema = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(schema.len(), 2);
        let target = schema.get("target").unwrap();
        assert_eq!(target.abbr, Some('T'));
        assert_eq!(target.default, Some(ArgValue::from("emulator")));
        let retries = schema.get("retries").unwrap();
        assert_eq!(retries.value_type, ValueType::Number);
        assert_eq!(retries.default, Some(ArgValue::Number(3.0)));
    }
}
