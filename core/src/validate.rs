//! Option schema validation.
//!
//! Validates structural invariants of option schemas and command specs,
//! catching malformed keys, bad aliases, duplicates and defaults outside the
//! allowed set before a schema is merged or used to parse input.
//!
//! # Examples
//!
//! ```
//! use buildcmd_core::*;
//!
//! let schema = OptionSchema::new()
//!     .with_option(OptionSpec::value("platform").with_abbr('p'));
//! assert!(validate_schema(&schema).is_empty());
//!
//! // Invalid: key written with its leading dashes
//! let bad = OptionSchema::new().with_option(OptionSpec::value("--platform"));
//! assert!(!validate_schema(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{CommandSpec, OptionSchema, OptionSpec};

/// Structural schema errors.
///
/// Each variant describes one problem found in a single schema. The
/// `Display` impl provides a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyCommandName,
    /// Option key is empty or whitespace-only.
    #[error("option key cannot be empty")]
    EmptyKey,
    /// Key is not lowercase alphanumerics and dashes, or starts with a dash.
    #[error("invalid option key: {0}")]
    InvalidKey(String),
    /// Alias is not a single ASCII alphanumeric character.
    #[error("invalid alias '{alias}' for option {key}")]
    InvalidAlias { key: String, alias: char },
    /// Two options in the same schema share a key.
    #[error("duplicate option key: {0}")]
    DuplicateKey(String),
    /// Two options in the same schema share a short alias.
    #[error("duplicate alias '-{alias}' on option {key}")]
    DuplicateAlias { key: String, alias: char },
    /// An allowed-values set with no members.
    #[error("option {0} has an empty set of allowed values")]
    EmptyValues(String),
    /// The default value is not a member of the allowed set.
    #[error("default '{default}' for option {key} is not an allowed value")]
    DefaultNotAllowed { key: String, default: String },
}

/// Validates a command spec: its name, its options and each variant layer.
///
/// Layers are checked in isolation; cross-layer collisions are the merge
/// step's job.
///
/// # Examples
///
/// ```
/// use buildcmd_core::*;
///
/// let command = CommandSpec::new("build", "Build")
///     .with_option(OptionSpec::value("platform").with_abbr('p'));
/// assert!(validate_command(&command).is_empty());
///
/// let unnamed = CommandSpec::new(" ", "Build");
/// assert_eq!(validate_command(&unnamed), vec![SchemaError::EmptyCommandName]);
/// ```
pub fn validate_command(command: &CommandSpec) -> Vec<SchemaError> {
    let mut errors = Vec::new();

    if command.name.trim().is_empty() {
        errors.push(SchemaError::EmptyCommandName);
        return errors;
    }

    errors.extend(validate_schema(&command.options));
    if !errors.is_empty() {
        return errors;
    }

    for layer in command.platforms.values() {
        errors.extend(validate_schema(layer));
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

/// Validates one option schema.
///
/// Stops at the first problem, the same way a parser would refuse to start.
pub fn validate_schema(schema: &OptionSchema) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let mut seen_keys = HashSet::new();
    let mut seen_aliases = HashSet::new();

    for spec in schema {
        if let Err(err) = validate_option(spec) {
            errors.push(err);
            return errors;
        }

        if !seen_keys.insert(spec.key.as_str()) {
            errors.push(SchemaError::DuplicateKey(spec.key.clone()));
            return errors;
        }

        if let Some(alias) = spec.abbr {
            if !seen_aliases.insert(alias) {
                errors.push(SchemaError::DuplicateAlias {
                    key: spec.key.clone(),
                    alias,
                });
                return errors;
            }
        }
    }

    errors
}

fn validate_option(spec: &OptionSpec) -> Result<(), SchemaError> {
    let key = spec.key.trim();
    if key.is_empty() {
        return Err(SchemaError::EmptyKey);
    }
    if key != spec.key
        || key.starts_with('-')
        || !key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(SchemaError::InvalidKey(spec.key.clone()));
    }

    if let Some(alias) = spec.abbr {
        if !alias.is_ascii_alphanumeric() {
            return Err(SchemaError::InvalidAlias {
                key: spec.key.clone(),
                alias,
            });
        }
    }

    if let Some(values) = &spec.values {
        if values.is_empty() {
            return Err(SchemaError::EmptyValues(spec.key.clone()));
        }
        if let Some(default) = &spec.default {
            let default = default.to_string();
            if !spec.accepts(&default) {
                return Err(SchemaError::DefaultNotAllowed {
                    key: spec.key.clone(),
                    default,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_schema_rejects_uppercase_key() {
        let schema = OptionSchema::new().with_option(OptionSpec::value("BuildType"));

        assert_eq!(
            validate_schema(&schema),
            vec![SchemaError::InvalidKey("BuildType".to_string())]
        );
    }

    #[test]
    fn test_validate_schema_rejects_duplicate_alias() {
        let schema = OptionSchema::new()
            .with_option(OptionSpec::value("platform").with_abbr('p'))
            .with_option(OptionSpec::value("profile").with_abbr('p'));

        assert_eq!(
            validate_schema(&schema),
            vec![SchemaError::DuplicateAlias {
                key: "profile".to_string(),
                alias: 'p'
            }]
        );
    }

    #[test]
    fn test_validate_schema_rejects_duplicate_key_from_deserialized_list() {
        let schema: OptionSchema =
            serde_json::from_str(r#"[{"key": "dir"}, {"key": "dir"}]"#).unwrap();

        assert_eq!(
            validate_schema(&schema),
            vec![SchemaError::DuplicateKey("dir".to_string())]
        );
    }

    #[test]
    fn test_validate_schema_rejects_default_outside_values() {
        let schema = OptionSchema::new().with_option(
            OptionSpec::value("build-type")
                .with_default("debug")
                .with_values(["production", "development"]),
        );

        assert_eq!(
            validate_schema(&schema),
            vec![SchemaError::DefaultNotAllowed {
                key: "build-type".to_string(),
                default: "debug".to_string()
            }]
        );
    }

    #[test]
    fn test_validate_schema_rejects_punctuation_alias() {
        let schema = OptionSchema::new().with_option(OptionSpec::value("dir").with_abbr('?'));

        assert!(matches!(
            validate_schema(&schema).as_slice(),
            [SchemaError::InvalidAlias { alias: '?', .. }]
        ));
    }

    #[test]
    fn test_validate_command_checks_platform_layers() {
        let command = CommandSpec::new("build", "Build").with_platform_options(
            "ios",
            OptionSchema::new().with_option(OptionSpec::value("")),
        );

        assert_eq!(validate_command(&command), vec![SchemaError::EmptyKey]);
    }

    #[test]
    fn test_validate_schema_accepts_valid_schema() {
        let schema = OptionSchema::new()
            .with_option(
                OptionSpec::value("build-type")
                    .with_abbr('b')
                    .with_default("development")
                    .with_values(["production", "development"]),
            )
            .with_option(OptionSpec::flag("no-prompt"));

        assert!(validate_schema(&schema).is_empty());
    }
}
