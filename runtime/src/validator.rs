//! Argument validation and normalization.
//!
//! The [`Validator`] walks an [`OptionSchema`] and turns a raw
//! [`ArgumentSet`] into a normalized one: strings trimmed, values coerced to
//! their declared type, defaults filled in, required options present and
//! constrained options verified against their allowed set. Directory options
//! are resolved and checked last, so no filesystem probe happens for input
//! that is already known to be bad.

use std::path::PathBuf;

use buildcmd_core::{ArgValue, ArgumentSet, OptionSchema, OptionSpec, ValueType};
use tracing::debug;

use crate::error::ValidationError;
use crate::probe::FsProbe;
use crate::prompt::{LineReader, prompt_for};

/// Validates argument sets against option schemas.
pub struct Validator<'a> {
    probe: &'a dyn FsProbe,
    cwd: PathBuf,
    interactive: bool,
}

impl<'a> Validator<'a> {
    /// Creates a non-interactive validator resolving directories against
    /// `cwd`.
    pub fn new(probe: &'a dyn FsProbe, cwd: impl Into<PathBuf>) -> Self {
        Self {
            probe,
            cwd: cwd.into(),
            interactive: false,
        }
    }

    /// Allows prompting for missing or invalid values.
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Validates `args` against `options` and returns the normalized set.
    ///
    /// Options are checked in schema order. The input is consumed and a new
    /// set is returned, so a failed call leaves nothing half-normalized
    /// behind.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::MissingRequiredOption`] for a required option
    ///   with no value that could not be prompted for.
    /// - [`ValidationError::InvalidOptionValue`] for a value that fails
    ///   coercion or is outside the allowed set and could not be re-entered.
    /// - [`ValidationError::InvalidProjectDir`] for a directory option that
    ///   does not name a directory.
    /// - [`ValidationError::Prompt`] if reading input fails.
    pub fn validate(
        &self,
        args: ArgumentSet,
        options: &OptionSchema,
        reader: &mut dyn LineReader,
    ) -> Result<ArgumentSet, ValidationError> {
        let mut args = args;

        for spec in options {
            let supplied = args.get(&spec.key).filter(|v| !v.is_blank()).cloned();
            match supplied {
                Some(raw) => {
                    let value = match check_value(spec, &raw) {
                        Ok(value) => value,
                        Err(reason) => self.recover_invalid(spec, &raw, reason, reader)?,
                    };
                    args.set(spec.key.clone(), value);
                }
                None => {
                    if let Some(default) = &spec.default {
                        args.set(spec.key.clone(), default.clone());
                    } else if spec.required {
                        let value = self.recover_missing(spec, reader)?;
                        args.set(spec.key.clone(), value);
                    } else {
                        args.remove(&spec.key);
                    }
                }
            }
        }

        for spec in options.iter().filter(|s| s.value_type == ValueType::Directory) {
            let Some(path) = args.get_str(&spec.key) else {
                continue;
            };
            let resolved = self.cwd.join(path);
            if !self.probe.is_dir(&resolved) {
                return Err(ValidationError::InvalidProjectDir { path: resolved });
            }
            args.set(spec.key.clone(), resolved.to_string_lossy().into_owned());
        }

        Ok(args)
    }

    fn recover_invalid(
        &self,
        spec: &OptionSpec,
        raw: &ArgValue,
        reason: String,
        reader: &mut dyn LineReader,
    ) -> Result<ArgValue, ValidationError> {
        let error = ValidationError::InvalidOptionValue {
            key: spec.key.clone(),
            value: raw.to_string().trim().to_string(),
            reason,
        };
        if !self.can_prompt(spec) {
            return Err(error);
        }

        debug!(key = %spec.key, "re-prompting for invalid value");
        let message = spec
            .prompt
            .as_ref()
            .and_then(|p| p.error.clone())
            .map(|e| format!("{e}: {}", raw.to_string().trim()))
            .unwrap_or_else(|| error.to_string());
        reader.rejected(&message);

        match prompt_for(spec, reader) {
            Err(ValidationError::PromptAbandoned { .. }) => Err(error),
            other => other,
        }
    }

    fn recover_missing(
        &self,
        spec: &OptionSpec,
        reader: &mut dyn LineReader,
    ) -> Result<ArgValue, ValidationError> {
        let missing = || ValidationError::MissingRequiredOption {
            key: spec.key.clone(),
        };
        if !self.can_prompt(spec) {
            return Err(missing());
        }

        debug!(key = %spec.key, "prompting for missing value");
        match prompt_for(spec, reader) {
            Err(ValidationError::PromptAbandoned { .. }) => Err(missing()),
            other => other,
        }
    }

    fn can_prompt(&self, spec: &OptionSpec) -> bool {
        self.interactive && spec.prompt.is_some()
    }
}

/// Coerces and range-checks one supplied value.
fn check_value(spec: &OptionSpec, raw: &ArgValue) -> Result<ArgValue, String> {
    let value = normalize_value(spec, raw)?;
    if spec.accepts(&value.to_string()) {
        Ok(value)
    } else {
        Err(allowed_reason(spec))
    }
}

fn allowed_reason(spec: &OptionSpec) -> String {
    match &spec.values {
        Some(values) => format!("expected one of: {}", values.join(", ")),
        None => "value not allowed".to_string(),
    }
}

/// Trims text and coerces it to the option's value type.
pub(crate) fn normalize_value(spec: &OptionSpec, raw: &ArgValue) -> Result<ArgValue, String> {
    match spec.value_type {
        ValueType::Bool => match raw {
            ArgValue::Flag(flag) => Ok(ArgValue::Flag(*flag)),
            ArgValue::Number(n) => Ok(ArgValue::Flag(*n != 0.0)),
            ArgValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(ArgValue::Flag(true)),
                "false" | "no" | "0" => Ok(ArgValue::Flag(false)),
                _ => Err("expected true or false".to_string()),
            },
        },
        ValueType::Number => match raw {
            ArgValue::Number(n) => Ok(ArgValue::Number(*n)),
            ArgValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .map(ArgValue::Number)
                .map_err(|_| "expected a number".to_string()),
            ArgValue::Flag(_) => Err("expected a number".to_string()),
        },
        ValueType::String | ValueType::Directory => match raw {
            ArgValue::Text(text) => Ok(ArgValue::Text(text.trim().to_string())),
            other => Ok(ArgValue::Text(other.to_string())),
        },
    }
}

#[cfg(test)]
mod tests {
    use buildcmd_core::PromptSpec;

    use super::*;
    use crate::probe::MemoryProbe;
    use crate::prompt::ScriptedLineReader;

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .with_option(
                OptionSpec::value("build-type")
                    .with_abbr('b')
                    .with_default("development")
                    .with_values(["production", "development"]),
            )
            .with_option(
                OptionSpec::value("platform")
                    .with_abbr('p')
                    .with_values(["android", "ios", "mobileweb"])
                    .required()
                    .with_prompt(PromptSpec::new("Target platform").with_error("Invalid platform")),
            )
            .with_option(
                OptionSpec::value("dir")
                    .with_abbr('d')
                    .with_type(ValueType::Directory),
            )
    }

    #[test]
    fn test_trims_and_fills_defaults() {
        let probe = MemoryProbe::new();
        let validator = Validator::new(&probe, "/work");
        let args = ArgumentSet::new("buildcmd").with("platform", "  ios ");

        let args = validator
            .validate(args, &schema(), &mut ScriptedLineReader::default())
            .unwrap();

        assert_eq!(args.get_str("platform"), Some("ios"));
        assert_eq!(args.get_str("build-type"), Some("development"));
        assert!(args.get("dir").is_none());
    }

    #[test]
    fn test_unknown_value_is_invalid_when_not_interactive() {
        let probe = MemoryProbe::new();
        let validator = Validator::new(&probe, "/work");
        let args = ArgumentSet::new("buildcmd").with("platform", "bogus");

        let err = validator
            .validate(args, &schema(), &mut ScriptedLineReader::default())
            .unwrap_err();

        match err {
            ValidationError::InvalidOptionValue { key, value, .. } => {
                assert_eq!(key, "platform");
                assert_eq!(value, "bogus");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_membership_is_case_sensitive() {
        let probe = MemoryProbe::new();
        let validator = Validator::new(&probe, "/work");
        let args = ArgumentSet::new("buildcmd")
            .with("platform", "android")
            .with("build-type", "Production");

        let err = validator
            .validate(args, &schema(), &mut ScriptedLineReader::default())
            .unwrap_err();

        assert_eq!(err.key(), Some("build-type"));
    }

    #[test]
    fn test_missing_required_without_prompting_never_probes() {
        let probe = MemoryProbe::new();
        let validator = Validator::new(&probe, "/work");
        let args = ArgumentSet::new("buildcmd").with("dir", "app");

        let err = validator
            .validate(args, &schema(), &mut ScriptedLineReader::default())
            .unwrap_err();

        assert!(matches!(err, ValidationError::MissingRequiredOption { ref key } if key == "platform"));
        assert_eq!(probe.calls(), 0);
    }

    #[test]
    fn test_missing_required_is_prompted_when_interactive() {
        let probe = MemoryProbe::new();
        let validator = Validator::new(&probe, "/work").interactive(true);
        let mut reader = ScriptedLineReader::new(["", " android "]);

        let args = validator
            .validate(ArgumentSet::new("buildcmd"), &schema(), &mut reader)
            .unwrap();

        assert_eq!(args.get_str("platform"), Some("android"));
        assert_eq!(reader.labels().len(), 2);
    }

    #[test]
    fn test_invalid_value_is_reentered_when_interactive() {
        let probe = MemoryProbe::new();
        let validator = Validator::new(&probe, "/work").interactive(true);
        let mut reader = ScriptedLineReader::new(["mobileweb"]);
        let args = ArgumentSet::new("buildcmd").with("platform", "bogus");

        let args = validator.validate(args, &schema(), &mut reader).unwrap();

        assert_eq!(args.get_str("platform"), Some("mobileweb"));
        assert_eq!(reader.rejections(), ["Invalid platform: bogus"]);
    }

    #[test]
    fn test_abandoned_reentry_keeps_invalid_value_error() {
        let probe = MemoryProbe::new();
        let validator = Validator::new(&probe, "/work").interactive(true);
        let args = ArgumentSet::new("buildcmd").with("platform", "bogus");

        let err = validator
            .validate(args, &schema(), &mut ScriptedLineReader::default())
            .unwrap_err();

        assert!(matches!(err, ValidationError::InvalidOptionValue { .. }));
    }

    #[test]
    fn test_directory_is_resolved_against_cwd() {
        let probe = MemoryProbe::new().with_dir("/work/app");
        let validator = Validator::new(&probe, "/work");
        let args = ArgumentSet::new("buildcmd")
            .with("platform", "android")
            .with("dir", "app");

        let args = validator
            .validate(args, &schema(), &mut ScriptedLineReader::default())
            .unwrap();

        assert_eq!(args.get_str("dir"), Some("/work/app"));
    }

    #[test]
    fn test_missing_directory_is_rejected() {
        let probe = MemoryProbe::new();
        let validator = Validator::new(&probe, "/work");
        let args = ArgumentSet::new("buildcmd")
            .with("platform", "android")
            .with("dir", "nowhere");

        let err = validator
            .validate(args, &schema(), &mut ScriptedLineReader::default())
            .unwrap_err();

        assert!(matches!(err, ValidationError::InvalidProjectDir { .. }));
    }

    #[test]
    fn test_coerces_numbers_and_booleans() {
        let schema = OptionSchema::new()
            .with_option(OptionSpec::value("retries").with_type(ValueType::Number))
            .with_option(OptionSpec::flag("force"));
        let probe = MemoryProbe::new();
        let validator = Validator::new(&probe, "/work");
        let args = ArgumentSet::new("buildcmd")
            .with("retries", " 3 ")
            .with("force", "yes");

        let args = validator
            .validate(args, &schema, &mut ScriptedLineReader::default())
            .unwrap();

        assert_eq!(args.get("retries"), Some(&ArgValue::Number(3.0)));
        assert!(args.is_set("force"));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let probe = MemoryProbe::new().with_dir("/work/app");
        let validator = Validator::new(&probe, "/work");
        let args = ArgumentSet::new("buildcmd")
            .with("platform", " android")
            .with("dir", "app");

        let once = validator
            .validate(args, &schema(), &mut ScriptedLineReader::default())
            .unwrap();
        let twice = validator
            .validate(once.clone(), &schema(), &mut ScriptedLineReader::default())
            .unwrap();

        assert_eq!(once, twice);
    }
}
