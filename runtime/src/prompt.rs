//! Interactive prompting for missing or invalid option values.
//!
//! Prompting is a small state machine: it starts in
//! [`PromptState::Prompting`], moves to [`PromptState::Accepted`] once a
//! line passes every check, and to [`PromptState::Abandoned`] when the line
//! reader reports end of input. Rejected lines loop back to `Prompting`.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use buildcmd_core::{ArgValue, OptionSpec};
use tracing::debug;

use crate::error::ValidationError;
use crate::validator::normalize_value;

/// Source of interactive input.
pub trait LineReader {
    /// Shows `label` and reads one line.
    ///
    /// Returns `Ok(None)` when no more input will come, which abandons the
    /// prompt.
    fn read_line(&mut self, label: &str) -> io::Result<Option<String>>;

    /// Shows why the previous line was rejected.
    fn rejected(&mut self, _message: &str) {}
}

/// Reads from stdin, writes labels to stdout and rejections to stderr.
#[derive(Debug, Default)]
pub struct StdioLineReader;

impl LineReader for StdioLineReader {
    fn read_line(&mut self, label: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{label}: ")?;
        stdout.flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn rejected(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

/// Replays canned answers; abandons once they run out.
#[derive(Debug, Default)]
pub struct ScriptedLineReader {
    answers: VecDeque<String>,
    labels: Vec<String>,
    rejections: Vec<String>,
}

impl ScriptedLineReader {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            labels: Vec::new(),
            rejections: Vec::new(),
        }
    }

    /// Labels shown so far, one per read.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Rejection messages shown so far.
    pub fn rejections(&self) -> &[String] {
        &self.rejections
    }
}

impl LineReader for ScriptedLineReader {
    fn read_line(&mut self, label: &str) -> io::Result<Option<String>> {
        self.labels.push(label.to_string());
        Ok(self.answers.pop_front())
    }

    fn rejected(&mut self, message: &str) {
        self.rejections.push(message.to_string());
    }
}

/// State of one prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptState {
    Prompting { attempts: usize },
    Accepted(ArgValue),
    Abandoned,
}

/// Asks for `spec` until a line is accepted or input ends.
///
/// # Errors
///
/// - [`ValidationError::MissingRequiredOption`] if `spec` has no prompt.
/// - [`ValidationError::PromptAbandoned`] when the reader runs dry.
/// - [`ValidationError::Prompt`] if reading fails.
pub fn prompt_for(
    spec: &OptionSpec,
    reader: &mut dyn LineReader,
) -> Result<ArgValue, ValidationError> {
    let Some(prompt) = &spec.prompt else {
        return Err(ValidationError::MissingRequiredOption {
            key: spec.key.clone(),
        });
    };

    let mut state = PromptState::Prompting { attempts: 0 };
    loop {
        state = match state {
            PromptState::Prompting { attempts } => match reader.read_line(&prompt.label)? {
                None => PromptState::Abandoned,
                Some(line) => match accept_line(spec, &line) {
                    Ok(value) => PromptState::Accepted(value),
                    Err(message) => {
                        debug!(key = %spec.key, attempts, "prompt input rejected");
                        reader.rejected(&message);
                        PromptState::Prompting {
                            attempts: attempts + 1,
                        }
                    }
                },
            },
            PromptState::Accepted(value) => return Ok(value),
            PromptState::Abandoned => {
                return Err(ValidationError::PromptAbandoned {
                    key: spec.key.clone(),
                });
            }
        };
    }
}

/// Runs one typed line through the prompt validator and the option's own
/// checks.
fn accept_line(spec: &OptionSpec, line: &str) -> Result<ArgValue, String> {
    let fallback = || {
        spec.prompt
            .as_ref()
            .and_then(|p| p.error.clone())
            .unwrap_or_else(|| format!("Invalid value for --{}", spec.key))
    };

    let candidate = match spec.prompt.as_ref().and_then(|p| p.validator.as_ref()) {
        Some(validator) => validator.check(line)?,
        None => line.trim().to_string(),
    };
    if candidate.trim().is_empty() {
        return Err(fallback());
    }

    let value = normalize_value(spec, &ArgValue::Text(candidate))?;
    if !spec.accepts(&value.to_string()) {
        return Err(fallback());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use buildcmd_core::PromptSpec;

    use super::*;

    fn platform() -> OptionSpec {
        OptionSpec::value("platform")
            .with_values(["android", "ios"])
            .required()
            .with_prompt(PromptSpec::new("Target platform [android,ios]").with_error("Invalid platform"))
    }

    #[test]
    fn test_prompt_accepts_trimmed_value() {
        let mut reader = ScriptedLineReader::new([" android "]);

        let value = prompt_for(&platform(), &mut reader).unwrap();

        assert_eq!(value, ArgValue::from("android"));
        assert_eq!(reader.labels(), ["Target platform [android,ios]"]);
    }

    #[test]
    fn test_prompt_reasks_after_rejection() {
        let mut reader = ScriptedLineReader::new(["", "bogus", "ios"]);

        let value = prompt_for(&platform(), &mut reader).unwrap();

        assert_eq!(value, ArgValue::from("ios"));
        assert_eq!(reader.labels().len(), 3);
        assert_eq!(reader.rejections(), ["Invalid platform", "Invalid platform"]);
    }

    #[test]
    fn test_prompt_validator_message_is_shown() {
        let spec = platform().with_prompt(PromptSpec::new("Target platform").with_validator(|input| {
            match input.trim() {
                "" => Err("Invalid platform".to_string()),
                "android" | "ios" => Ok(input.trim().to_string()),
                other => Err(format!("Invalid platform: {other}")),
            }
        }));
        let mut reader = ScriptedLineReader::new(["bogus", "android"]);

        let value = prompt_for(&spec, &mut reader).unwrap();

        assert_eq!(value, ArgValue::from("android"));
        assert_eq!(reader.rejections(), ["Invalid platform: bogus"]);
    }

    #[test]
    fn test_prompt_abandoned_at_end_of_input() {
        let mut reader = ScriptedLineReader::new(["bogus"]);

        let err = prompt_for(&platform(), &mut reader).unwrap_err();

        assert!(matches!(err, ValidationError::PromptAbandoned { ref key } if key == "platform"));
    }

    #[test]
    fn test_option_without_prompt_is_missing() {
        let spec = OptionSpec::value("platform").required();
        let mut reader = ScriptedLineReader::new(["android"]);

        let err = prompt_for(&spec, &mut reader).unwrap_err();

        assert!(matches!(err, ValidationError::MissingRequiredOption { .. }));
        assert!(reader.labels().is_empty());
    }
}
