//! Error types for the command lifecycle.
//!
//! Each phase has its own error: validation, backend resolution and the
//! configuration file. [`LifecycleError`] wraps them all, plus the failures
//! that belong to the delegated backend.

use std::fmt;
use std::path::PathBuf;

use buildcmd_core::ConfigError;
use thiserror::Error;

use crate::lifecycle::LifecycleState;

/// Errors produced while validating an argument set.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required option has no value and cannot be prompted for.
    #[error("missing required option: --{key}")]
    MissingRequiredOption { key: String },

    /// A supplied value failed coercion or the allowed-values check.
    #[error("invalid value '{value}' for option --{key}: {reason}")]
    InvalidOptionValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The user abandoned an interactive prompt (end of input).
    #[error("no value entered for option --{key}")]
    PromptAbandoned { key: String },

    /// Reading from the line reader failed.
    #[error("prompt error: {0}")]
    Prompt(#[from] std::io::Error),

    /// The project directory does not exist or is not a directory.
    #[error("invalid project directory: {}", path.display())]
    InvalidProjectDir { path: PathBuf },

    /// The variant's own validation hook rejected the arguments.
    #[error("invalid {variant} options: {message}")]
    Variant { variant: String, message: String },
}

impl ValidationError {
    /// The option key this error is about, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            ValidationError::MissingRequiredOption { key }
            | ValidationError::InvalidOptionValue { key, .. }
            | ValidationError::PromptAbandoned { key } => Some(key),
            _ => None,
        }
    }
}

/// Errors produced while locating a backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No handler exists for the variant at the conventional path.
    #[error("Unable to find platform specific {command} command")]
    BackendNotFound {
        variant: String,
        command: String,
        path: PathBuf,
    },
}

impl ResolutionError {
    /// The path that was probed.
    pub fn path(&self) -> &PathBuf {
        match self {
            ResolutionError::BackendNotFound { path, .. } => path,
        }
    }

    /// Copy-pasteable instruction for repairing the installation.
    ///
    /// `invocation` is the program name as the user typed it.
    pub fn remediation(&self, invocation: &str) -> String {
        format!(
            "Your SDK installation may be corrupt. You can reinstall it by running '{invocation} sdk update --force --default'."
        )
    }
}

/// Opaque failure reported by a backend's `run`.
///
/// The lifecycle passes it through without interpreting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendFailure {
    pub message: String,
    pub exit_code: Option<i32>,
}

impl BackendFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: None,
        }
    }

    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }
}

impl fmt::Display for BackendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "{} (exit code {code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for BackendFailure {}

/// Errors reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Any failure of a command lifecycle.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The backend failed; reported by the backend itself.
    #[error("build failed: {0}")]
    Backend(#[from] BackendFailure),

    /// The backend returned without ever firing its completion signal.
    #[error("backend finished without signalling completion")]
    CompletionDropped,

    /// A phase was called out of order.
    #[error("cannot {action} while the lifecycle is {state}")]
    InvalidState {
        action: &'static str,
        state: LifecycleState,
    },
}

impl LifecycleError {
    /// Whether the lifecycle already printed this error through its logger.
    pub fn is_reported(&self) -> bool {
        matches!(
            self,
            LifecycleError::Config(_) | LifecycleError::Validation(_) | LifecycleError::Resolution(_)
        )
    }
}

/// Convenience alias for lifecycle results.
pub type Result<T> = std::result::Result<T, LifecycleError>;
