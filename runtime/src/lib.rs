//! Command lifecycle and platform delegation for buildcmd.
//!
//! This crate runs one command invocation end to end on top of the option
//! schemas from `buildcmd-core`:
//!
//! - [`CommandLifecycle`] merges options, validates arguments, resolves a
//!   platform backend and delegates to it.
//! - [`Validator`] normalizes arguments and re-prompts through a
//!   [`LineReader`] when allowed.
//! - [`BackendResolver`] finds the handler for the selected platform in a
//!   [`BackendRegistry`].
//! - [`Completion`] is the single-fire signal a backend uses to report that
//!   its work is done.
//!
//! Host collaborators (logger, filesystem probe, line reader) are traits, so
//! every phase runs in tests without a terminal or an SDK on disk.

mod backend;
mod commands;
mod completion;
mod config;
mod duration;
mod error;
mod executable;
mod lifecycle;
mod logger;
mod probe;
mod prompt;
mod resolver;
mod validator;

pub use backend::{Backend, BackendContext, BackendRegistry};
pub use commands::{
    BUILD_COMMAND, LOG_LEVELS, PLATFORM_OPTION, PROJECT_DIR_OPTION, build_command, common_options,
};
pub use completion::{Completion, CompletionDropped, CompletionWaiter, completion_channel};
pub use config::{BuildConfig, CONFIG_ENV, CliSettings, DEFAULT_PLATFORMS, SdkConfig};
pub use duration::pretty_duration;
pub use error::{
    BackendFailure, ConfigFileError, LifecycleError, ResolutionError, ValidationError,
};
pub use executable::{ENV_PREFIX, ExecutableBackend, env_var_name};
pub use lifecycle::{BuildReport, CommandLifecycle, LifecycleContext, LifecycleState};
pub use logger::{ConsoleLogger, LogLevel, Logger, MemoryLogger};
pub use probe::{FsProbe, MemoryProbe, RealFs};
pub use prompt::{LineReader, PromptState, ScriptedLineReader, StdioLineReader, prompt_for};
pub use resolver::{BackendHandle, BackendResolver, commands_dir, handler_path};
pub use validator::Validator;

pub use buildcmd_core::{ArgValue, ArgumentSet, CommandSpec, OptionSchema, OptionSpec};
