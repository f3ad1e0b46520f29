//! Core option types for build commands.
//!
//! This crate defines how a command declares its configuration surface:
//!
//! - [`OptionSpec`]: one recognized option with alias, default, allowed
//!   values, and an optional interactive [`PromptSpec`].
//! - [`OptionSchema`]: an ordered, key-unique set of options.
//! - [`CommandSpec`]: a named command with its own options and one option
//!   layer per variant (platform).
//! - [`ArgumentSet`]: parsed values for one invocation.
//!
//! Validation ([`validate_schema`], [`validate_command`]) catches structural
//! errors such as malformed keys and duplicate aliases.
//!
//! Merging ([`MergedOptions::merge`], [`layer_options`]) stacks common,
//! command and variant options and rejects alias collisions.
//!
//! # Example
//!
//! ```
//! use buildcmd_core::*;
//!
//! let common = OptionSchema::new()
//!     .with_option(OptionSpec::value("sdk").with_abbr('s'));
//! let command = CommandSpec::new("build", "Build")
//!     .with_option(
//!         OptionSpec::value("platform")
//!             .with_abbr('p')
//!             .with_values(["android", "ios"])
//!             .required(),
//!     );
//!
//! assert!(validate_command(&command).is_empty());
//! let merged = MergedOptions::merge(&common, &command.options, &command.platforms).unwrap();
//! assert!(merged.base().contains("platform"));
//! assert!(merged.base().contains("sdk"));
//! ```

mod args;
mod command;
mod merge;
mod types;
mod validate;

pub use args::ArgumentSet;
pub use command::CommandSpec;
pub use merge::{ConfigError, MergedOptions, layer_options};
pub use types::*;
pub use validate::{SchemaError, validate_command, validate_schema};
