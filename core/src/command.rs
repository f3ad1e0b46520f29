//! Command descriptors.
//!
//! A [`CommandSpec`] names a command, its own options, the option that
//! selects a variant, and the per-variant option layers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{OptionSchema, OptionSpec};

/// Declarative description of one command's configuration surface.
///
/// A command carries its own options plus one option layer per variant
/// (platform). Which option selects the variant is named by
/// [`variant_option`](CommandSpec::variant_option).
///
/// # Examples
///
/// ```
/// use buildcmd_core::*;
///
/// let command = CommandSpec::new("build", "Build")
///     .with_description("builds a project")
///     .with_option(OptionSpec::value("platform").with_abbr('p').required())
///     .with_platform_options(
///         "android",
///         OptionSchema::new().with_option(OptionSpec::value("target").with_abbr('T')),
///     );
///
/// assert_eq!(command.variant_option, "platform");
/// assert_eq!(command.platform_names(), vec!["android"]);
/// assert_eq!(command.options.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Command name as typed (`build`).
    pub name: String,
    /// Short title shown in help listings.
    pub title: String,
    /// One-line description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Longer description shown by `--help`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_description: Option<String>,
    /// Options specific to this command.
    #[serde(default)]
    pub options: OptionSchema,
    /// Extra options per variant.
    #[serde(default)]
    pub platforms: BTreeMap<String, OptionSchema>,
    /// Key of the option whose value selects the variant.
    #[serde(default = "default_variant_option")]
    pub variant_option: String,
    /// Message reported when the delegated work completes.
    #[serde(default = "default_success_message")]
    pub success_message: String,
}

fn default_variant_option() -> String {
    "platform".to_string()
}

fn default_success_message() -> String {
    "Command completed successfully".to_string()
}

impl CommandSpec {
    /// Creates a command with no options.
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            description: None,
            extended_description: None,
            options: OptionSchema::new(),
            platforms: BTreeMap::new(),
            variant_option: default_variant_option(),
            success_message: default_success_message(),
        }
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn with_extended_description(mut self, desc: &str) -> Self {
        self.extended_description = Some(desc.to_string());
        self
    }

    /// Adds a command option.
    pub fn with_option(mut self, spec: OptionSpec) -> Self {
        self.options.insert(spec);
        self
    }

    /// Sets the option layer for one variant.
    pub fn with_platform_options(mut self, variant: impl Into<String>, schema: OptionSchema) -> Self {
        self.platforms.insert(variant.into(), schema);
        self
    }

    /// Names the option that selects the variant.
    pub fn with_variant_option(mut self, key: impl Into<String>) -> Self {
        self.variant_option = key.into();
        self
    }

    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = message.into();
        self
    }

    /// Variants that declare an option layer, in sorted order.
    pub fn platform_names(&self) -> Vec<&str> {
        self.platforms.keys().map(String::as_str).collect()
    }
}
