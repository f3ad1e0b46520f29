//! Built-in command definitions.

use buildcmd_core::{CommandSpec, OptionSchema, OptionSpec, PromptSpec, ValueType};

use crate::config::BuildConfig;

pub const BUILD_COMMAND: &str = "build";

/// Option that selects the platform.
pub const PLATFORM_OPTION: &str = "platform";

/// Option naming the project directory.
pub const PROJECT_DIR_OPTION: &str = "dir";

/// Log filters accepted by `--log-level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Options every command accepts.
pub fn common_options() -> OptionSchema {
    OptionSchema::new()
        .with_option(
            OptionSpec::value("sdk")
                .with_abbr('s')
                .with_description("the SDK root to use, otherwise the configured or bundled one")
                .with_hint("path"),
        )
        .with_option(
            OptionSpec::value("log-level")
                .with_abbr('l')
                .with_description("minimum level of diagnostic output")
                .with_hint("level")
                .with_values(LOG_LEVELS.iter().copied()),
        )
        .with_option(OptionSpec::flag("no-prompt").with_description("disable interactive prompting"))
        .with_option(
            OptionSpec::value("config")
                .with_description("configuration file to load")
                .with_hint("file"),
        )
}

/// The `build` command for the platforms listed in `config`.
pub fn build_command(config: &BuildConfig) -> CommandSpec {
    let platforms = config.platforms.clone();
    let available = platforms.clone();
    let build_type = config
        .cli
        .build_type
        .clone()
        .unwrap_or_else(|| "development".to_string());

    let prompt = PromptSpec::new(format!("Target platform [{}]", platforms.join(",")))
        .with_error("Invalid platform")
        .with_validator(move |input| {
            let platform = input.trim();
            if platform.is_empty() {
                return Err("Invalid platform".to_string());
            }
            if !available.iter().any(|p| p == platform) {
                return Err(format!("Invalid platform: {platform}"));
            }
            Ok(platform.to_string())
        });

    CommandSpec::new(BUILD_COMMAND, "Build")
        .with_description("builds a project")
        .with_extended_description("Builds an existing app or module project.")
        .with_success_message("Project built successfully")
        .with_variant_option(PLATFORM_OPTION)
        .with_option(
            OptionSpec::value("build-type")
                .with_abbr('b')
                .with_default(build_type)
                .with_description("the type of build to perform")
                .with_hint("type")
                .with_values(["production", "development"]),
        )
        .with_option(
            OptionSpec::value(PLATFORM_OPTION)
                .with_abbr('p')
                .with_description("the target build platform")
                .with_hint("platform")
                .with_values(platforms)
                .required()
                .with_prompt(prompt),
        )
        .with_option(
            OptionSpec::value(PROJECT_DIR_OPTION)
                .with_abbr('d')
                .with_type(ValueType::Directory)
                .with_description("the directory containing the project, otherwise the current working directory"),
        )
}
