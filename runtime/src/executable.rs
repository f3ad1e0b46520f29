//! Backends implemented by an executable inside the SDK.
//!
//! Each platform ships its handlers under `<sdk>/<platform>/cli/commands/`.
//! The handler for a command is the file `_<command>`; an optional
//! `_<command>.yml` next to it declares the options the platform adds.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use buildcmd_core::OptionSchema;
use tracing::{debug, info, warn};

use crate::backend::{Backend, BackendContext};
use crate::completion::Completion;
use crate::error::{BackendFailure, ConfigFileError};
use crate::resolver::commands_dir;

/// Prefix of every environment variable passed to a handler.
pub const ENV_PREFIX: &str = "BUILDCMD_";

/// Runs the platform's handler as a child process.
///
/// The child runs in the project directory and receives every normalized
/// argument as a `BUILDCMD_<KEY>` environment variable, plus the whole set
/// as JSON in `BUILDCMD_ARGS`. Exit status 0 fires completion.
#[derive(Debug, Clone)]
pub struct ExecutableBackend {
    variant: String,
    sdk_root: PathBuf,
}

impl ExecutableBackend {
    pub fn new(variant: impl Into<String>, sdk_root: impl Into<PathBuf>) -> Self {
        Self {
            variant: variant.into(),
            sdk_root: sdk_root.into(),
        }
    }

    /// Location of the option file for `command`.
    pub fn options_path(&self, command: &str) -> PathBuf {
        commands_dir(&self.sdk_root, &self.variant).join(format!("_{command}.yml"))
    }

    fn load_options(path: &Path) -> Result<OptionSchema, ConfigFileError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }
}

/// Environment variable name for option `key`.
pub fn env_var_name(key: &str) -> String {
    format!("{ENV_PREFIX}{}", key.to_ascii_uppercase().replace('-', "_"))
}

/// Environment for a handler run.
///
/// The fixed variables are inserted after the per-argument ones, so an
/// option such as `sdk-root` or `args` cannot shadow them.
fn handler_env(ctx: &BackendContext<'_>) -> BTreeMap<String, String> {
    let mut env: BTreeMap<String, String> = ctx
        .args
        .iter()
        .map(|(key, value)| (env_var_name(key), value.to_string()))
        .collect();

    let fixed = [
        ("COMMAND", ctx.command.to_string()),
        ("PLATFORM", ctx.variant.to_string()),
        ("SDK_ROOT", ctx.sdk_root.to_string_lossy().into_owned()),
        ("PROJECT_DIR", ctx.project_dir.to_string_lossy().into_owned()),
        ("ARGS", ctx.args.to_json().to_string()),
    ];
    for (name, value) in fixed {
        env.insert(format!("{ENV_PREFIX}{name}"), value);
    }
    env
}

impl Backend for ExecutableBackend {
    fn configure(&self, command: &str) -> OptionSchema {
        let path = self.options_path(command);
        if !path.is_file() {
            return OptionSchema::new();
        }
        match Self::load_options(&path) {
            Ok(schema) => {
                debug!(variant = %self.variant, path = %path.display(), options = schema.len(), "loaded platform options");
                schema
            }
            Err(err) => {
                warn!(variant = %self.variant, path = %path.display(), error = %err, "ignoring unreadable platform options");
                OptionSchema::new()
            }
        }
    }

    fn run(&self, ctx: &BackendContext<'_>, completion: Completion) -> Result<(), BackendFailure> {
        let mut child = Command::new(ctx.handler_path);
        child.current_dir(ctx.project_dir).envs(handler_env(ctx));

        info!(variant = %ctx.variant, handler = %ctx.handler_path.display(), "running platform handler");
        let status = child.status().map_err(|err| {
            BackendFailure::new(format!(
                "failed to start {}: {err}",
                ctx.handler_path.display()
            ))
        })?;

        if status.success() {
            completion.complete();
            return Ok(());
        }

        let failure = BackendFailure::new(format!("{} {} handler failed", ctx.variant, ctx.command));
        Err(match status.code() {
            Some(code) => failure.with_exit_code(code),
            None => failure,
        })
    }
}

#[cfg(test)]
mod tests {
    use buildcmd_core::ArgumentSet;

    use crate::config::BuildConfig;
    use crate::logger::MemoryLogger;

    use super::*;

    fn write_options(sdk: &Path, yaml: &str) {
        let dir = sdk.join("android").join("cli").join("commands");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("_build.yml"), yaml).unwrap();
    }

    #[test]
    fn test_env_var_name() {
        assert_eq!(env_var_name("build-type"), "BUILDCMD_BUILD_TYPE");
        assert_eq!(env_var_name("platform"), "BUILDCMD_PLATFORM");
    }

    #[test]
    fn test_configure_reads_option_file() {
        let sdk = tempfile::tempdir().unwrap();
        write_options(
            sdk.path(),
            "- key: target\n  abbr: T\n  values: [emulator, device]\n- key: avd-id\n",
        );
        let backend = ExecutableBackend::new("android", sdk.path());

        let schema = backend.configure("build");

        assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["target", "avd-id"]);
        assert_eq!(schema.get_by_abbr('T').map(|s| s.key.as_str()), Some("target"));
    }

    #[test]
    fn test_configure_without_option_file_is_empty() {
        let sdk = tempfile::tempdir().unwrap();
        let backend = ExecutableBackend::new("ios", sdk.path());

        assert!(backend.configure("build").is_empty());
    }

    #[test]
    fn test_configure_ignores_malformed_option_file() {
        let sdk = tempfile::tempdir().unwrap();
        write_options(sdk.path(), "key: [unterminated");
        let backend = ExecutableBackend::new("android", sdk.path());

        assert!(backend.configure("build").is_empty());
    }

    #[test]
    fn test_handler_env_exports_arguments() {
        let logger = MemoryLogger::new();
        let config = BuildConfig::default();
        let args = ArgumentSet::new("buildcmd")
            .with("platform", "android")
            .with("build-type", "production");
        let ctx = BackendContext {
            logger: &logger,
            config: &config,
            args: &args,
            command: "build",
            variant: "android",
            sdk_root: Path::new("/sdk"),
            project_dir: Path::new("/work/app"),
            handler_path: Path::new("/sdk/android/cli/commands/_build"),
        };

        let env = handler_env(&ctx);

        assert_eq!(env["BUILDCMD_BUILD_TYPE"], "production");
        assert_eq!(env["BUILDCMD_COMMAND"], "build");
        assert_eq!(env["BUILDCMD_PROJECT_DIR"], "/work/app");
        assert!(env["BUILDCMD_ARGS"].contains("\"build-type\""));
    }

    #[test]
    fn test_fixed_env_vars_win_over_option_keys() {
        let logger = MemoryLogger::new();
        let config = BuildConfig::default();
        let args = ArgumentSet::new("buildcmd")
            .with("platform", "android")
            .with("sdk-root", "bogus")
            .with("args", "bogus")
            .with("project-dir", "bogus");
        let ctx = BackendContext {
            logger: &logger,
            config: &config,
            args: &args,
            command: "build",
            variant: "android",
            sdk_root: Path::new("/sdk"),
            project_dir: Path::new("/work/app"),
            handler_path: Path::new("/sdk/android/cli/commands/_build"),
        };

        let env = handler_env(&ctx);

        assert_eq!(env["BUILDCMD_SDK_ROOT"], "/sdk");
        assert_eq!(env["BUILDCMD_PROJECT_DIR"], "/work/app");
        assert_eq!(env["BUILDCMD_PLATFORM"], "android");
        assert!(env["BUILDCMD_ARGS"].starts_with('{'));
    }
}
