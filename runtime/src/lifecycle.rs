//! The command lifecycle.
//!
//! One [`CommandLifecycle`] drives one invocation through
//! `Configuring → Validating → Resolving → Delegating → Completed`. Failures
//! in the first three phases move it to `Failed` after reporting the error
//! through the logger; a backend failure is passed through untouched. Each
//! phase runs at most once, so the backend is delegated to at most once.
//!
//! # Example
//!
//! ```no_run
//! use buildcmd_runtime::*;
//!
//! let config = BuildConfig::default();
//! let registry = BackendRegistry::with_executables(&config.platforms, std::path::Path::new("/opt/sdk"));
//! let ctx = LifecycleContext {
//!     registry: &registry,
//!     probe: &RealFs,
//!     logger: &ConsoleLogger,
//!     config: &config,
//!     sdk_root: "/opt/sdk".into(),
//!     cwd: std::env::current_dir()?,
//! };
//!
//! let mut lifecycle = CommandLifecycle::new(build_command(&config), common_options(), ctx);
//! let raw = ArgumentSet::new("buildcmd").with("platform", "android");
//! let report = lifecycle.execute(raw, true, &mut StdioLineReader)?;
//! println!("{}", report.message);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use buildcmd_core::{ArgumentSet, CommandSpec, MergedOptions, OptionSchema, layer_options};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::backend::{BackendContext, BackendRegistry};
use crate::commands::PROJECT_DIR_OPTION;
use crate::completion::completion_channel;
use crate::config::BuildConfig;
use crate::duration::pretty_duration;
use crate::error::{LifecycleError, Result, ValidationError};
use crate::logger::Logger;
use crate::probe::FsProbe;
use crate::prompt::LineReader;
use crate::resolver::BackendResolver;
use crate::validator::Validator;

/// Where a lifecycle is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Configuring,
    Validating,
    Resolving,
    Delegating,
    Completed,
    Failed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Configuring => "configuring",
            LifecycleState::Validating => "validating",
            LifecycleState::Resolving => "resolving",
            LifecycleState::Delegating => "delegating",
            LifecycleState::Completed => "completed",
            LifecycleState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Collaborators supplied by the host.
pub struct LifecycleContext<'a> {
    pub registry: &'a BackendRegistry,
    pub probe: &'a dyn FsProbe,
    pub logger: &'a dyn Logger,
    pub config: &'a BuildConfig,
    pub sdk_root: PathBuf,
    /// Directory relative paths resolve against; the default project dir.
    pub cwd: PathBuf,
}

/// Outcome of a completed lifecycle.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub command: String,
    pub variant: String,
    pub started_at: DateTime<Utc>,
    /// Monotonic time from lifecycle start to completion.
    pub elapsed: Duration,
    /// The success line that was reported.
    pub message: String,
}

/// Drives one command invocation.
pub struct CommandLifecycle<'a> {
    command: CommandSpec,
    common: OptionSchema,
    ctx: LifecycleContext<'a>,
    state: LifecycleState,
    started: Instant,
    started_at: DateTime<Utc>,
    merged: Option<MergedOptions>,
    args: Option<ArgumentSet>,
    variant: Option<String>,
}

impl<'a> CommandLifecycle<'a> {
    /// Starts a lifecycle; elapsed time is measured from here.
    pub fn new(command: CommandSpec, common: OptionSchema, ctx: LifecycleContext<'a>) -> Self {
        Self {
            command,
            common,
            ctx,
            state: LifecycleState::Configuring,
            started: Instant::now(),
            started_at: Utc::now(),
            merged: None,
            args: None,
            variant: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn command(&self) -> &CommandSpec {
        &self.command
    }

    /// Merged options, once configured.
    pub fn options(&self) -> Option<&MergedOptions> {
        self.merged.as_ref()
    }

    /// Normalized arguments, once validated.
    pub fn args(&self) -> Option<&ArgumentSet> {
        self.args.as_ref()
    }

    /// The selected variant, once validated.
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Merges common, command and every variant's options.
    ///
    /// Variant layers combine the command's own per-platform options with
    /// whatever each registered backend adds.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Config`] on an option collision; the lifecycle is
    /// then `Failed`.
    pub fn configure(&mut self) -> Result<&MergedOptions> {
        self.expect_state(LifecycleState::Configuring, "configure")?;

        match self.merge_options() {
            Ok(merged) => {
                debug!(command = %self.command.name, options = merged.surface().len(), "configured");
                self.state = LifecycleState::Validating;
                Ok(&*self.merged.insert(merged))
            }
            Err(err) => {
                self.ctx.logger.error(&err.to_string());
                self.state = LifecycleState::Failed;
                Err(err.into())
            }
        }
    }

    fn merge_options(&self) -> std::result::Result<MergedOptions, buildcmd_core::ConfigError> {
        let mut variants: BTreeMap<String, OptionSchema> = self.command.platforms.clone();
        for (variant, extra) in self.ctx.registry.platform_options(&self.command.name) {
            let layer = match variants.remove(&variant) {
                Some(declared) => layer_options(&declared, &extra, &variant)?,
                None => extra,
            };
            variants.insert(variant, layer);
        }
        MergedOptions::merge(&self.common, &self.command.options, &variants)
    }

    /// Validates raw arguments and fixes the variant.
    ///
    /// The variant option is validated on its own first. The rest is then
    /// validated against that variant's effective schema, so its overrides
    /// of shared keys apply, and finally the backend's validation hook runs.
    /// Options only another variant declares are rejected.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Validation`]; the lifecycle is then `Failed` and no
    /// backend has been resolved.
    pub fn validate(
        &mut self,
        raw: ArgumentSet,
        interactive: bool,
        reader: &mut dyn LineReader,
    ) -> Result<&ArgumentSet> {
        self.expect_state(LifecycleState::Validating, "validate")?;
        let Some(merged) = self.merged.as_ref() else {
            return Err(self.invalid_state("validate"));
        };

        match self.validate_with(merged, raw, interactive, reader) {
            Ok((args, variant)) => {
                debug!(variant = %variant, "arguments validated");
                self.variant = Some(variant);
                self.state = LifecycleState::Resolving;
                Ok(&*self.args.insert(args))
            }
            Err(err) => {
                self.ctx.logger.error(&err.to_string());
                self.state = LifecycleState::Failed;
                Err(err.into())
            }
        }
    }

    fn validate_with(
        &self,
        merged: &MergedOptions,
        raw: ArgumentSet,
        interactive: bool,
        reader: &mut dyn LineReader,
    ) -> std::result::Result<(ArgumentSet, String), ValidationError> {
        let validator = Validator::new(self.ctx.probe, self.ctx.cwd.clone()).interactive(interactive);

        let key = &self.command.variant_option;
        let selector = merged
            .base()
            .get(key)
            .map(|spec| OptionSchema::new().with_option(spec.clone()))
            .unwrap_or_default();
        let args = validator.validate(raw, &selector, reader)?;
        let variant = args
            .get_str(key)
            .map(str::to_string)
            .ok_or_else(|| ValidationError::MissingRequiredOption { key: key.clone() })?;

        let options = merged.for_variant(&variant);
        let mut args = validator.validate(args, options, reader)?;
        reject_foreign(&args, options, &variant)?;

        if let Some(backend) = self.ctx.registry.get(&variant) {
            backend
                .validate(&mut args, self.ctx.config)
                .map_err(|message| ValidationError::Variant {
                    variant: variant.clone(),
                    message,
                })?;
        }

        Ok((args, variant))
    }

    /// Resolves the backend, delegates to it and waits for completion.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::Resolution`] when no handler exists; the error
    ///   and a remediation hint are logged and the lifecycle is `Failed`.
    /// - [`LifecycleError::Backend`] when the backend fails; passed through
    ///   unreported.
    /// - [`LifecycleError::CompletionDropped`] when the backend returns
    ///   without firing its completion.
    pub fn run(&mut self) -> Result<BuildReport> {
        self.expect_state(LifecycleState::Resolving, "run")?;
        let (Some(args), Some(variant)) = (self.args.clone(), self.variant.clone()) else {
            return Err(self.invalid_state("run"));
        };

        let resolver = BackendResolver::new(self.ctx.registry, self.ctx.probe);
        let handle = match resolver.resolve(&variant, &self.ctx.sdk_root, &self.command.name) {
            Ok(handle) => handle,
            Err(err) => {
                self.ctx.logger.error(&err.to_string());
                self.ctx.logger.log(&err.remediation(args.invocation()));
                self.state = LifecycleState::Failed;
                return Err(err.into());
            }
        };

        self.state = LifecycleState::Delegating;
        let project_dir = args
            .get_str(PROJECT_DIR_OPTION)
            .map(PathBuf::from)
            .unwrap_or_else(|| self.ctx.cwd.clone());
        let ctx = BackendContext {
            logger: self.ctx.logger,
            config: self.ctx.config,
            args: &args,
            command: &self.command.name,
            variant: &variant,
            sdk_root: &self.ctx.sdk_root,
            project_dir: &project_dir,
            handler_path: handle.path(),
        };

        info!(command = %self.command.name, variant = %variant, "delegating to backend");
        let (completion, waiter) = completion_channel();
        handle.run(&ctx, completion)?;
        waiter.wait().map_err(|_| LifecycleError::CompletionDropped)?;

        let elapsed = self.started.elapsed();
        let message = format!("{} in {}", self.command.success_message, pretty_duration(elapsed));
        self.ctx.logger.info(&message);
        self.state = LifecycleState::Completed;

        Ok(BuildReport {
            command: self.command.name.clone(),
            variant,
            started_at: self.started_at,
            elapsed,
            message,
        })
    }

    /// Runs every remaining phase in order.
    pub fn execute(
        &mut self,
        raw: ArgumentSet,
        interactive: bool,
        reader: &mut dyn LineReader,
    ) -> Result<BuildReport> {
        if self.state == LifecycleState::Configuring {
            self.configure()?;
        }
        self.validate(raw, interactive, reader)?;
        self.run()
    }

    fn expect_state(&self, expected: LifecycleState, action: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(self.invalid_state(action))
        }
    }

    fn invalid_state(&self, action: &'static str) -> LifecycleError {
        LifecycleError::InvalidState {
            action,
            state: self.state,
        }
    }
}

/// Fails on a supplied option that `options` does not declare, such as
/// another variant's option.
fn reject_foreign(
    args: &ArgumentSet,
    options: &OptionSchema,
    variant: &str,
) -> std::result::Result<(), ValidationError> {
    match args.iter().find(|(key, _)| !options.contains(key)) {
        Some((key, value)) => Err(ValidationError::InvalidOptionValue {
            key: key.to_string(),
            value: value.to_string().trim().to_string(),
            reason: format!("not an option for {variant}"),
        }),
        None => Ok(()),
    }
}
