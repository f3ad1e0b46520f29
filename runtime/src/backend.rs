//! Platform backends and the registry that holds them.
//!
//! A backend does the actual work for one variant (platform). The core never
//! knows how a platform builds; it only relies on the three hooks of
//! [`Backend`]. Backends are registered by variant at process start and
//! looked up when the lifecycle resolves.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use buildcmd_core::{ArgumentSet, OptionSchema};

use crate::completion::Completion;
use crate::config::BuildConfig;
use crate::error::BackendFailure;
use crate::executable::ExecutableBackend;
use crate::logger::Logger;

/// Everything a backend sees when it runs.
pub struct BackendContext<'a> {
    pub logger: &'a dyn Logger,
    pub config: &'a BuildConfig,
    /// Normalized arguments for this invocation.
    pub args: &'a ArgumentSet,
    pub command: &'a str,
    pub variant: &'a str,
    pub sdk_root: &'a Path,
    pub project_dir: &'a Path,
    /// Handler location the resolver verified.
    pub handler_path: &'a Path,
}

/// The contract a platform handler satisfies.
pub trait Backend: Send + Sync {
    /// Extra options this variant adds to `command`.
    fn configure(&self, _command: &str) -> OptionSchema {
        OptionSchema::new()
    }

    /// Variant-specific checks run after core validation.
    ///
    /// May normalize `args` further. An error message rejects the
    /// invocation.
    fn validate(&self, _args: &mut ArgumentSet, _config: &BuildConfig) -> Result<(), String> {
        Ok(())
    }

    /// Performs the work.
    ///
    /// Must fire `completion` exactly once, and only after every side effect
    /// is durably done. Returning an error without firing it is the failure
    /// path.
    fn run(&self, ctx: &BackendContext<'_>, completion: Completion) -> Result<(), BackendFailure>;
}

/// Variant name to backend mapping.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    backends: BTreeMap<String, Arc<dyn Backend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one [`ExecutableBackend`] per platform under `sdk_root`.
    pub fn with_executables<I, S>(platforms: I, sdk_root: &Path) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for platform in platforms {
            let platform = platform.as_ref();
            registry.register(platform, ExecutableBackend::new(platform, sdk_root));
        }
        registry
    }

    /// Registers `backend` for `variant`, replacing any previous one.
    pub fn register(&mut self, variant: impl Into<String>, backend: impl Backend + 'static) {
        self.backends.insert(variant.into(), Arc::new(backend));
    }

    pub fn with(mut self, variant: impl Into<String>, backend: impl Backend + 'static) -> Self {
        self.register(variant, backend);
        self
    }

    pub fn get(&self, variant: &str) -> Option<Arc<dyn Backend>> {
        self.backends.get(variant).cloned()
    }

    pub fn contains(&self, variant: &str) -> bool {
        self.backends.contains_key(variant)
    }

    /// Registered variants, sorted.
    pub fn variants(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }

    /// Options each backend adds to `command`; variants adding none are
    /// left out.
    pub fn platform_options(&self, command: &str) -> BTreeMap<String, OptionSchema> {
        self.backends
            .iter()
            .map(|(variant, backend)| (variant.clone(), backend.configure(command)))
            .filter(|(_, schema)| !schema.is_empty())
            .collect()
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("variants", &self.backends.keys().collect::<Vec<_>>())
            .finish()
    }
}
