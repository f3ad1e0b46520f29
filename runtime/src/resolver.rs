//! Backend resolution.
//!
//! Handlers live at a fixed location below the SDK root:
//! `<sdk>/<variant>/cli/commands/_<command>`. Resolution succeeds only when
//! the variant has a registered backend and its handler exists on disk. The
//! result is never cached; each lifecycle resolves once.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::backend::{Backend, BackendContext, BackendRegistry};
use crate::completion::Completion;
use crate::error::{BackendFailure, ResolutionError};
use crate::probe::FsProbe;

/// Directory holding a variant's command handlers.
pub fn commands_dir(sdk_root: &Path, variant: &str) -> PathBuf {
    sdk_root.join(variant).join("cli").join("commands")
}

/// Conventional handler location for `command` on `variant`.
pub fn handler_path(sdk_root: &Path, variant: &str, command: &str) -> PathBuf {
    commands_dir(sdk_root, variant).join(format!("_{command}"))
}

/// A resolved backend, ready to run.
#[derive(Clone)]
pub struct BackendHandle {
    variant: String,
    path: PathBuf,
    backend: Arc<dyn Backend>,
}

impl BackendHandle {
    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// The handler location that was verified.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn run(&self, ctx: &BackendContext<'_>, completion: Completion) -> Result<(), BackendFailure> {
        self.backend.run(ctx, completion)
    }
}

impl fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendHandle")
            .field("variant", &self.variant)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Looks up backends in a registry and checks their handlers exist.
pub struct BackendResolver<'a> {
    registry: &'a BackendRegistry,
    probe: &'a dyn FsProbe,
}

impl<'a> BackendResolver<'a> {
    pub fn new(registry: &'a BackendRegistry, probe: &'a dyn FsProbe) -> Self {
        Self { registry, probe }
    }

    /// Resolves the backend for `variant`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::BackendNotFound`] carrying the probed path
    /// when the variant is unregistered or its handler is missing.
    pub fn resolve(
        &self,
        variant: &str,
        sdk_root: &Path,
        command: &str,
    ) -> Result<BackendHandle, ResolutionError> {
        let path = handler_path(sdk_root, variant, command);
        let exists = self.probe.exists(&path);
        debug!(variant, path = %path.display(), exists, "resolving backend");

        match self.registry.get(variant) {
            Some(backend) if exists => Ok(BackendHandle {
                variant: variant.to_string(),
                path,
                backend,
            }),
            _ => Err(ResolutionError::BackendNotFound {
                variant: variant.to_string(),
                command: command.to_string(),
                path,
            }),
        }
    }
}
