//! Filesystem existence checks.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Answers whether paths exist.
///
/// The resolver and the validator only ever ask these two questions, which
/// keeps them testable without touching disk.
pub trait FsProbe: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool {
        self.exists(path)
    }
}

/// Probes the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl FsProbe for RealFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// In-memory probe with a fixed set of files and directories.
///
/// Counts every call so tests can assert that no probing happened.
#[derive(Debug, Default)]
pub struct MemoryProbe {
    files: BTreeSet<PathBuf>,
    dirs: BTreeSet<PathBuf>,
    calls: AtomicUsize,
}

impl MemoryProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.insert(path.into());
        self
    }

    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.dirs.insert(path.into());
        self
    }

    /// Number of `exists`/`is_dir` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FsProbe for MemoryProbe {
    fn exists(&self, path: &Path) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.files.contains(path) || self.dirs.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.dirs.contains(path)
    }
}
