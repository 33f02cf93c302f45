//! Temporary `.sift.toml` trees for sift-config unit tests.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

use crate::discovery::CONFIG_FILENAME;

/// A temporary directory holding nested `.sift.toml` files.
pub struct ConfigTree {
    /// Owned temporary directory, removed on drop.
    root: TempDir,
}

impl ConfigTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    /// Root of the tree.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Creates a directory, returning its path. `""` is the root.
    pub fn dir(&self, rel_path: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Writes a `.sift.toml` with the given contents under `rel_path`.
    pub fn write(&self, rel_path: &str, content: &str) -> PathBuf {
        let config = self.dir(rel_path).join(CONFIG_FILENAME);
        fs::write(&config, content).unwrap();
        config
    }

    /// Writes a `.sift.toml` that only sets `ranking.limit`.
    pub fn write_limit(&self, rel_path: &str, limit: usize) -> PathBuf {
        self.write(rel_path, &format!("[ranking]\nlimit = {limit}\n"))
    }
}
