//! Per-run scratch workspace with guaranteed cleanup.
//!
//! A [`Workspace`] is created once at the start of a run. The normal path
//! calls [`Workspace::release`] so removal failures are reported; every other
//! exit path (early `?` return, panic) falls back to `Drop`.

use crate::core::{Result, UpdaterError};
use std::fs;
use std::path::{Path, PathBuf};

/// A uniquely named temporary directory owned by a single run.
///
/// # Examples
///
/// ```rust,no_run
/// use tmpl_resources::utils::fs::Workspace;
///
/// # fn example() -> tmpl_resources::core::Result<()> {
/// let workspace = Workspace::acquire("demo")?;
/// std::fs::write(workspace.file("dependencies.txt"), "requests\n").unwrap();
/// let path = workspace.path().to_path_buf();
/// workspace.release()?;
/// assert!(!path.exists());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    released: bool,
}

impl Workspace {
    /// Creates `tmpl-resources_{prefix}_{uuid}` under the system temp directory.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::Io`] if the directory cannot be created.
    pub fn acquire(prefix: &str) -> Result<Self> {
        Self::acquire_in(&std::env::temp_dir(), prefix)
    }

    /// Same as [`acquire`](Self::acquire) but under an explicit parent directory.
    pub fn acquire_in(parent: &Path, prefix: &str) -> Result<Self> {
        let unique_name = format!("tmpl-resources_{}_{}", prefix, uuid::Uuid::new_v4());
        let path = parent.join(unique_name);

        fs::create_dir_all(&path).map_err(|e| UpdaterError::io("create workspace", &path, e))?;
        tracing::debug!(target: "workspace", "Created workspace {}", path.display());

        Ok(Self {
            path,
            released: false,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of an artifact named `name` inside the workspace.
    #[must_use]
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Removes the workspace and everything in it.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::Io`] if removal fails. The handle is consumed
    /// either way and `Drop` will not retry.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        remove_workspace(&self.path)
    }
}

fn remove_workspace(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            tracing::debug!(target: "workspace", "Removed workspace {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(UpdaterError::io("remove workspace", path, e)),
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = remove_workspace(&self.path) {
            tracing::warn!(target: "workspace", "{e}");
        }
    }
}
