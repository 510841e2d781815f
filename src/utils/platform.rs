//! Platform helpers for locating executables and expanding paths.
//!
//! Executable lookup goes through [`which`], so the same rules the shell uses
//! (`PATH` search, `PATHEXT` on Windows, executable bit on Unix) decide
//! whether a tool is available.

use crate::core::{Result, UpdaterError};
use std::path::{Path, PathBuf};

/// Resolves a bare executable name on `PATH`, or validates an explicit path.
///
/// # Errors
///
/// Returns [`UpdaterError::MissingDependency`] when nothing executable is found.
pub fn find_executable(cmd: impl AsRef<Path>) -> Result<PathBuf> {
    let cmd = cmd.as_ref();
    which::which(cmd).map_err(|e| UpdaterError::MissingDependency {
        tool: cmd.display().to_string(),
        reason: e.to_string(),
    })
}

/// Expands `~` and `$VAR` / `${VAR}` references in a user-supplied path.
///
/// Unknown variables are left as an error rather than silently dropped so a
/// typo in `HELPER` surfaces during validation.
///
/// # Errors
///
/// Returns [`UpdaterError::MissingConfig`] naming the variable that could not
/// be expanded.
///
/// # Examples
///
/// ```rust,no_run
/// use tmpl_resources::utils::platform::resolve_path;
///
/// # fn example() -> tmpl_resources::core::Result<()> {
/// let helper = resolve_path("~/.local/share/helpers")?;
/// println!("{}", helper.display());
/// # Ok(())
/// # }
/// ```
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path).map_err(|e| UpdaterError::MissingConfig {
        variable: e.var_name,
    })?;
    Ok(PathBuf::from(expanded.as_ref()))
}
