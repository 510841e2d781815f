//! Run configuration.
//!
//! The updater never reads the process environment itself. Raw settings are
//! gathered into a [`ConfigInput`] by clap and validated exactly once into an
//! [`UpdaterConfig`], which is then passed to the updater at construction.
//!
//! A value made only of whitespace counts as empty, for required and
//! optional variables alike.
//!
//! The helper directory, and a package manager given as a path rather than a
//! bare name, are made absolute against the current directory during
//! validation. The external commands run inside `WORK_DIR`, so a relative
//! program path would otherwise resolve against the wrong directory.
//!
//! # Environment Variables
//!
//! | Variable | Required | Meaning |
//! |---|---|---|
//! | `PROJECT_NAME` | yes | base name of the `.tmpl` file to update |
//! | `WORK_DIR` | yes | working directory for the external commands |
//! | `HELPER` | yes | directory containing the metadata helper program |
//! | `TEMPLATE_PATH` | no | explicit template path |
//! | `PACKAGE_MANAGER` | no | package-manager executable (default `poetry`) |
//! | `PACKAGE_MANAGER_LIST_ARGS` | no | listing arguments (default `show --only main`) |
//! | `HELPER_PROGRAM` | no | helper executable name (default `poet-resources`) |

use crate::core::{Result, UpdaterError};
use crate::utils::platform::resolve_path;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const PROJECT_NAME_VAR: &str = "PROJECT_NAME";
pub const WORK_DIR_VAR: &str = "WORK_DIR";
pub const HELPER_VAR: &str = "HELPER";
pub const TEMPLATE_PATH_VAR: &str = "TEMPLATE_PATH";
pub const PACKAGE_MANAGER_VAR: &str = "PACKAGE_MANAGER";
pub const LIST_ARGS_VAR: &str = "PACKAGE_MANAGER_LIST_ARGS";
pub const HELPER_PROGRAM_VAR: &str = "HELPER_PROGRAM";

pub const DEFAULT_PACKAGE_MANAGER: &str = "poetry";
pub const DEFAULT_LIST_ARGS: &str = "show --only main";
pub const DEFAULT_HELPER_PROGRAM: &str = "poet-resources";

/// Template file extension appended to the project name.
pub const TEMPLATE_EXTENSION: &str = "tmpl";

/// Unvalidated settings as collected from flags or the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigInput {
    pub project_name: Option<String>,
    pub work_dir: Option<String>,
    pub helper: Option<String>,
    pub template: Option<PathBuf>,
    pub package_manager: Option<String>,
    pub list_args: Option<String>,
    pub helper_program: Option<String>,
    pub timeout: Option<Duration>,
    pub dry_run: bool,
}

fn required(value: Option<String>, variable: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(UpdaterError::MissingConfig {
            variable: variable.to_string(),
        }),
    }
}

fn optional(value: Option<String>, default: &str) -> String {
    value.filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| UpdaterError::io("resolve", path, e))
}

/// Bare names are left for the `PATH` search; anything with a directory part
/// is anchored to the current directory.
fn program_path(program: String) -> Result<PathBuf> {
    let path = PathBuf::from(program);
    if path.components().count() > 1 { absolute(&path) } else { Ok(path) }
}

/// Validated configuration for one update run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdaterConfig {
    project_name: String,
    work_dir: PathBuf,
    helper_dir: PathBuf,
    helper_program: String,
    package_manager: PathBuf,
    list_args: Vec<String>,
    template_path: PathBuf,
    timeout: Option<Duration>,
    dry_run: bool,
}

impl UpdaterConfig {
    /// Validates `input`.
    ///
    /// Required variables are checked in the order `PROJECT_NAME`, `WORK_DIR`,
    /// `HELPER`; the first one missing is reported.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::MissingConfig`] for an unset or empty required
    /// variable, or for a `HELPER` path referencing an unset variable, and
    /// [`UpdaterError::Io`] when the current directory cannot be determined.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tmpl_resources::config::{ConfigInput, UpdaterConfig};
    ///
    /// let config = UpdaterConfig::validate(ConfigInput {
    ///     project_name: Some("mytool".to_string()),
    ///     work_dir: Some("/src/mytool".to_string()),
    ///     helper: Some("/opt/helpers".to_string()),
    ///     ..ConfigInput::default()
    /// })
    /// .unwrap();
    /// assert_eq!(config.template_path().to_str(), Some("mytool.tmpl"));
    /// ```
    pub fn validate(input: ConfigInput) -> Result<Self> {
        let project_name = required(input.project_name, PROJECT_NAME_VAR)?;
        let work_dir = required(input.work_dir, WORK_DIR_VAR)?;
        let helper = required(input.helper, HELPER_VAR)?;

        let helper_dir = absolute(&resolve_path(&helper)?)?;
        let package_manager = program_path(optional(input.package_manager, DEFAULT_PACKAGE_MANAGER))?;
        let list_args =
            optional(input.list_args, DEFAULT_LIST_ARGS).split_whitespace().map(String::from).collect();
        let template_path = input
            .template
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(format!("{project_name}.{TEMPLATE_EXTENSION}")));

        Ok(Self {
            work_dir: PathBuf::from(work_dir),
            helper_dir,
            helper_program: optional(input.helper_program, DEFAULT_HELPER_PROGRAM),
            package_manager,
            list_args,
            template_path,
            timeout: input.timeout,
            dry_run: input.dry_run,
            project_name,
        })
    }

    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    #[must_use]
    pub fn helper_dir(&self) -> &Path {
        &self.helper_dir
    }

    /// Full path of the helper program inside the helper directory.
    #[must_use]
    pub fn helper_path(&self) -> PathBuf {
        self.helper_dir.join(&self.helper_program)
    }

    /// Bare executable name, or an absolute path.
    #[must_use]
    pub fn package_manager(&self) -> &Path {
        &self.package_manager
    }

    #[must_use]
    pub fn list_args(&self) -> &[String] {
        &self.list_args
    }

    #[must_use]
    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }
}
