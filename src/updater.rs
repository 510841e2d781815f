//! The template resource-include updater.
//!
//! A run is a strictly sequential, fail-fast pipeline:
//!
//! 1. [`validate_environment`](TemplateIncludeUpdater::validate_environment)
//! 2. [`acquire_workspace`](TemplateIncludeUpdater::acquire_workspace)
//! 3. [`extract_dependency_list`](TemplateIncludeUpdater::extract_dependency_list)
//! 4. [`resolve_resource_includes`](TemplateIncludeUpdater::resolve_resource_includes)
//! 5. [`splice_template_region`](TemplateIncludeUpdater::splice_template_region)
//! 6. [`commit_template`](TemplateIncludeUpdater::commit_template)
//! 7. [`release_workspace`](TemplateIncludeUpdater::release_workspace)
//!
//! Each step starts only after the previous one succeeded. Any failure skips
//! straight to step 7, so the template is only ever written by step 6 and the
//! workspace never outlives the run.

use crate::config::{UpdaterConfig, WORK_DIR_VAR};
use crate::core::{Result, UpdaterError};
use crate::process::{CommandSpec, ProcessRunner, SystemRunner};
use crate::template::{self, Spliced};
use crate::utils::fs::{Workspace, atomic_replace, checksum};
use crate::utils::platform::find_executable;
use std::fs;
use std::path::{Path, PathBuf};

/// Workspace artifact holding the package manager's output.
pub const DEPENDENCY_LIST_FILE: &str = "dependencies.txt";

/// Workspace artifact holding the helper's output.
pub const RESOURCE_INCLUDES_FILE: &str = "resources.txt";

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The template was replaced with new content.
    Updated {
        template: PathBuf,
        removed_lines: usize,
        inserted_lines: usize,
    },
    /// The regenerated content matched the template; nothing was written.
    Unchanged {
        template: PathBuf,
    },
    /// Dry run: the spliced template, not committed.
    DryRun {
        template: PathBuf,
        content: Vec<u8>,
    },
}

/// Regenerates the resource region of `<PROJECT_NAME>.tmpl`.
///
/// # Examples
///
/// ```rust,no_run
/// use tmpl_resources::config::{ConfigInput, UpdaterConfig};
/// use tmpl_resources::updater::TemplateIncludeUpdater;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = UpdaterConfig::validate(ConfigInput {
///     project_name: Some("mytool".to_string()),
///     work_dir: Some(".".to_string()),
///     helper: Some("tools".to_string()),
///     ..ConfigInput::default()
/// })?;
/// let outcome = TemplateIncludeUpdater::new(config).run().await?;
/// println!("{outcome:?}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TemplateIncludeUpdater<R = SystemRunner> {
    config: UpdaterConfig,
    runner: R,
}

impl TemplateIncludeUpdater<SystemRunner> {
    /// Creates an updater that runs real external processes.
    #[must_use]
    pub const fn new(config: UpdaterConfig) -> Self {
        Self::with_runner(config, SystemRunner::new())
    }
}

impl<R: ProcessRunner> TemplateIncludeUpdater<R> {
    /// Creates an updater that runs external processes through `runner`.
    pub const fn with_runner(config: UpdaterConfig, runner: R) -> Self {
        Self {
            config,
            runner,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs the whole pipeline.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error. The template is untouched and
    /// the workspace has been removed.
    pub async fn run(&self) -> Result<UpdateOutcome> {
        self.validate_environment()?;

        let workspace = self.acquire_workspace()?;
        let outcome = self.run_in(&workspace).await;

        if let Err(e) = self.release_workspace(workspace) {
            tracing::warn!(target: "updater", "{e}");
        }

        match &outcome {
            Ok(UpdateOutcome::Updated {
                template,
                ..
            }) => tracing::info!(target: "updater", "Updated {}", template.display()),
            Ok(UpdateOutcome::Unchanged {
                template,
            }) => tracing::info!(target: "updater", "{} is already up to date", template.display()),
            Ok(UpdateOutcome::DryRun {
                ..
            }) => tracing::info!(target: "updater", "Dry run: template not written"),
            Err(e) => tracing::debug!(target: "updater", "Run aborted: {e}"),
        }

        outcome
    }

    async fn run_in(&self, workspace: &Workspace) -> Result<UpdateOutcome> {
        let template_path = self.config.template_path().to_path_buf();

        let dependency_list = self.extract_dependency_list(workspace).await?;
        let includes = self.resolve_resource_includes(workspace, &dependency_list).await?;
        let (new_file, spliced) = self.splice_template_region(workspace, &includes)?;

        if self.config.dry_run() {
            return Ok(UpdateOutcome::DryRun {
                template: template_path,
                content: spliced.content,
            });
        }

        let original = fs::read(&template_path)
            .map_err(|e| UpdaterError::io("read template", &template_path, e))?;
        let before = checksum(&original);
        let after = checksum(&spliced.content);
        tracing::debug!(target: "updater", "Template digest {} -> {}", before, after);

        if before == after {
            return Ok(UpdateOutcome::Unchanged {
                template: template_path,
            });
        }

        self.commit_template(&new_file)?;

        Ok(UpdateOutcome::Updated {
            template: template_path,
            removed_lines: spliced.removed_lines,
            inserted_lines: spliced.inserted_lines,
        })
    }

    /// Checks that `WORK_DIR` is a directory, that the package manager
    /// resolves, and that the helper program exists and is executable.
    /// Read-only.
    ///
    /// Configuration variables were already validated when the
    /// [`UpdaterConfig`] was built.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::InvalidConfig`] for a missing working directory
    /// and [`UpdaterError::MissingDependency`] naming a missing tool.
    pub fn validate_environment(&self) -> Result<()> {
        let work_dir = self.config.work_dir();
        if !work_dir.is_dir() {
            return Err(UpdaterError::InvalidConfig {
                variable: WORK_DIR_VAR.to_string(),
                reason: format!("{} is not a directory", work_dir.display()),
            });
        }

        let package_manager = find_executable(self.config.package_manager())?;
        tracing::debug!(target: "updater", "Using package manager {}", package_manager.display());

        let helper = find_executable(self.config.helper_path())?;
        tracing::debug!(target: "updater", "Using helper {}", helper.display());

        Ok(())
    }

    /// Creates this run's workspace.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::Io`] when the directory cannot be created.
    pub fn acquire_workspace(&self) -> Result<Workspace> {
        let prefix: String = self
            .config
            .project_name()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        Workspace::acquire(&prefix)
    }

    /// Runs the package-manager listing command and stores its stdout verbatim
    /// as [`DEPENDENCY_LIST_FILE`] in the workspace.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::UpstreamCommand`] when the command fails.
    pub async fn extract_dependency_list(&self, workspace: &Workspace) -> Result<PathBuf> {
        let spec = CommandSpec::new(self.config.package_manager())
            .args(self.config.list_args().iter().cloned())
            .current_dir(self.config.work_dir())
            .with_timeout(self.config.timeout())
            .with_context("extract dependency list");

        let output = self.runner.run(&spec).await?.check(&spec)?;
        let count = String::from_utf8_lossy(&output.stdout).lines().filter(|l| !l.trim().is_empty()).count();
        tracing::info!(target: "updater", "Found {} main dependencies", count);

        let path = workspace.file(DEPENDENCY_LIST_FILE);
        fs::write(&path, &output.stdout).map_err(|e| UpdaterError::io("write dependency list", &path, e))?;
        Ok(path)
    }

    /// Runs the helper with `dependency_list` as its sole argument and stores
    /// its stdout as [`RESOURCE_INCLUDES_FILE`] in the workspace.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::UpstreamCommand`] when the helper fails.
    pub async fn resolve_resource_includes(&self, workspace: &Workspace, dependency_list: &Path) -> Result<PathBuf> {
        let spec = CommandSpec::new(self.config.helper_path())
            .arg(dependency_list.display().to_string())
            .current_dir(self.config.work_dir())
            .with_timeout(self.config.timeout())
            .with_context("resolve resource includes");

        let output = self.runner.run(&spec).await?.check(&spec)?;

        let path = workspace.file(RESOURCE_INCLUDES_FILE);
        fs::write(&path, &output.stdout).map_err(|e| UpdaterError::io("write resource includes", &path, e))?;
        Ok(path)
    }

    /// Splices `include_file` into the template's resource region, writing the
    /// result to `<PROJECT_NAME>.tmpl.new` in the workspace.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::TemplateFormat`] or [`UpdaterError::Transform`].
    pub fn splice_template_region(&self, workspace: &Workspace, include_file: &Path) -> Result<(PathBuf, Spliced)> {
        let output = workspace.file(&format!("{}.tmpl.new", self.config.project_name().replace('/', "_")));
        let spliced = template::splice_file(self.config.template_path(), include_file, &output)?;
        Ok((output, spliced))
    }

    /// Atomically replaces the template with `new_file`'s content.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::Io`]; the original template is untouched.
    pub fn commit_template(&self, new_file: &Path) -> Result<()> {
        let content = fs::read(new_file).map_err(|e| UpdaterError::io("read spliced template", new_file, e))?;
        atomic_replace(self.config.template_path(), &content)
    }

    /// Removes the workspace and its contents.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::Io`] when removal fails.
    pub fn release_workspace(&self, workspace: Workspace) -> Result<()> {
        workspace.release()
    }
}
