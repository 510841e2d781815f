//! Command-line interface for tmpl-resources.
//!
//! The tool has no subcommands. Every required setting comes from the
//! environment (`PROJECT_NAME`, `WORK_DIR`, `HELPER`) and can also be passed as
//! a flag, which wins over the environment.
//!
//! # Examples
//!
//! ```bash
//! # Typical invocation from a build step
//! PROJECT_NAME=mytool WORK_DIR=$PWD HELPER=$PWD/tools tmpl-resources
//!
//! # Preview the result without touching the template
//! tmpl-resources --dry-run --project-name mytool --work-dir . --helper ./tools
//!
//! # Bound each external command to two minutes
//! tmpl-resources --timeout 120
//! ```
//!
//! # Output
//!
//! Logs go to stderr. On failure a single `error: ...` line names the failing
//! step and the process exits non-zero. `--verbose` adds debug logging and a
//! suggestion line; `--quiet` suppresses everything but the error line.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::config::{
    ConfigInput, HELPER_PROGRAM_VAR, HELPER_VAR, LIST_ARGS_VAR, PACKAGE_MANAGER_VAR, PROJECT_NAME_VAR,
    TEMPLATE_PATH_VAR, UpdaterConfig, WORK_DIR_VAR,
};
use crate::updater::{TemplateIncludeUpdater, UpdateOutcome};

/// Logging configuration derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log filter directive; `RUST_LOG` takes precedence when set
    pub log_level: String,

    /// Suppress the success line on stdout
    pub quiet: bool,
}

impl CliConfig {
    /// Installs the global tracing subscriber, writing to stderr.
    ///
    /// Safe to call more than once; later calls are no-ops.
    pub fn init_logging(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .try_init();
    }
}

/// Regenerate the resource-include block of `<PROJECT_NAME>.tmpl`.
///
/// Lists the project's main dependencies with the package manager, asks the
/// helper program for the matching resource stanzas, and splices them between
/// the `#---START-RESOURCES---` and `#---END-RESOURCES---` lines.
#[derive(Parser, Debug)]
#[command(
    name = "tmpl-resources",
    about = "Regenerate the resource-include block of a package template",
    version,
    long_about = None
)]
pub struct Cli {
    /// Base name of the `.tmpl` file to update.
    #[arg(long, env = PROJECT_NAME_VAR, value_name = "NAME")]
    project_name: Option<String>,

    /// Working directory for the package manager and helper.
    #[arg(long, env = WORK_DIR_VAR, value_name = "DIR")]
    work_dir: Option<String>,

    /// Directory containing the metadata helper program.
    #[arg(long, env = HELPER_VAR, value_name = "DIR")]
    helper: Option<String>,

    /// Template to update instead of `<PROJECT_NAME>.tmpl`.
    #[arg(long, env = TEMPLATE_PATH_VAR, value_name = "PATH")]
    template: Option<PathBuf>,

    /// Package-manager executable.
    #[arg(long, env = PACKAGE_MANAGER_VAR, value_name = "BIN")]
    package_manager: Option<String>,

    /// Whitespace-separated arguments that list the main dependencies.
    #[arg(long, env = LIST_ARGS_VAR, value_name = "ARGS", allow_hyphen_values = true)]
    list_args: Option<String>,

    /// Name of the helper executable inside the helper directory.
    #[arg(long, env = HELPER_PROGRAM_VAR, value_name = "NAME")]
    helper_program: Option<String>,

    /// Kill any external command that runs longer than this many seconds.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print the updated template to stdout instead of writing it.
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging and show suggestions with errors.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Builds the logging configuration from the global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };

        CliConfig {
            log_level: log_level.to_string(),
            quiet: self.quiet,
        }
    }

    #[must_use]
    pub const fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Collects the raw settings for validation.
    #[must_use]
    pub fn config_input(&self) -> ConfigInput {
        ConfigInput {
            project_name: self.project_name.clone(),
            work_dir: self.work_dir.clone(),
            helper: self.helper.clone(),
            template: self.template.clone(),
            package_manager: self.package_manager.clone(),
            list_args: self.list_args.clone(),
            helper_program: self.helper_program.clone(),
            timeout: self.timeout.map(Duration::from_secs),
            dry_run: self.dry_run,
        }
    }

    /// Validates the configuration and runs the updater.
    ///
    /// Logging must already be set up from `cli_config`.
    pub async fn execute_with_config(self, cli_config: CliConfig) -> Result<()> {
        let config = UpdaterConfig::validate(self.config_input())?;
        tracing::debug!("Updating {} for project {}", config.template_path().display(), config.project_name());

        let outcome = TemplateIncludeUpdater::new(config).run().await?;

        match outcome {
            UpdateOutcome::DryRun {
                content,
                ..
            } => {
                use std::io::Write;
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&content).context("Failed to write dry-run output")?;
                stdout.flush().context("Failed to write dry-run output")?;
            }
            UpdateOutcome::Updated {
                template,
                inserted_lines,
                ..
            } if !cli_config.quiet => {
                println!(
                    "{} {} ({} resource line(s))",
                    "✓ Updated".green().bold(),
                    template.display(),
                    inserted_lines
                );
            }
            UpdateOutcome::Unchanged {
                template,
            } if !cli_config.quiet => {
                println!("{} {}", "✓ Up to date".green().bold(), template.display());
            }
            _ => {}
        }

        Ok(())
    }
}
