//! tmpl-resources - regenerate the resource-include block of a package template
//!
//! Build processes that publish a package through a template (for example a
//! Homebrew formula kept as `mytool.tmpl`) need the template's list of bundled
//! dependencies refreshed whenever the project's dependencies change. This
//! crate does that in one fail-fast pass:
//!
//! 1. ask the package manager for the main dependencies
//! 2. feed that list to a helper program that prints the resource stanzas
//! 3. splice the stanzas between `#---START-RESOURCES---` and
//!    `#---END-RESOURCES---` in the template
//! 4. atomically replace the template
//!
//! Intermediate files live in a per-run workspace that is always removed, and
//! the template is never written unless every step succeeded.
//!
//! # Modules
//!
//! - [`cli`] - Command-line parsing and logging setup
//! - [`config`] - Validated run configuration
//! - [`core`] - Error taxonomy and user-facing diagnostics
//! - [`process`] - External process execution behind [`process::ProcessRunner`]
//! - [`template`] - Resource-region splicing
//! - [`updater`] - The pipeline itself
//! - [`utils`] - Workspace, atomic writes, executable lookup
//!
//! # Example
//!
//! ```rust,no_run
//! use tmpl_resources::config::{ConfigInput, UpdaterConfig};
//! use tmpl_resources::updater::TemplateIncludeUpdater;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = UpdaterConfig::validate(ConfigInput {
//!     project_name: Some("mytool".to_string()),
//!     work_dir: Some(".".to_string()),
//!     helper: Some("./tools".to_string()),
//!     ..ConfigInput::default()
//! })?;
//! TemplateIncludeUpdater::new(config).run().await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod process;
pub mod template;
pub mod updater;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
