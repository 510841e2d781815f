//! Error handling for tmpl-resources
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`UpdaterError`]) for every failure a run can hit
//! 2. **User-friendly messages** ([`ErrorContext`]) with a suggestion for CLI users
//!
//! Library operations return [`Result<T>`](Result). The CLI layer works with
//! [`anyhow::Error`] and converts back with [`user_friendly_error`] right before
//! printing the diagnostic and choosing the exit code.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tmpl_resources::core::{UpdaterError, user_friendly_error};
//!
//! let err = UpdaterError::MissingConfig {
//!     variable: "PROJECT_NAME".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(err));
//! ctx.display(false);
//! assert_eq!(ctx.exit_code(), 1);
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit code used when a required executable cannot be resolved, matching the
/// shell's "command not found" status.
pub const EXIT_MISSING_DEPENDENCY: i32 = 127;

/// Exit code for every failure that does not carry its own status.
pub const EXIT_FAILURE: i32 = 1;

/// The main error type for a template update run.
///
/// Each variant names the step that failed so the single-line diagnostic is
/// enough to locate the problem.
///
/// # Error Categories
///
/// - [`MissingDependency`](Self::MissingDependency) - a required executable is absent
/// - [`MissingConfig`](Self::MissingConfig) - a required variable is unset or empty
/// - [`InvalidConfig`](Self::InvalidConfig) - a variable is set but unusable
/// - [`UpstreamCommand`](Self::UpstreamCommand) - an external process exited non-zero
/// - [`TemplateFormat`](Self::TemplateFormat) - the sentinel markers were not found
/// - [`Transform`](Self::Transform) - the splice itself could not be produced
/// - [`Io`](Self::Io) - workspace or commit filesystem failures
/// - [`Other`](Self::Other) - anything the CLI layer could not classify
#[derive(Error, Debug)]
pub enum UpdaterError {
    /// A required external executable could not be resolved.
    #[error("Required tool '{tool}' not found: {reason}")]
    MissingDependency {
        /// Executable name or path that was looked up
        tool: String,
        /// Why the lookup failed
        reason: String,
    },

    /// A required configuration variable is unset or empty.
    #[error("Required environment variable '{variable}' is not set or empty")]
    MissingConfig {
        /// Name of the environment variable
        variable: String,
    },

    /// A configuration variable is set but does not name anything usable.
    #[error("Environment variable '{variable}' is invalid: {reason}")]
    InvalidConfig {
        /// Name of the environment variable
        variable: String,
        /// What is wrong with its value
        reason: String,
    },

    /// An external process exited unsuccessfully (or could not be started).
    #[error("Step '{step}' failed: {command} {status}{}", format_stderr(.stderr))]
    UpstreamCommand {
        /// Pipeline step that ran the process
        step: String,
        /// Rendered command line
        command: String,
        /// Exit code, `None` when killed by a signal or timed out
        exit_code: Option<i32>,
        /// Human-readable status ("exited with status 3", "timed out after 5s")
        status: String,
        /// Captured standard error, trimmed
        stderr: String,
    },

    /// The template does not contain the expected sentinel markers.
    #[error("Template {} is malformed: {reason}", path.display())]
    TemplateFormat {
        /// Template that was inspected
        path: PathBuf,
        /// Which marker was missing
        reason: String,
    },

    /// The splice transformation failed to produce its output.
    #[error("Failed to splice resources into {}: {reason}", path.display())]
    Transform {
        /// Template being transformed
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// Filesystem failure while managing the workspace or committing.
    #[error("Failed to {operation} {}: {source}", path.display())]
    Io {
        /// What was being attempted ("create workspace", "replace template", ...)
        operation: String,
        /// Path involved in the failure
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Any failure outside the taxonomy above.
    #[error("{message}")]
    Other {
        /// Full error chain, rendered on one line
        message: String,
    },
}

fn format_stderr(stderr: &str) -> String {
    match stderr.lines().find(|line| !line.trim().is_empty()) {
        Some(first) => format!(" ({})", first.trim()),
        None => String::new(),
    }
}

impl UpdaterError {
    /// Builds an [`UpdaterError::Io`] for `operation` on `path`.
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this failure.
    ///
    /// Upstream failures propagate the child's exit code; a missing tool exits
    /// with 127; everything else exits with 1.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingDependency {
                ..
            } => EXIT_MISSING_DEPENDENCY,
            Self::UpstreamCommand {
                exit_code: Some(code),
                ..
            } if *code != 0 => *code,
            _ => EXIT_FAILURE,
        }
    }
}

/// Result alias for library operations.
pub type Result<T> = std::result::Result<T, UpdaterError>;

/// An [`UpdaterError`] paired with an actionable suggestion.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: UpdaterError,
    /// Optional suggestion shown with `--verbose`
    pub suggestion: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: UpdaterError) -> Self {
        Self {
            error,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }

    /// Prints the diagnostic to stderr.
    ///
    /// A failure is always reported on a single line; `verbose` adds the
    /// suggestion underneath.
    pub fn display(&self, verbose: bool) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if verbose {
            if let Some(suggestion) = &self.suggestion {
                eprintln!("{}: {}", "suggestion".green(), suggestion);
            }
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Converts any error into an [`ErrorContext`].
///
/// Walks the `anyhow` chain looking for an [`UpdaterError`]; anything else is
/// wrapped as [`UpdaterError::Other`] with the full context chain as its
/// message.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let message = format!("{error:#}");

    match error.downcast::<UpdaterError>() {
        Ok(updater_error) => create_error_context(updater_error),
        Err(other) => match other.downcast::<ErrorContext>() {
            Ok(ctx) => ctx,
            Err(_) => ErrorContext::new(UpdaterError::Other {
                message,
            })
            .with_suggestion("Re-run with --verbose for more details"),
        },
    }
}

/// Attaches the suggestion that fits each failure mode.
#[must_use]
pub fn create_error_context(error: UpdaterError) -> ErrorContext {
    let suggestion = match &error {
        UpdaterError::MissingDependency {
            tool,
            ..
        } => format!("Install '{tool}' or make sure it is on your PATH"),
        UpdaterError::MissingConfig {
            variable,
        } => format!("Export {variable} before running, e.g. {variable}=... tmpl-resources"),
        UpdaterError::InvalidConfig {
            variable,
            ..
        } => format!("Point {variable} at an existing directory"),
        UpdaterError::UpstreamCommand {
            step,
            ..
        } => format!("Run the '{step}' command manually to inspect its output"),
        UpdaterError::TemplateFormat {
            ..
        } => "Add '#---START-RESOURCES---' and '#---END-RESOURCES---' lines around the resource block"
            .to_string(),
        UpdaterError::Transform {
            ..
        } => "Check that the template and the helper output are readable".to_string(),
        UpdaterError::Io {
            ..
        } => "Check file permissions and available disk space".to_string(),
        UpdaterError::Other {
            ..
        } => "Re-run with --verbose for more details".to_string(),
    };

    ErrorContext::new(error).with_suggestion(suggestion)
}
