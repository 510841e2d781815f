//! Test utilities for unit and integration tests.
//!
//! Available under `cfg(test)` and with the `test-utils` feature:
//!
//! - [`init_test_logging`] - one-time tracing setup that honours `RUST_LOG`
//! - [`FakeRunner`] - scripted [`ProcessRunner`] that records every call

use crate::core::{Result, UpdaterError};
use crate::process::{CommandSpec, ProcessOutput, ProcessRunner};
use std::collections::HashMap;
use std::sync::{Mutex, Once};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, logging stays
/// off.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// A [`ProcessRunner`] that answers from a table instead of spawning processes.
///
/// Responses are keyed by the program's file name, so `/opt/helpers/poet-resources`
/// matches `"poet-resources"`. A program with no response fails the way a missing
/// executable would.
///
/// # Examples
///
/// ```rust,no_run
/// use tmpl_resources::process::ProcessOutput;
/// use tmpl_resources::test_utils::FakeRunner;
///
/// let runner = FakeRunner::new()
///     .respond("poetry", ProcessOutput::success("requests 2.31.0\n"))
///     .respond("poet-resources", ProcessOutput::failure(1, "offline"));
/// assert!(runner.calls().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct FakeRunner {
    responses: HashMap<String, ProcessOutput>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl FakeRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the output returned whenever `program` is run.
    #[must_use]
    pub fn respond(mut self, program: &str, output: ProcessOutput) -> Self {
        self.responses.insert(program.to_string(), output);
        self
    }

    /// Every spec run so far, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn lookup(&self, spec: &CommandSpec) -> Result<ProcessOutput> {
        let name = spec
            .program()
            .file_name()
            .map_or_else(|| spec.program().display().to_string(), |n| n.to_string_lossy().to_string());

        self.responses.get(&name).cloned().ok_or_else(|| UpdaterError::MissingDependency {
            tool: name,
            reason: "no scripted response".to_string(),
        })
    }
}

impl ProcessRunner for FakeRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(spec.clone());
        }
        self.lookup(spec)
    }
}
