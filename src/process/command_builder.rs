//! Fluent builder for external process invocations.
//!
//! [`CommandSpec`] only describes a command. Executing it is the job of a
//! [`ProcessRunner`](super::ProcessRunner), which keeps the pipeline testable
//! with fakes.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Description of one external process invocation.
///
/// # Examples
///
/// ```rust,no_run
/// use tmpl_resources::process::{CommandSpec, ProcessRunner, SystemRunner};
/// use std::time::Duration;
///
/// # async fn example() -> tmpl_resources::core::Result<()> {
/// let spec = CommandSpec::new("poetry")
///     .args(["show", "--only", "main"])
///     .current_dir("/path/to/project")
///     .with_timeout(Some(Duration::from_secs(60)))
///     .with_context("extract dependency list");
///
/// let output = SystemRunner::new().run(&spec).await?;
/// println!("exit code: {:?}", output.exit_code);
/// # Ok(())
/// # }
/// ```
///
/// # Default Configuration
///
/// - **Timeout**: none; the process runs until it exits
/// - **Stdin**: closed (`/dev/null`)
/// - **Working directory**: current process directory
/// - **Environment**: inherited from the parent process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name (searched on `PATH`) or path
    program: PathBuf,

    /// Arguments in order
    args: Vec<String>,

    /// Working directory for the process (defaults to current directory)
    current_dir: Option<PathBuf>,

    /// Bytes written to the process's stdin, which is then closed
    stdin: Option<Vec<u8>>,

    /// Maximum duration to wait for the process (None = no timeout)
    timeout_duration: Option<Duration>,

    /// Pipeline step name used in logs and error messages
    context: Option<String>,
}

impl CommandSpec {
    /// Creates a spec for `program` with no arguments.
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            current_dir: None,
            stdin: None,
            timeout_duration: None,
            context: None,
        }
    }

    /// Sets the working directory for the process.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Feeds `input` to the process on stdin.
    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Set a timeout for the process (None for no timeout)
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Set the pipeline step this process belongs to (e.g. "extract dependency list")
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn get_current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    #[must_use]
    pub fn get_stdin(&self) -> Option<&[u8]> {
        self.stdin.as_deref()
    }

    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout_duration
    }

    /// Step name, falling back to the program name.
    #[must_use]
    pub fn step(&self) -> String {
        self.context.clone().unwrap_or_else(|| self.program.display().to_string())
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
