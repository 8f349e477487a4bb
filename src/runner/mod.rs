//! Command execution boundary
//!
//! Every remote side effect in this crate goes through the [`Runner`]
//! trait: environment preparation, checkout synchronization, build
//! invocation and registry writes all emit shell command strings and
//! observe success or failure from the exit status. Abstracting the
//! boundary keeps the orchestration logic testable against the
//! in-process [`RecordingRunner`].

mod local;
mod recording;
mod ssh;

pub use local::LocalRunner;
pub use recording::RecordingRunner;
pub use ssh::{SshOptions, SshRunner};

use std::path::Path;

/// Result of one executed shell command.
///
/// A non-zero exit status is data (`ok == false`), not an error: probes
/// such as `test -d` rely on observing failure. Only a failure to run
/// the command at all surfaces as [`RunnerError`].
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Whether the command exited with status zero
    pub ok: bool,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl CommandOutput {
    /// A successful result with the given stdout
    pub fn success(stdout: &str) -> Self {
        Self {
            ok: true,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    /// A failed result with the given stderr
    pub fn failure(stderr: &str) -> Self {
        Self {
            ok: false,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

/// Executes shell command strings on a local or remote host.
pub trait Runner: Send + Sync {
    /// Execute a command and return its captured result.
    fn run(&self, cmd: &str) -> Result<CommandOutput, RunnerError>;

    /// Execute a command with the given working directory.
    ///
    /// The command string itself stays canonical (`git fetch --quiet
    /// origin`); how the directory takes effect is transport detail.
    fn run_in(&self, dir: &Path, cmd: &str) -> Result<CommandOutput, RunnerError>;
}

/// Errors raised by the execution boundary itself
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("Failed to spawn command: {0}")]
    Spawn(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
