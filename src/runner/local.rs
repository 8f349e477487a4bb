//! Local command execution via `sh -c`

use std::path::Path;
use std::process::Command;

use super::{CommandOutput, Runner, RunnerError};

/// Runs commands on the local host through the system shell.
pub struct LocalRunner;

impl LocalRunner {
    /// Create a new local runner
    pub fn new() -> Self {
        Self
    }

    fn spawn(&self, cmd: &str, dir: Option<&Path>) -> Result<CommandOutput, RunnerError> {
        let mut command = Command::new("sh");
        command.arg("-c").arg(cmd);
        if let Some(dir) = dir {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .map_err(|e| RunnerError::Spawn(format!("sh -c '{}': {}", cmd, e)))?;

        Ok(CommandOutput {
            ok: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

impl Default for LocalRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner for LocalRunner {
    fn run(&self, cmd: &str) -> Result<CommandOutput, RunnerError> {
        self.spawn(cmd, None)
    }

    fn run_in(&self, dir: &Path, cmd: &str) -> Result<CommandOutput, RunnerError> {
        self.spawn(cmd, Some(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_captures_stdout() {
        let runner = LocalRunner::new();
        let output = runner.run("echo hello").unwrap();
        assert!(output.ok);
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn test_failed_command_is_data_not_error() {
        let runner = LocalRunner::new();
        let output = runner.run("test -d /nonexistent/gachette/path").unwrap();
        assert!(!output.ok);
    }

    #[test]
    fn test_run_in_uses_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let runner = LocalRunner::new();
        let output = runner.run_in(dir.path(), "pwd").unwrap();
        assert!(output.ok);
        assert!(output.stdout.trim().ends_with(
            dir.path().file_name().unwrap().to_str().unwrap()
        ));
    }
}
