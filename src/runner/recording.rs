//! In-process recording runner for tests
//!
//! Records every command string in order and answers from a list of
//! canned responses matched by substring. Commands with no matching
//! response succeed with empty output.

use std::path::Path;
use std::sync::Mutex;

use super::{CommandOutput, Runner, RunnerError};

struct CannedResponse {
    needle: String,
    output: CommandOutput,
}

/// Test double for the execution boundary.
pub struct RecordingRunner {
    commands: Mutex<Vec<String>>,
    responses: Mutex<Vec<CannedResponse>>,
}

impl RecordingRunner {
    /// Create a runner where every command succeeds with empty output
    pub fn new() -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            responses: Mutex::new(Vec::new()),
        }
    }

    /// Answer commands containing `needle` with the given output.
    ///
    /// Responses are matched in registration order; the first match wins.
    pub fn respond(&self, needle: &str, output: CommandOutput) {
        self.responses.lock().unwrap().push(CannedResponse {
            needle: needle.to_string(),
            output,
        });
    }

    /// Make commands containing `needle` fail
    pub fn fail_matching(&self, needle: &str) {
        self.respond(needle, CommandOutput::failure(""));
    }

    /// Make commands containing `needle` succeed with the given stdout
    pub fn succeed_matching(&self, needle: &str, stdout: &str) {
        self.respond(needle, CommandOutput::success(stdout));
    }

    /// The ordered log of every command executed so far
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

impl Default for RecordingRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner for RecordingRunner {
    fn run(&self, cmd: &str) -> Result<CommandOutput, RunnerError> {
        self.commands.lock().unwrap().push(cmd.to_string());

        let responses = self.responses.lock().unwrap();
        let output = responses
            .iter()
            .find(|r| cmd.contains(&r.needle))
            .map(|r| r.output.clone())
            .unwrap_or_else(|| CommandOutput::success(""));

        Ok(output)
    }

    fn run_in(&self, _dir: &Path, cmd: &str) -> Result<CommandOutput, RunnerError> {
        // The working directory is transport detail; the log keeps the
        // canonical command string.
        self.run(cmd)
    }
}
