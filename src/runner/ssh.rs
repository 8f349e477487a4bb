//! Remote command execution over SSH
//!
//! Runs the command string on a remote host with non-interactive
//! (BatchMode) SSH. The remote shell's exit status becomes the command
//! result; only a failure to spawn `ssh` itself is a [`RunnerError`].

use std::path::Path;
use std::process::Command;

use serde::{Deserialize, Serialize};

use super::{CommandOutput, Runner, RunnerError};

/// SSH connection options for a build or registry host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshOptions {
    /// Remote host
    pub host: String,
    /// SSH user (default "gachette")
    #[serde(default = "default_user")]
    pub user: String,
    /// SSH port (default 22)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path to SSH private key
    #[serde(default, alias = "identity_file")]
    pub key_path: Option<String>,
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
    /// Server alive interval for detecting dead connections
    #[serde(default = "default_alive_interval")]
    pub server_alive_interval: u32,
    /// Server alive count max
    #[serde(default = "default_alive_count")]
    pub server_alive_count_max: u32,
}

fn default_user() -> String {
    "gachette".to_string()
}

fn default_port() -> u16 {
    22
}

fn default_connect_timeout() -> u32 {
    30
}

fn default_alive_interval() -> u32 {
    15
}

fn default_alive_count() -> u32 {
    2
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            host: String::new(),
            user: default_user(),
            port: default_port(),
            key_path: None,
            connect_timeout_seconds: default_connect_timeout(),
            server_alive_interval: default_alive_interval(),
            server_alive_count_max: default_alive_count(),
        }
    }
}

/// Runs commands on a remote host over SSH.
pub struct SshRunner {
    options: SshOptions,
}

impl SshRunner {
    /// Create a new SSH runner with the given connection options
    pub fn new(options: SshOptions) -> Self {
        Self { options }
    }

    /// Build the SSH argument vector up to and including the target
    fn build_ssh_args(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            format!("ConnectTimeout={}", self.options.connect_timeout_seconds),
            "-o".to_string(),
            format!("ServerAliveInterval={}", self.options.server_alive_interval),
            "-o".to_string(),
            format!("ServerAliveCountMax={}", self.options.server_alive_count_max),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-p".to_string(),
            self.options.port.to_string(),
        ];

        if let Some(ref key_path) = self.options.key_path {
            args.push("-i".to_string());
            args.push(key_path.clone());
        }

        args.push(format!("{}@{}", self.options.user, self.options.host));

        args
    }

    fn execute(&self, remote_cmd: &str) -> Result<CommandOutput, RunnerError> {
        let mut args = self.build_ssh_args();
        args.push(remote_cmd.to_string());

        let output = Command::new("ssh")
            .args(&args)
            .output()
            .map_err(|e| RunnerError::Spawn(format!("Failed to spawn SSH: {}", e)))?;

        Ok(CommandOutput {
            ok: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

impl Runner for SshRunner {
    fn run(&self, cmd: &str) -> Result<CommandOutput, RunnerError> {
        self.execute(cmd)
    }

    fn run_in(&self, dir: &Path, cmd: &str) -> Result<CommandOutput, RunnerError> {
        self.execute(&format!("cd {} && {}", dir.display(), cmd))
    }
}
