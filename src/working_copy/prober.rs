//! Environment reconciliation
//!
//! Directory existence is inferred from a command's exit status, never
//! from a filesystem API, which keeps the same code path working against
//! a remote execution host. The [`EnvironmentProber`] trait is the seam:
//! callers depend on {exists, create, clear}, not on how existence is
//! determined, so a purely local implementation can swap in a real
//! filesystem check without touching them.

use std::path::Path;

use crate::runner::Runner;

use super::WorkingCopyError;

/// Probes and reconciles one checkout directory.
pub trait EnvironmentProber {
    /// Whether the directory exists
    fn exists(&self, path: &Path) -> Result<bool, WorkingCopyError>;

    /// Create the directory and any missing parents
    fn create(&self, path: &Path) -> Result<(), WorkingCopyError>;

    /// Clear the directory's contents, leaving the directory itself intact
    fn clear(&self, path: &Path) -> Result<(), WorkingCopyError>;
}

/// Reconcile `path` to an empty, existing directory.
///
/// Two-state machine: absent directories are created, present ones are
/// cleared in place. Both branches are terminal; repeat calls re-probe.
pub fn reconcile(prober: &dyn EnvironmentProber, path: &Path) -> Result<(), WorkingCopyError> {
    if prober.exists(path)? {
        prober.clear(path)
    } else {
        prober.create(path)
    }
}

/// Prober that drives shell commands through the execution boundary.
pub struct CommandProber<'r> {
    runner: &'r dyn Runner,
}

impl<'r> CommandProber<'r> {
    /// Create a prober backed by the given runner
    pub fn new(runner: &'r dyn Runner) -> Self {
        Self { runner }
    }

    fn run_checked(&self, cmd: &str) -> Result<(), WorkingCopyError> {
        let output = self.runner.run(cmd)?;
        if !output.ok {
            return Err(WorkingCopyError::CommandFailed {
                cmd: cmd.to_string(),
                stderr: output.stderr,
            });
        }
        Ok(())
    }
}

impl EnvironmentProber for CommandProber<'_> {
    fn exists(&self, path: &Path) -> Result<bool, WorkingCopyError> {
        let probe = self.runner.run(&format!("test -d {}", path.display()))?;
        Ok(probe.ok)
    }

    fn create(&self, path: &Path) -> Result<(), WorkingCopyError> {
        self.run_checked(&format!("mkdir -p {}", path.display()))
    }

    fn clear(&self, path: &Path) -> Result<(), WorkingCopyError> {
        self.run_checked(&format!("rm -rf {}/*", path.display()))
    }
}
