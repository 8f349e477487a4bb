//! Stack registry
//!
//! A stack is a named, versioned snapshot of which package versions are
//! deployed together. The registry is a directory tree under a metadata
//! root, written through the execution boundary like everything else:
//!
//! ```text
//! <root>/packages/<name>/version/<version>/file   = artifact file name
//! <root>/stacks/<stack_version>/packages/<name>/version = package version
//! ```

use std::path::{Path, PathBuf};

use crate::runner::{Runner, RunnerError};

/// A deployment stack bound to a metadata root.
pub struct Stack<'r> {
    runner: &'r dyn Runner,
    version: String,
    meta_path: PathBuf,
}

impl<'r> Stack<'r> {
    /// Create a stack handle for `version` rooted at `meta_path`
    pub fn new(runner: &'r dyn Runner, version: &str, meta_path: &Path) -> Self {
        Self {
            runner,
            version: version.to_string(),
            meta_path: meta_path.to_path_buf(),
        }
    }

    /// Stack version label
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Register a package version and its artifact under this stack.
    ///
    /// Writes the package-version marker and the stack-package pointer
    /// unconditionally: re-registering the same pair is idempotent, and
    /// concurrent registrations of the same pair race with last-writer-wins
    /// semantics. Each write is a self-contained, immediately-executed
    /// side effect; a failure can leave one of the two paths updated and
    /// the other not.
    pub fn add_package(
        &self,
        name: &str,
        version: &str,
        file_name: &str,
    ) -> Result<(), StackError> {
        let package_dir = self
            .meta_path
            .join("packages")
            .join(name)
            .join("version")
            .join(version);
        self.run_checked(&format!("mkdir -p {}", package_dir.display()))?;
        self.run_checked(&format!("echo {} > {}/file", file_name, package_dir.display()))?;

        let stack_dir = self
            .meta_path
            .join("stacks")
            .join(&self.version)
            .join("packages")
            .join(name);
        self.run_checked(&format!("mkdir -p {}", stack_dir.display()))?;
        self.run_checked(&format!("echo {} > {}/version", version, stack_dir.display()))?;

        Ok(())
    }

    fn run_checked(&self, cmd: &str) -> Result<(), StackError> {
        let output = self.runner.run(cmd)?;
        if !output.ok {
            return Err(StackError::CommandFailed {
                cmd: cmd.to_string(),
                stderr: output.stderr,
            });
        }
        Ok(())
    }
}

/// Stack registry errors
#[derive(Debug, thiserror::Error)]
pub enum StackError {
    #[error("Command failed: {cmd}: {stderr}")]
    CommandFailed { cmd: String, stderr: String },

    #[error("Runner error: {0}")]
    Runner(#[from] RunnerError),
}
