//! Environment preparation, checkout synchronization and build invocation
//!
//! All three operations emit shell commands through the runner and infer
//! remote filesystem state from exit status, never from a filesystem API,
//! so the same code drives local and SSH execution.

use std::path::Path;

use crate::runner::CommandOutput;

use super::{WorkingCopy, WorkingCopyError};

impl WorkingCopy<'_> {
    /// Reconcile the checkout directory to an empty, existing state.
    ///
    /// Probes with `test -d`: an absent directory is created, a present
    /// one has its contents cleared in place. Both branches are terminal
    /// and the operation is safe to repeat; each call re-probes.
    pub fn prepare_environment(&self) -> Result<(), WorkingCopyError> {
        super::reconcile(&super::CommandProber::new(self.runner), &self.path)
    }

    /// Synchronize the checkout with `origin/<branch>`, destructively.
    ///
    /// Clones (shallow, quiet) when no `.git` metadata is present, then
    /// in both cases fetches and hard-resets to the remote branch tip,
    /// discarding local modifications, and updates nested submodules.
    /// Returns the resulting HEAD commit hash. A failed step propagates
    /// immediately; a failed sync can leave the checkout in a mixed
    /// state (e.g. fetched but not reset).
    pub fn force_sync(&self, url: &str, branch: &str) -> Result<String, WorkingCopyError> {
        let probe = self
            .runner
            .run(&format!("test -d {}/.git", self.path.display()))?;

        if !probe.ok {
            self.run_checked(&format!(
                "git clone --depth={} --quiet {} {}",
                self.clone_depth,
                url,
                self.path.display()
            ))?;
        }

        self.run_checked_in("git fetch --quiet origin")?;
        self.run_checked_in(&format!("git reset --quiet --hard origin/{}", branch))?;
        self.run_checked_in("git submodule --quiet init")?;
        self.run_checked_in("git submodule --quiet update")?;

        let head = self.run_checked_in("git rev-parse HEAD")?;
        Ok(head.stdout.trim().to_string())
    }

    /// Invoke the packaging tool against the checkout's manifest.
    ///
    /// Terminal operation of a build cycle; the tool's output is captured
    /// but not parsed.
    pub fn build(
        &self,
        output_dir: &Path,
        webcallback: Option<&str>,
    ) -> Result<CommandOutput, WorkingCopyError> {
        let manifest = self.path.join(".missile.yml");
        let cmd = format!(
            "{} build {} --arch {} --output {}{}{}",
            self.tool,
            manifest.display(),
            self.arch,
            output_dir.display(),
            self.version_suffix(),
            Self::webcallback_suffix(webcallback.unwrap_or("")),
        );

        self.run_checked(&cmd)
    }
}
