//! Working copy of a project under build
//!
//! Owns one checkout path (a configured root joined with the project
//! name), carries the version metadata passed to the packaging tool,
//! and drives environment preparation, checkout synchronization and the
//! build invocation through the execution boundary.

mod prober;
mod sync;

pub use prober::{reconcile, CommandProber, EnvironmentProber};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::runner::{CommandOutput, Runner, RunnerError};

/// Default base version used when deriving a version from git.
///
/// A placeholder rather than real project metadata; override it through
/// configuration when projects carry their own base version.
pub const DEFAULT_BASE_VERSION: &str = "0.0.1";

/// Default shallow clone depth
pub const DEFAULT_CLONE_DEPTH: u32 = 100;

/// Default packaging tool invoked by [`WorkingCopy::build`]
pub const DEFAULT_TOOL: &str = "trebuchet";

/// Default target architecture token
pub const DEFAULT_ARCH: &str = "amd64";

/// The kinds of version metadata a build can carry.
///
/// A closed set: the packaging tool only understands these three flags.
/// The derived ordering (app, env, service) is the fixed rendering order
/// of the version suffix, independent of insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VersionKind {
    App,
    Env,
    Service,
}

impl VersionKind {
    /// The packaging-tool flag for this kind
    pub fn flag(&self) -> &'static str {
        match self {
            VersionKind::App => "--app-version",
            VersionKind::Env => "--env-version",
            VersionKind::Service => "--service-version",
        }
    }
}

/// A project checkout plus its accumulated version metadata.
///
/// Created per build invocation and discarded after the build completes.
pub struct WorkingCopy<'r> {
    runner: &'r dyn Runner,
    name: String,
    path: PathBuf,
    base_version: String,
    clone_depth: u32,
    tool: String,
    arch: String,
    versions: BTreeMap<VersionKind, String>,
}

impl<'r> WorkingCopy<'r> {
    /// Create a working copy for `name`, checked out under `working_root`
    pub fn new(runner: &'r dyn Runner, name: &str, working_root: &Path) -> Self {
        Self {
            runner,
            name: name.to_string(),
            path: working_root.join(name),
            base_version: DEFAULT_BASE_VERSION.to_string(),
            clone_depth: DEFAULT_CLONE_DEPTH,
            tool: DEFAULT_TOOL.to_string(),
            arch: DEFAULT_ARCH.to_string(),
            versions: BTreeMap::new(),
        }
    }

    /// Override the base version used by [`Self::version_from_git`]
    pub fn with_base_version(mut self, base_version: &str) -> Self {
        self.base_version = base_version.to_string();
        self
    }

    /// Override the shallow clone depth
    pub fn with_clone_depth(mut self, depth: u32) -> Self {
        self.clone_depth = depth;
        self
    }

    /// Override the packaging tool name
    pub fn with_tool(mut self, tool: &str) -> Self {
        self.tool = tool.to_string();
        self
    }

    /// Override the target architecture token
    pub fn with_arch(mut self, arch: &str) -> Self {
        self.arch = arch.to_string();
        self
    }

    /// Project name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checkout path (working root joined with the project name)
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Upsert or remove one kind of version metadata.
    ///
    /// An empty `version` removes the entry entirely; unsetting an absent
    /// kind is a no-op.
    pub fn set_version(&mut self, kind: VersionKind, version: &str) {
        if version.is_empty() {
            self.versions.remove(&kind);
        } else {
            self.versions.insert(kind, version.to_string());
        }
    }

    /// Render the version metadata as packaging-tool flags.
    ///
    /// One ` --<kind>-version <value>` token per set kind, always in
    /// app, env, service order, each prefixed with a single space.
    /// Empty string when no kind is set.
    pub fn version_suffix(&self) -> String {
        let mut suffix = String::new();
        for (kind, version) in &self.versions {
            suffix.push(' ');
            suffix.push_str(kind.flag());
            suffix.push(' ');
            suffix.push_str(version);
        }
        suffix
    }

    /// Render the webcallback flag, or empty string for an empty url
    pub fn webcallback_suffix(url: &str) -> String {
        if url.is_empty() {
            String::new()
        } else {
            format!(" --webcallback {}", url)
        }
    }

    /// Derive a version string from the checked-out commit.
    ///
    /// `<base>rev<short-hash>`, optionally followed by `-<suffix>` with
    /// underscores rewritten to hyphens.
    pub fn version_from_git(&self, suffix: Option<&str>) -> Result<String, WorkingCopyError> {
        let head = self.run_checked_in("git rev-parse --short HEAD")?;
        let mut version = format!("{}rev{}", self.base_version, head.stdout.trim());

        if let Some(suffix) = suffix {
            if !suffix.is_empty() {
                version.push('-');
                version.push_str(&suffix.replace('_', "-"));
            }
        }

        Ok(version)
    }

    fn run_checked(&self, cmd: &str) -> Result<CommandOutput, WorkingCopyError> {
        let output = self.runner.run(cmd)?;
        if !output.ok {
            return Err(WorkingCopyError::CommandFailed {
                cmd: cmd.to_string(),
                stderr: output.stderr,
            });
        }
        Ok(output)
    }

    fn run_checked_in(&self, cmd: &str) -> Result<CommandOutput, WorkingCopyError> {
        let output = self.runner.run_in(&self.path, cmd)?;
        if !output.ok {
            return Err(WorkingCopyError::CommandFailed {
                cmd: cmd.to_string(),
                stderr: output.stderr,
            });
        }
        Ok(output)
    }
}

/// Working copy errors
#[derive(Debug, thiserror::Error)]
pub enum WorkingCopyError {
    #[error("Command failed: {cmd}: {stderr}")]
    CommandFailed { cmd: String, stderr: String },

    #[error("Runner error: {0}")]
    Runner(#[from] RunnerError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RecordingRunner;

    fn working_copy<'r>(runner: &'r RecordingRunner) -> WorkingCopy<'r> {
        WorkingCopy::new(runner, "version_test", Path::new("/var/gachette/working_copy"))
    }

    #[test]
    fn test_path_derived_from_root_and_name() {
        let runner = RecordingRunner::new();
        let wc = working_copy(&runner);
        assert_eq!(
            wc.path(),
            Path::new("/var/gachette/working_copy/version_test")
        );
    }

    #[test]
    fn test_app_version_set_update_unset() {
        let runner = RecordingRunner::new();
        let mut wc = working_copy(&runner);

        wc.set_version(VersionKind::App, "1.2.3");
        assert_eq!(wc.version_suffix(), " --app-version 1.2.3");

        wc.set_version(VersionKind::App, "1.2.4");
        assert_eq!(wc.version_suffix(), " --app-version 1.2.4");

        wc.set_version(VersionKind::App, "");
        assert_eq!(wc.version_suffix(), "");
    }

    #[test]
    fn test_env_version() {
        let runner = RecordingRunner::new();
        let mut wc = working_copy(&runner);
        wc.set_version(VersionKind::Env, "1.2.3");
        assert_eq!(wc.version_suffix(), " --env-version 1.2.3");
    }

    #[test]
    fn test_service_version() {
        let runner = RecordingRunner::new();
        let mut wc = working_copy(&runner);
        wc.set_version(VersionKind::Service, "1.2.3");
        assert_eq!(wc.version_suffix(), " --service-version 1.2.3");
    }

    #[test]
    fn test_multiple_versions_accumulate() {
        let runner = RecordingRunner::new();
        let mut wc = working_copy(&runner);

        wc.set_version(VersionKind::App, "1.2.3");
        wc.set_version(VersionKind::Env, "2.3.4");
        assert_eq!(
            wc.version_suffix(),
            " --app-version 1.2.3 --env-version 2.3.4"
        );

        wc.set_version(VersionKind::Service, "3.4.5");
        assert_eq!(
            wc.version_suffix(),
            " --app-version 1.2.3 --env-version 2.3.4 --service-version 3.4.5"
        );
    }

    #[test]
    fn test_suffix_order_is_fixed_not_insertion_order() {
        let runner = RecordingRunner::new();
        let mut wc = working_copy(&runner);

        wc.set_version(VersionKind::Service, "3.4.5");
        wc.set_version(VersionKind::App, "1.2.3");
        wc.set_version(VersionKind::Env, "2.3.4");
        assert_eq!(
            wc.version_suffix(),
            " --app-version 1.2.3 --env-version 2.3.4 --service-version 3.4.5"
        );
    }

    #[test]
    fn test_webcallback_suffix() {
        assert_eq!(
            WorkingCopy::webcallback_suffix("http://garnison.dev:8080/cb"),
            " --webcallback http://garnison.dev:8080/cb"
        );
        assert_eq!(WorkingCopy::webcallback_suffix(""), "");
    }

    #[test]
    fn test_version_from_git() {
        let runner = RecordingRunner::new();
        runner.succeed_matching("rev-parse --short", "1A2B3C4D\n");
        let wc = working_copy(&runner);

        assert_eq!(wc.version_from_git(None).unwrap(), "0.0.1rev1A2B3C4D");
        assert_eq!(
            wc.version_from_git(Some("foo")).unwrap(),
            "0.0.1rev1A2B3C4D-foo"
        );
    }

    #[test]
    fn test_version_from_git_rewrites_underscores() {
        let runner = RecordingRunner::new();
        runner.succeed_matching("rev-parse --short", "1A2B3C4D\n");
        let wc = working_copy(&runner);

        assert_eq!(
            wc.version_from_git(Some("foo_bar")).unwrap(),
            "0.0.1rev1A2B3C4D-foo-bar"
        );
    }

    #[test]
    fn test_version_from_git_custom_base() {
        let runner = RecordingRunner::new();
        runner.succeed_matching("rev-parse --short", "deadbee\n");
        let wc = working_copy(&runner).with_base_version("2.1.0");

        assert_eq!(wc.version_from_git(None).unwrap(), "2.1.0revdeadbee");
    }
}
