//! Gachette - build orchestration and stack registry
//!
//! Builds versioned artifacts from a source-control working copy and
//! registers them into layered deployment stacks on a remote host. All
//! side effects flow through the [`runner::Runner`] execution boundary.

pub mod config;
pub mod runner;
pub mod stack;
pub mod summary;
pub mod working_copy;

pub use config::{deep_merge, dotted_to_nested, expand_dotted_keys, EffectiveSettings, Settings};
pub use runner::{CommandOutput, LocalRunner, RecordingRunner, Runner, SshRunner};
pub use stack::Stack;
pub use summary::BuildSummary;
pub use working_copy::{VersionKind, WorkingCopy};
