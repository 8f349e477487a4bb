//! Build summary artifact
//!
//! One JSON document per build invocation, recording what was built and
//! from which commit.

use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Schema version for build_summary.json
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "gachette/build_summary@1";

/// Summary of one build invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSummary {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// Unique build id
    pub build_id: String,

    /// When the summary was created
    pub created_at: DateTime<Utc>,

    /// Project name
    pub project: String,

    /// HEAD commit the build was made from
    pub commit: String,

    /// Derived version string
    pub version: String,

    /// Directory artifacts were written to
    pub output_dir: String,

    /// Whether the packaging tool succeeded
    pub ok: bool,
}

impl BuildSummary {
    /// Create a summary with a fresh build id and timestamp
    pub fn new(project: &str, commit: &str, version: &str, output_dir: &str, ok: bool) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            build_id: Ulid::new().to_string(),
            created_at: Utc::now(),
            project: project.to_string(),
            commit: commit.to_string(),
            version: version.to_string(),
            output_dir: output_dir.to_string(),
            ok,
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        std::fs::write(path, json)
    }
}
