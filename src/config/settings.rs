//! Layered settings
//!
//! Three layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. Host config file (`~/.config/gachette/config.toml`)
//! 3. CLI `--set key=value` overrides (dotted keys)
//!
//! Layers are combined with [`deep_merge`], which gives its first operand
//! priority, so higher-precedence layers are merged in as the base side.
//! Each loaded file records its path and a SHA-256 digest of the raw
//! bytes for provenance.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::runner::SshOptions;
use crate::working_copy::{DEFAULT_ARCH, DEFAULT_BASE_VERSION, DEFAULT_CLONE_DEPTH, DEFAULT_TOOL};

use super::dotted::{deep_merge, expand_dotted_keys};

/// Resolved settings driving a build or registry operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Root directory for project checkouts
    #[serde(default = "default_working_root")]
    pub working_root: PathBuf,

    /// Root directory of the stack/package registry
    #[serde(default = "default_meta_root")]
    pub meta_root: PathBuf,

    /// Directory artifacts are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Packaging tool name
    #[serde(default = "default_tool")]
    pub tool: String,

    /// Target architecture token
    #[serde(default = "default_arch")]
    pub arch: String,

    /// Shallow clone depth
    #[serde(default = "default_clone_depth")]
    pub clone_depth: u32,

    /// Base version for git-derived versions
    #[serde(default = "default_base_version")]
    pub base_version: String,

    /// Remote build host; absent means local execution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<SshOptions>,
}

fn default_working_root() -> PathBuf {
    PathBuf::from("/var/gachette/working_copy")
}

fn default_meta_root() -> PathBuf {
    PathBuf::from("/var/gachette")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("/var/gachette/debs")
}

fn default_tool() -> String {
    DEFAULT_TOOL.to_string()
}

fn default_arch() -> String {
    DEFAULT_ARCH.to_string()
}

fn default_clone_depth() -> u32 {
    DEFAULT_CLONE_DEPTH
}

fn default_base_version() -> String {
    DEFAULT_BASE_VERSION.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            working_root: default_working_root(),
            meta_root: default_meta_root(),
            output_dir: default_output_dir(),
            tool: default_tool(),
            arch: default_arch(),
            clone_depth: default_clone_depth(),
            base_version: default_base_version(),
            host: None,
        }
    }
}

/// Origin of a settings layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SettingsOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing settings layer with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsSource {
    /// Origin of this layer
    pub origin: SettingsOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Merged settings plus the layers that produced them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveSettings {
    /// The merged settings
    pub settings: Settings,

    /// Contributing layers in precedence order (lowest first)
    pub sources: Vec<SettingsSource>,
}

impl EffectiveSettings {
    /// Build effective settings from the optional host file and CLI overrides.
    ///
    /// `overrides` are `key=value` strings; keys may be dotted
    /// (`host.port=2222`), values are parsed as JSON scalars where
    /// possible and fall back to strings.
    pub fn build(file_path: Option<&Path>, overrides: &[String]) -> Result<Self, SettingsError> {
        let mut sources = vec![SettingsSource {
            origin: SettingsOrigin::Builtin,
            path: None,
            digest: None,
        }];

        let defaults = serde_json::to_value(Settings::default())
            .map_err(|e| SettingsError::Parse(e.to_string()))?;
        let mut merged = defaults;

        if let Some(path) = file_path {
            if path.exists() {
                let (value, digest) = load_toml_file(path)?;
                // File layer wins over defaults
                merged = deep_merge(value, merged);
                sources.push(SettingsSource {
                    origin: SettingsOrigin::File,
                    path: Some(path.to_string_lossy().to_string()),
                    digest: Some(digest),
                });
            }
        }

        if !overrides.is_empty() {
            let mut flat = Map::new();
            for raw in overrides {
                let (key, value) = parse_override(raw)?;
                flat.insert(key, value);
            }
            // CLI layer wins over everything below it
            merged = deep_merge(expand_dotted_keys(flat), merged);
            sources.push(SettingsSource {
                origin: SettingsOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let settings: Settings = serde_json::from_value(merged)
            .map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;

        Ok(Self { settings, sources })
    }

    /// Default host config file path (`~/.config/gachette/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config/gachette/config.toml"))
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Settings {
    fn validate(&self) -> Result<(), SettingsError> {
        if self.clone_depth == 0 {
            return Err(SettingsError::Validation(
                "clone_depth must be at least 1".to_string(),
            ));
        }
        if self.tool.is_empty() {
            return Err(SettingsError::Validation("tool must not be empty".to_string()));
        }
        if self.arch.is_empty() {
            return Err(SettingsError::Validation("arch must not be empty".to_string()));
        }
        if self.base_version.is_empty() {
            return Err(SettingsError::Validation(
                "base_version must not be empty".to_string(),
            ));
        }
        if let Some(ref host) = self.host {
            if host.host.is_empty() {
                return Err(SettingsError::Validation(
                    "host.host must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Load and parse a TOML file, returning the value and its digest
fn load_toml_file(path: &Path) -> Result<(Value, String), SettingsError> {
    let bytes = std::fs::read(path).map_err(|e| SettingsError::Io(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let contents = String::from_utf8(bytes)
        .map_err(|e| SettingsError::Parse(format!("Invalid UTF-8: {}", e)))?;
    let toml_value: toml::Value = toml::from_str(&contents)
        .map_err(|e| SettingsError::Parse(format!("TOML parse error: {}", e)))?;

    Ok((toml_to_json(toml_value), digest))
}

/// Convert TOML Value to JSON Value
fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => {
            let map: Map<String, Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            Value::Object(map)
        }
    }
}

/// Split a `key=value` override, parsing the value as a JSON scalar when possible
fn parse_override(raw: &str) -> Result<(String, Value), SettingsError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| SettingsError::InvalidOverride(raw.to_string()))?;
    if key.is_empty() {
        return Err(SettingsError::InvalidOverride(raw.to_string()));
    }

    let parsed = serde_json::from_str::<Value>(value)
        .ok()
        .filter(|v| !v.is_object() && !v.is_array())
        .unwrap_or_else(|| Value::String(value.to_string()));

    Ok((key.to_string(), parsed))
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid override (expected key=value): {0}")]
    InvalidOverride(String),
}
