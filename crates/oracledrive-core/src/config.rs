//! Drive configuration
//!
//! All tunable parameters in one place. Loaded from TOML at startup,
//! falls back to defaults if no config file exists.

use crate::error::{DriveError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level drive configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Security validation rules.
    pub security: SecurityConfig,
    /// Storage capacity and optimization parameters.
    pub storage: StorageConfig,
    /// Metadata service parameters.
    pub metadata: MetadataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// When set, the whole drive is refused at initialization.
    pub lockdown: bool,
    /// File extensions refused at upload (compared case-insensitively).
    pub blocked_extensions: Vec<String>,
    /// Regex patterns over file names refused at upload.
    pub blocked_name_patterns: Vec<String>,
    /// Uploads larger than this are treated as a threat.
    pub max_upload_bytes: u64,
    /// Users cleared to read classified files they do not own.
    pub classified_clearances: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            lockdown: false,
            blocked_extensions: ["exe", "dll", "bat", "cmd", "scr", "msi"]
                .into_iter()
                .map(String::from)
                .collect(),
            blocked_name_patterns: vec![r"(?i)^autorun\.inf$".to_string()],
            max_upload_bytes: 512 * 1024 * 1024,
            classified_clearances: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Total bytes the provider will accept before refusing uploads.
    pub capacity_bytes: u64,
    /// Objects stored above this size are demoted to the cold tier.
    pub hot_tier_max_object_bytes: u64,
    /// Media-type prefixes considered worth compressing at upload.
    pub compressible_mime_prefixes: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: 10 * 1024 * 1024 * 1024,
            hot_tier_max_object_bytes: 64 * 1024 * 1024,
            compressible_mime_prefixes: [
                "text/",
                "application/json",
                "application/xml",
                "image/svg",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Remote metadata endpoint. None selects the in-process service.
    pub endpoint: Option<String>,
    /// Bearer token for the remote endpoint.
    pub api_token: Option<String>,
    /// Agents reported by the in-process service.
    pub agents: Vec<String>,
    /// Remote state poll interval in milliseconds.
    pub state_poll_interval_ms: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_token: None,
            agents: ["indexer", "replicator", "scrubber"]
                .into_iter()
                .map(String::from)
                .collect(),
            state_poll_interval_ms: 500,
        }
    }
}

impl DriveConfig {
    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| DriveError::config(e.to_string()))
    }

    /// Load from a TOML file, falling back to defaults when the file is
    /// missing. A present-but-malformed file is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
