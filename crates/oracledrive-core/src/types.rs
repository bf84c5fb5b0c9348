//! Value objects shared across the drive subsystem

use crate::error::{DriveError, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// File identifier - cheaply cloneable
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct FileId(Arc<str>);

impl FileId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(Arc::from(s.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for FileId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for FileId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Serialize for FileId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FileId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// User identifier - cheaply cloneable
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct UserId(Arc<str>);

impl UserId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(Arc::from(s.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Serialize for UserId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Content encoding applied by upload optimization
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentEncoding {
    #[default]
    Identity,
    Gzip,
}

/// A file moving through the drive
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DriveFile {
    pub id: FileId,
    pub name: String,
    pub content: Bytes,
    pub size: u64,
    pub mime_type: String,
    #[serde(default)]
    pub encoding: ContentEncoding,
}

impl DriveFile {
    /// Build a file whose size is derived from its content. Cannot be
    /// constructed with a size/content mismatch.
    pub fn new(
        id: impl Into<FileId>,
        name: impl Into<String>,
        content: impl Into<Bytes>,
        mime_type: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let size = content.len() as u64;
        Self {
            id: id.into(),
            name: name.into(),
            content,
            size,
            mime_type: mime_type.into(),
            encoding: ContentEncoding::Identity,
        }
    }

    /// Build from externally supplied parts, rejecting a declared size that
    /// does not match the content length.
    pub fn from_parts(
        id: impl Into<FileId>,
        name: impl Into<String>,
        content: impl Into<Bytes>,
        size: u64,
        mime_type: impl Into<String>,
        encoding: ContentEncoding,
    ) -> Result<Self> {
        let content = content.into();
        if content.len() as u64 != size {
            return Err(DriveError::invalid_file(format!(
                "declared size {} does not match content length {}",
                size,
                content.len()
            )));
        }
        Ok(Self {
            id: id.into(),
            name: name.into(),
            content,
            size,
            mime_type: mime_type.into(),
            encoding,
        })
    }
}

/// Access level attached to a file's metadata
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Public,
    Private,
    Restricted,
    Classified,
}

impl AccessLevel {
    /// Monotonic sensitivity rank, lowest first.
    pub fn rank(&self) -> u8 {
        match self {
            AccessLevel::Public => 0,
            AccessLevel::Private => 1,
            AccessLevel::Restricted => 2,
            AccessLevel::Classified => 3,
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessLevel::Public => f.write_str("public"),
            AccessLevel::Private => f.write_str("private"),
            AccessLevel::Restricted => f.write_str("restricted"),
            AccessLevel::Classified => f.write_str("classified"),
        }
    }
}

/// Metadata attached to an uploaded file
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FileMetadata {
    pub owner: UserId,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub encrypted: bool,
    pub access_level: AccessLevel,
}

impl FileMetadata {
    pub fn new(owner: impl Into<UserId>, access_level: AccessLevel) -> Self {
        Self {
            owner: owner.into(),
            tags: Vec::new(),
            encrypted: false,
            access_level,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }
}

/// How sync resolves conflicting changes to the same file
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStrategy {
    #[default]
    NewestWins,
    ManualResolve,
    AiDecide,
}

/// Relative scheduling priority for sync traffic
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncPriority {
    Low,
    #[default]
    Normal,
    High,
}

/// Bandwidth envelope for a sync pass
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct BandwidthSettings {
    /// None means unthrottled.
    pub max_bytes_per_sec: Option<u64>,
    #[serde(default)]
    pub priority: SyncPriority,
}

/// Parameters for one intelligent-sync pass
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SyncConfiguration {
    #[serde(default)]
    pub bidirectional: bool,
    #[serde(default)]
    pub conflict_strategy: ConflictStrategy,
    #[serde(default)]
    pub bandwidth: BandwidthSettings,
}

/// Snapshot returned by the metadata service once awakened
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConsciousnessSnapshot {
    pub awake: bool,
    /// Activity level, 0-100.
    pub level: u8,
    pub active_agents: Vec<String>,
}

/// Live status of the metadata service, delivered over a watch channel
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ConsciousnessState {
    pub active: bool,
    pub current_operations: Vec<String>,
    pub metrics: HashMap<String, f64>,
}

/// Snapshot returned by storage optimization
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StorageOptimization {
    /// Stored bytes over original bytes; 1.0 when nothing compresses.
    pub compression_ratio: f64,
    pub space_saved_bytes: u64,
    pub tiering_enabled: bool,
}

/// Outcome of a metadata synchronization pass
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MetadataSyncReport {
    pub success: bool,
    pub records_updated: u64,
    #[serde(default)]
    pub errors: Vec<String>,
}
