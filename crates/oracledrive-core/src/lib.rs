//! Core types for OracleDrive

pub mod config;
pub mod error;
pub mod ops;
pub mod types;

pub use config::{DriveConfig, MetadataConfig, SecurityConfig, StorageConfig};
pub use error::{DriveError, Result};
pub use ops::{
    FileOperationRequest, FileOperationResult, InitializationResult, OperationPayload,
};
pub use types::{
    AccessLevel, BandwidthSettings, ConflictStrategy, ConsciousnessSnapshot, ConsciousnessState,
    ContentEncoding, DriveFile, FileId, FileMetadata, MetadataSyncReport, StorageOptimization,
    SyncConfiguration, SyncPriority, UserId,
};
