//! Operation request/result sum types
//!
//! Every drive operation is expressed as a closed union: one request enum in,
//! exactly one terminal result out. Authorization failures are data, not
//! errors; infrastructure failures travel on the `Err` side of the
//! surrounding `Result` (see `DriveError`).

use crate::error::DriveError;
use crate::types::{
    ConsciousnessSnapshot, DriveFile, FileId, FileMetadata, StorageOptimization,
    SyncConfiguration, UserId,
};
use serde::{Deserialize, Serialize};

/// Outcome of a single orchestrator startup call
#[derive(Debug)]
pub enum InitializationResult {
    /// Drive access validated, metadata service awakened, storage optimized.
    Success {
        consciousness: ConsciousnessSnapshot,
        optimization: StorageOptimization,
    },
    /// Drive access check reported invalid; nothing else was attempted.
    SecurityFailure { reason: String },
    /// Awaken or optimize failed; the failure is carried, not propagated.
    Error(DriveError),
}

impl InitializationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, InitializationResult::Success { .. })
    }
}

/// One file operation, consumed exactly once by the dispatcher
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum FileOperationRequest {
    Upload {
        file: DriveFile,
        metadata: FileMetadata,
    },
    Download {
        file_id: FileId,
        user_id: UserId,
    },
    Delete {
        file_id: FileId,
        user_id: UserId,
    },
    Sync {
        config: SyncConfiguration,
    },
}

impl FileOperationRequest {
    /// Short operation name, used for logging.
    pub fn name(&self) -> &'static str {
        match self {
            FileOperationRequest::Upload { .. } => "upload",
            FileOperationRequest::Download { .. } => "download",
            FileOperationRequest::Delete { .. } => "delete",
            FileOperationRequest::Sync { .. } => "sync",
        }
    }
}

/// Terminal outcome of one dispatched file operation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum FileOperationResult {
    Success(OperationPayload),
    /// Upload refused by the threat scan; nothing was stored.
    SecurityRejection { threat: String },
    /// Download refused; the provider was never consulted.
    AccessDenied { reason: String },
    /// Delete refused; the provider was never consulted.
    UnauthorizedDeletion { reason: String },
}

/// Payload carried by a successful file operation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum OperationPayload {
    Uploaded {
        file_id: FileId,
        bytes_stored: u64,
        compressed: bool,
    },
    Downloaded {
        file: DriveFile,
    },
    Deleted {
        file_id: FileId,
    },
    Synced {
        records_synced: u64,
        conflicts_resolved: u64,
        conflicts_deferred: u64,
    },
}
