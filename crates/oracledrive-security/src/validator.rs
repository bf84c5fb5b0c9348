//! SecurityValidator trait and check outcomes
//!
//! Each check returns its outcome as data. An `Err` from a check means the
//! validator itself could not run (transport fault, poisoned state), not that
//! the check failed.

use oracledrive_core::{DriveFile, FileId, Result, UserId};

/// Outcome of the drive-wide access gate checked at initialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DriveAccessCheck {
    Valid,
    Invalid { reason: String },
}

/// Outcome of the upload threat scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadCheck {
    Secure,
    Threat { description: String },
}

/// Outcome of a per-file read-access check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileAccessCheck {
    Granted,
    Denied { reason: String },
}

/// Outcome of a deletion-authorization check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeletionCheck {
    Authorized,
    Unauthorized { reason: String },
}

/// Security collaborator consulted by the orchestrator.
#[async_trait::async_trait]
pub trait SecurityValidator: Send + Sync {
    /// Gate the whole drive. Checked once per `initialize()`.
    async fn validate_drive_access(&self) -> Result<DriveAccessCheck>;

    /// Scan an upload candidate. Runs on the optimized file, after
    /// `optimize_for_upload`.
    async fn validate_file_upload(&self, file: &DriveFile) -> Result<UploadCheck>;

    /// Check whether `user_id` may read `file_id`.
    async fn validate_file_access(&self, file_id: &FileId, user_id: &UserId)
        -> Result<FileAccessCheck>;

    /// Check whether `user_id` may delete `file_id`.
    async fn validate_deletion(&self, file_id: &FileId, user_id: &UserId)
        -> Result<DeletionCheck>;
}
