//! StorageProvider trait

use oracledrive_core::{
    DriveFile, FileId, FileMetadata, FileOperationResult, Result, StorageOptimization,
    SyncConfiguration,
};

/// Storage collaborator the orchestrator delegates file operations to.
///
/// `upload`, `download`, `delete`, and `intelligent_sync` report their
/// terminal outcome as a `FileOperationResult`; an `Err` means the provider
/// itself faulted (missing object, capacity, I/O).
#[async_trait::async_trait]
pub trait StorageProvider: Send + Sync {
    /// Produce a storage-wide optimization snapshot, applying tier demotion
    /// as a side effect.
    async fn optimize(&self) -> Result<StorageOptimization>;

    /// Rewrite an upload candidate into its storage-optimized form. Runs
    /// before the security scan and must be loss-free.
    async fn optimize_for_upload(&self, file: DriveFile) -> Result<DriveFile>;

    async fn upload(&self, file: DriveFile, metadata: FileMetadata)
        -> Result<FileOperationResult>;

    async fn download(&self, file_id: &FileId) -> Result<FileOperationResult>;

    async fn delete(&self, file_id: &FileId) -> Result<FileOperationResult>;

    /// Drain the pending-change journal, resolving conflicts per the
    /// configured strategy.
    async fn intelligent_sync(&self, config: SyncConfiguration) -> Result<FileOperationResult>;
}
