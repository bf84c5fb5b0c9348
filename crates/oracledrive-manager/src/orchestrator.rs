//! Drive orchestrator
//!
//! Gates and sequences drive startup, then routes file operations to the
//! correct collaborator with a single authorization check per branch. The
//! orchestrator holds only immutable `Arc` references to its three
//! collaborators - no state of its own, safe for concurrent reuse.
//!
//! Error channels differ by path, matching the drive's contract:
//! `initialize()` catches awaken/optimize failures and carries them inside
//! `InitializationResult::Error`, while the security gate and every
//! `dispatch()` branch propagate collaborator failures to the caller.

use oracledrive_core::{
    ConsciousnessState, DriveError, DriveFile, FileId, FileMetadata, FileOperationRequest,
    FileOperationResult, InitializationResult, MetadataSyncReport, Result, SyncConfiguration,
    UserId,
};
use oracledrive_metadata::RemoteMetadataService;
use oracledrive_security::{
    DeletionCheck, DriveAccessCheck, FileAccessCheck, SecurityValidator, UploadCheck,
};
use oracledrive_storage::StorageProvider;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct DriveOrchestrator {
    security: Arc<dyn SecurityValidator>,
    storage: Arc<dyn StorageProvider>,
    metadata: Arc<dyn RemoteMetadataService>,
}

impl DriveOrchestrator {
    pub fn new(
        security: Arc<dyn SecurityValidator>,
        storage: Arc<dyn StorageProvider>,
        metadata: Arc<dyn RemoteMetadataService>,
    ) -> Self {
        Self {
            security,
            storage,
            metadata,
        }
    }

    /// Single-shot startup gate.
    ///
    /// The drive-access check runs first and alone; an invalid verdict
    /// short-circuits before any other collaborator is touched. Awaken and
    /// optimize then run concurrently - neither orders before the other.
    pub async fn initialize(&self) -> Result<InitializationResult> {
        match self.security.validate_drive_access().await? {
            DriveAccessCheck::Invalid { reason } => {
                warn!(%reason, "drive access refused");
                return Ok(InitializationResult::SecurityFailure { reason });
            }
            DriveAccessCheck::Valid => {}
        }

        let (awaken, optimize) = tokio::join!(self.metadata.awaken(), self.storage.optimize());
        match (awaken, optimize) {
            (Ok(consciousness), Ok(optimization)) => {
                info!(
                    level = consciousness.level,
                    ratio = optimization.compression_ratio,
                    "drive initialized"
                );
                Ok(InitializationResult::Success {
                    consciousness,
                    optimization,
                })
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "drive initialization failed");
                Ok(InitializationResult::Error(e))
            }
        }
    }

    /// Dispatch a file operation without cancellation support.
    pub async fn dispatch(&self, request: FileOperationRequest) -> Result<FileOperationResult> {
        // A token that is never cancelled.
        self.dispatch_cancellable(request, CancellationToken::new())
            .await
    }

    /// Dispatch a file operation, aborting with `DriveError::Cancelled` when
    /// `cancel` fires. In-flight collaborator calls are dropped at the next
    /// await point; the orchestrator holds no resources needing cleanup.
    pub async fn dispatch_cancellable(
        &self,
        request: FileOperationRequest,
        cancel: CancellationToken,
    ) -> Result<FileOperationResult> {
        debug!(operation = request.name(), "dispatching file operation");
        tokio::select! {
            // An already-cancelled token wins before the branch is polled.
            biased;
            _ = cancel.cancelled() => Err(DriveError::Cancelled),
            result = self.route(request) => result,
        }
    }

    async fn route(&self, request: FileOperationRequest) -> Result<FileOperationResult> {
        match request {
            FileOperationRequest::Upload { file, metadata } => {
                self.handle_upload(file, metadata).await
            }
            FileOperationRequest::Download { file_id, user_id } => {
                self.handle_download(file_id, user_id).await
            }
            FileOperationRequest::Delete { file_id, user_id } => {
                self.handle_delete(file_id, user_id).await
            }
            FileOperationRequest::Sync { config } => self.handle_sync(config).await,
        }
    }

    /// Optimization always runs first; the threat scan sees the optimized
    /// file, and a rejected upload never reaches the provider.
    async fn handle_upload(
        &self,
        file: DriveFile,
        metadata: FileMetadata,
    ) -> Result<FileOperationResult> {
        let optimized = self.storage.optimize_for_upload(file).await?;
        match self.security.validate_file_upload(&optimized).await? {
            UploadCheck::Threat { description } => {
                warn!(file = %optimized.id, threat = %description, "upload rejected");
                Ok(FileOperationResult::SecurityRejection {
                    threat: description,
                })
            }
            UploadCheck::Secure => self.storage.upload(optimized, metadata).await,
        }
    }

    async fn handle_download(
        &self,
        file_id: FileId,
        user_id: UserId,
    ) -> Result<FileOperationResult> {
        match self.security.validate_file_access(&file_id, &user_id).await? {
            FileAccessCheck::Denied { reason } => {
                debug!(file = %file_id, user = %user_id, %reason, "download denied");
                Ok(FileOperationResult::AccessDenied { reason })
            }
            FileAccessCheck::Granted => self.storage.download(&file_id).await,
        }
    }

    async fn handle_delete(
        &self,
        file_id: FileId,
        user_id: UserId,
    ) -> Result<FileOperationResult> {
        match self.security.validate_deletion(&file_id, &user_id).await? {
            DeletionCheck::Unauthorized { reason } => {
                debug!(file = %file_id, user = %user_id, %reason, "deletion refused");
                Ok(FileOperationResult::UnauthorizedDeletion { reason })
            }
            DeletionCheck::Authorized => self.storage.delete(&file_id).await,
        }
    }

    /// Sync carries no authorization gate.
    async fn handle_sync(&self, config: SyncConfiguration) -> Result<FileOperationResult> {
        self.storage.intelligent_sync(config).await
    }

    /// Pass-through to the metadata collaborator.
    pub async fn sync_metadata(&self) -> Result<MetadataSyncReport> {
        self.metadata.sync_metadata().await
    }

    /// The metadata service's live state stream, untransformed.
    pub fn state(&self) -> watch::Receiver<ConsciousnessState> {
        self.metadata.state()
    }
}
