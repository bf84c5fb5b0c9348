//! Disk-backed storage provider
//!
//! Object bytes live under `objects/`; entry metadata and the pending-change
//! journal live in `index.json`, rewritten atomically after every mutation.

use crate::journal::{self, ChangeKind, PendingChange};
use crate::optimize;
use crate::provider::StorageProvider;
use chrono::{DateTime, Utc};
use oracledrive_core::{
    ContentEncoding, DriveError, DriveFile, FileId, FileMetadata, FileOperationResult,
    OperationPayload, Result, StorageConfig, StorageOptimization, SyncConfiguration,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct DiskEntry {
    name: String,
    size: u64,
    original_size: u64,
    mime_type: String,
    encoding: ContentEncoding,
    metadata: FileMetadata,
    stored_at: DateTime<Utc>,
    #[serde(default)]
    cold: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DiskIndex {
    entries: HashMap<String, DiskEntry>,
    #[serde(default)]
    journal: Vec<PendingChange>,
}

pub struct DiskStorageProvider {
    root: PathBuf,
    config: StorageConfig,
    state: Mutex<DiskIndex>,
}

impl DiskStorageProvider {
    /// Open (or create) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>, config: StorageConfig) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(root.join("objects")).await?;
        let index_path = root.join("index.json");
        let index = if index_path.exists() {
            let raw = tokio::fs::read(&index_path).await?;
            serde_json::from_slice(&raw)?
        } else {
            DiskIndex::default()
        };
        info!(root = %root.display(), files = index.entries.len(), "opened disk store");
        Ok(Self {
            root,
            config,
            state: Mutex::new(index),
        })
    }

    pub async fn registered_files(&self) -> Vec<(FileId, FileMetadata)> {
        let state = self.state.lock().await;
        state
            .entries
            .iter()
            .map(|(id, e)| (FileId::new(id.clone()), e.metadata.clone()))
            .collect()
    }

    fn object_path(&self, file_id: &FileId) -> PathBuf {
        self.root.join("objects").join(file_id.as_str())
    }

    fn check_id(file_id: &FileId) -> Result<()> {
        let id = file_id.as_str();
        if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
            return Err(DriveError::invalid_file(format!(
                "file id {id:?} is not storable"
            )));
        }
        Ok(())
    }

    async fn persist(&self, index: &DiskIndex) -> Result<()> {
        let tmp = self.root.join("index.json.tmp");
        let raw = serde_json::to_vec_pretty(index)?;
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, self.root.join("index.json")).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl StorageProvider for DiskStorageProvider {
    async fn optimize(&self) -> Result<StorageOptimization> {
        let mut state = self.state.lock().await;
        let mut stored: u64 = 0;
        let mut original: u64 = 0;
        let mut demoted = 0usize;
        for entry in state.entries.values_mut() {
            stored += entry.size;
            original += entry.original_size;
            let cold = entry.size > self.config.hot_tier_max_object_bytes;
            if entry.cold != cold {
                entry.cold = cold;
                demoted += 1;
            }
        }
        if demoted > 0 {
            debug!(demoted, "tier assignment updated");
            self.persist(&state).await?;
        }
        let compression_ratio = if original == 0 {
            1.0
        } else {
            stored as f64 / original as f64
        };
        Ok(StorageOptimization {
            compression_ratio,
            space_saved_bytes: original.saturating_sub(stored),
            tiering_enabled: self.config.hot_tier_max_object_bytes > 0,
        })
    }

    async fn optimize_for_upload(&self, file: DriveFile) -> Result<DriveFile> {
        optimize::optimize_for_upload(file, &self.config)
    }

    async fn upload(
        &self,
        file: DriveFile,
        metadata: FileMetadata,
    ) -> Result<FileOperationResult> {
        Self::check_id(&file.id)?;
        let mut state = self.state.lock().await;
        let used: u64 = state.entries.values().map(|e| e.size).sum();
        if used + file.size > self.config.capacity_bytes {
            return Err(DriveError::storage(
                "upload",
                format!("capacity {} bytes exceeded", self.config.capacity_bytes),
            ));
        }
        tokio::fs::write(self.object_path(&file.id), &file.content).await?;
        let compressed = file.encoding == ContentEncoding::Gzip;
        state.entries.insert(
            file.id.to_string(),
            DiskEntry {
                name: file.name.clone(),
                size: file.size,
                original_size: optimize::original_size(&file),
                mime_type: file.mime_type.clone(),
                encoding: file.encoding,
                metadata,
                stored_at: Utc::now(),
                cold: file.size > self.config.hot_tier_max_object_bytes,
            },
        );
        state.journal.push(PendingChange::now(
            file.id.clone(),
            ChangeKind::Upload,
            file.size,
        ));
        self.persist(&state).await?;
        info!(file = %file.id, bytes = file.size, compressed, "stored file on disk");
        Ok(FileOperationResult::Success(OperationPayload::Uploaded {
            file_id: file.id,
            bytes_stored: file.size,
            compressed,
        }))
    }

    async fn download(&self, file_id: &FileId) -> Result<FileOperationResult> {
        Self::check_id(file_id)?;
        let entry = {
            let state = self.state.lock().await;
            state
                .entries
                .get(file_id.as_str())
                .cloned()
                .ok_or_else(|| DriveError::file_not_found(file_id))?
        };
        // The entry can outlive its object when a delete lands between the
        // index lookup and this read.
        let content = match tokio::fs::read(self.object_path(file_id)).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DriveError::file_not_found(file_id));
            }
            Err(e) => return Err(e.into()),
        };
        let file = DriveFile::from_parts(
            file_id.clone(),
            entry.name,
            content,
            entry.size,
            entry.mime_type,
            entry.encoding,
        )?;
        Ok(FileOperationResult::Success(OperationPayload::Downloaded {
            file,
        }))
    }

    async fn delete(&self, file_id: &FileId) -> Result<FileOperationResult> {
        Self::check_id(file_id)?;
        let mut state = self.state.lock().await;
        let entry = state
            .entries
            .remove(file_id.as_str())
            .ok_or_else(|| DriveError::file_not_found(file_id))?;
        match tokio::fs::remove_file(self.object_path(file_id)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        state.journal.push(PendingChange::now(
            file_id.clone(),
            ChangeKind::Delete,
            entry.size,
        ));
        self.persist(&state).await?;
        debug!(file = %file_id, "deleted file from disk");
        Ok(FileOperationResult::Success(OperationPayload::Deleted {
            file_id: file_id.clone(),
        }))
    }

    async fn intelligent_sync(&self, config: SyncConfiguration) -> Result<FileOperationResult> {
        let plan = {
            let mut state = self.state.lock().await;
            let drained = std::mem::take(&mut state.journal);
            let plan = journal::plan_sync(drained, config.conflict_strategy);
            state.journal = plan.deferred.clone();
            self.persist(&state).await?;
            plan
        };
        let bytes: u64 = plan.applied.iter().map(|c| c.bytes).sum();
        journal::pace(bytes, &config.bandwidth).await;
        if config.bidirectional {
            debug!("bidirectional pass requested; no remote changes to pull");
        }
        Ok(FileOperationResult::Success(OperationPayload::Synced {
            records_synced: plan.applied.len() as u64,
            conflicts_resolved: plan.conflicts_resolved,
            conflicts_deferred: plan.conflicts_deferred,
        }))
    }
}
