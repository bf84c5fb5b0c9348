//! In-process storage provider
//!
//! Backs tests and demos. Entries live in a concurrent map; the change
//! journal feeds intelligent sync.

use crate::journal::{self, ChangeKind, PendingChange};
use crate::optimize;
use crate::provider::StorageProvider;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use oracledrive_core::{
    ContentEncoding, DriveError, DriveFile, FileId, FileMetadata, FileOperationResult,
    OperationPayload, Result, StorageConfig, StorageOptimization, SyncConfiguration,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageTier {
    Hot,
    Cold,
}

#[derive(Clone, Debug)]
struct StoredEntry {
    file: DriveFile,
    metadata: FileMetadata,
    stored_at: DateTime<Utc>,
    tier: StorageTier,
}

pub struct MemoryStorageProvider {
    config: StorageConfig,
    entries: DashMap<FileId, StoredEntry>,
    journal: Mutex<Vec<PendingChange>>,
}

impl MemoryStorageProvider {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            entries: DashMap::new(),
            journal: Mutex::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Owner/access-level pairs for every stored file, used by hosts to seed
    /// a security registry.
    pub fn registered_files(&self) -> Vec<(FileId, FileMetadata)> {
        self.entries
            .iter()
            .map(|e| (e.key().clone(), e.metadata.clone()))
            .collect()
    }

    pub async fn pending_changes(&self) -> usize {
        self.journal.lock().await.len()
    }

    fn used_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.file.size).sum()
    }

    fn tier_for(&self, size: u64) -> StorageTier {
        if size > self.config.hot_tier_max_object_bytes {
            StorageTier::Cold
        } else {
            StorageTier::Hot
        }
    }
}

#[async_trait::async_trait]
impl StorageProvider for MemoryStorageProvider {
    async fn optimize(&self) -> Result<StorageOptimization> {
        let mut stored: u64 = 0;
        let mut original: u64 = 0;
        let mut demoted = 0usize;
        for mut entry in self.entries.iter_mut() {
            stored += entry.file.size;
            original += optimize::original_size(&entry.file);
            let tier = self.tier_for(entry.file.size);
            if entry.tier != tier {
                entry.tier = tier;
                demoted += 1;
            }
        }
        if demoted > 0 {
            debug!(demoted, "tier demotion applied");
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
        // The journal lock serializes admission, so concurrent uploads cannot
        // both pass the capacity check.
        let mut journal = self.journal.lock().await;
        if self.used_bytes() + file.size > self.config.capacity_bytes {
            return Err(DriveError::storage(
                "upload",
                format!("capacity {} bytes exceeded", self.config.capacity_bytes),
            ));
        }
        let file_id = file.id.clone();
        let bytes_stored = file.size;
        let compressed = file.encoding == ContentEncoding::Gzip;
        let tier = self.tier_for(file.size);
        self.entries.insert(
            file_id.clone(),
            StoredEntry {
                file,
                metadata,
                stored_at: Utc::now(),
                tier,
            },
        );
        journal.push(PendingChange::now(
            file_id.clone(),
            ChangeKind::Upload,
            bytes_stored,
        ));
        info!(file = %file_id, bytes = bytes_stored, compressed, "stored file");
        Ok(FileOperationResult::Success(OperationPayload::Uploaded {
            file_id,
            bytes_stored,
            compressed,
        }))
    }

    async fn download(&self, file_id: &FileId) -> Result<FileOperationResult> {
        let entry = self
            .entries
            .get(file_id)
            .ok_or_else(|| DriveError::file_not_found(file_id))?;
        Ok(FileOperationResult::Success(OperationPayload::Downloaded {
            file: entry.file.clone(),
        }))
    }

    async fn delete(&self, file_id: &FileId) -> Result<FileOperationResult> {
        let (file_id, entry) = self
            .entries
            .remove(file_id)
            .ok_or_else(|| DriveError::file_not_found(file_id))?;
        self.journal.lock().await.push(PendingChange::now(
            file_id.clone(),
            ChangeKind::Delete,
            entry.file.size,
        ));
        debug!(file = %file_id, stored_at = %entry.stored_at, "deleted file");
        Ok(FileOperationResult::Success(OperationPayload::Deleted {
            file_id,
        }))
    }

    async fn intelligent_sync(&self, config: SyncConfiguration) -> Result<FileOperationResult> {
        let drained = {
            let mut journal = self.journal.lock().await;
            std::mem::take(&mut *journal)
        };
        let plan = journal::plan_sync(drained, config.conflict_strategy);
        let bytes: u64 = plan.applied.iter().map(|c| c.bytes).sum();
        journal::pace(bytes, &config.bandwidth).await;
        if config.bidirectional {
            debug!("bidirectional pass requested; no remote changes to pull");
        }
        let records_synced = plan.applied.len() as u64;
        if !plan.deferred.is_empty() {
            let mut journal = self.journal.lock().await;
            let mut requeued = plan.deferred;
            requeued.append(&mut *journal);
            *journal = requeued;
        }
        info!(
            records_synced,
            conflicts_resolved = plan.conflicts_resolved,
            conflicts_deferred = plan.conflicts_deferred,
            "sync pass complete"
        );
        Ok(FileOperationResult::Success(OperationPayload::Synced {
            records_synced,
            conflicts_resolved: plan.conflicts_resolved,
            conflicts_deferred: plan.conflicts_deferred,
        }))
    }
}
