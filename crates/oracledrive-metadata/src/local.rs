//! In-process metadata service
//!
//! Holds the consciousness state locally and publishes every transition over
//! the watch channel. Hosts queue metadata records; `sync_metadata` drains
//! them.

use crate::service::RemoteMetadataService;
use oracledrive_core::{
    ConsciousnessSnapshot, ConsciousnessState, MetadataConfig, MetadataSyncReport, Result,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

/// One metadata record awaiting upstream sync.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataRecord {
    pub key: String,
    pub value: String,
}

pub struct LocalMetadataService {
    agents: Vec<String>,
    awake: AtomicBool,
    records_synced_total: AtomicU64,
    pending: Mutex<Vec<MetadataRecord>>,
    state_tx: watch::Sender<ConsciousnessState>,
}

impl LocalMetadataService {
    pub fn new(config: MetadataConfig) -> Self {
        let (state_tx, _) = watch::channel(ConsciousnessState::default());
        Self {
            agents: config.agents,
            awake: AtomicBool::new(false),
            records_synced_total: AtomicU64::new(0),
            pending: Mutex::new(Vec::new()),
            state_tx,
        }
    }

    /// Queue a record for the next `sync_metadata` pass.
    pub async fn queue_record(&self, key: impl Into<String>, value: impl Into<String>) {
        self.pending.lock().await.push(MetadataRecord {
            key: key.into(),
            value: value.into(),
        });
    }

    pub async fn pending_records(&self) -> usize {
        self.pending.lock().await.len()
    }

    fn level(&self) -> u8 {
        if !self.awake.load(Ordering::Relaxed) {
            return 0;
        }
        (50 + 10 * self.agents.len()).min(100) as u8
    }

    fn publish(&self, current_operations: Vec<String>, pending: usize) {
        let mut metrics = std::collections::HashMap::new();
        metrics.insert("level".to_string(), f64::from(self.level()));
        metrics.insert("pending_records".to_string(), pending as f64);
        metrics.insert(
            "records_synced_total".to_string(),
            self.records_synced_total.load(Ordering::Relaxed) as f64,
        );
        // Receivers may all be gone; publishing is best-effort.
        let _ = self.state_tx.send(ConsciousnessState {
            active: self.awake.load(Ordering::Relaxed),
            current_operations,
            metrics,
        });
    }
}

#[async_trait::async_trait]
impl RemoteMetadataService for LocalMetadataService {
    async fn awaken(&self) -> Result<ConsciousnessSnapshot> {
        let first = !self.awake.swap(true, Ordering::SeqCst);
        if first {
            info!(agents = self.agents.len(), "metadata service awakened");
        } else {
            debug!("awaken called on an already-awake service");
        }
        let pending = self.pending_records().await;
        self.publish(Vec::new(), pending);
        Ok(ConsciousnessSnapshot {
            awake: true,
            level: self.level(),
            active_agents: self.agents.clone(),
        })
    }

    async fn sync_metadata(&self) -> Result<MetadataSyncReport> {
        let drained = {
            let mut pending = self.pending.lock().await;
            std::mem::take(&mut *pending)
        };
        self.publish(vec!["sync_metadata".to_string()], drained.len());

        let mut errors = Vec::new();
        let mut updated = 0u64;
        for record in drained {
            if record.key.is_empty() {
                errors.push("record with empty key skipped".to_string());
            } else {
                updated += 1;
            }
        }
        self.records_synced_total.fetch_add(updated, Ordering::Relaxed);
        self.publish(Vec::new(), 0);
        debug!(updated, errors = errors.len(), "metadata sync pass complete");
        Ok(MetadataSyncReport {
            success: errors.is_empty(),
            records_updated: updated,
            errors,
        })
    }

    fn state(&self) -> watch::Receiver<ConsciousnessState> {
        self.state_tx.subscribe()
    }
}
