//! RemoteMetadataService trait

use oracledrive_core::{ConsciousnessSnapshot, ConsciousnessState, MetadataSyncReport, Result};
use tokio::sync::watch;

/// Metadata collaborator consulted by the orchestrator.
#[async_trait::async_trait]
pub trait RemoteMetadataService: Send + Sync {
    /// Bring the service to its active state and return a snapshot of it.
    /// Idempotent; a second call re-reports the current snapshot.
    async fn awaken(&self) -> Result<ConsciousnessSnapshot>;

    /// Push pending metadata records upstream.
    async fn sync_metadata(&self) -> Result<MetadataSyncReport>;

    /// Live state stream. The receiver always holds the latest state; the
    /// orchestrator hands it out untransformed.
    fn state(&self) -> watch::Receiver<ConsciousnessState>;
}
