//! HTTP metadata client
//!
//! Talks JSON to a remote drive metadata endpoint. The live state stream is
//! fed by a background poll task; transport failures surface as
//! `DriveError::Transport`, non-success statuses as `DriveError::Metadata`.

use crate::service::RemoteMetadataService;
use oracledrive_core::{
    ConsciousnessSnapshot, ConsciousnessState, DriveError, MetadataSyncReport, Result,
};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct HttpMetadataService {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    state_tx: watch::Sender<ConsciousnessState>,
}

#[derive(Debug, Deserialize)]
struct AwakenResponse {
    awake: bool,
    level: u8,
    #[serde(default)]
    active_agents: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SyncResponse {
    success: bool,
    records_updated: u64,
    #[serde(default)]
    errors: Vec<String>,
}

impl HttpMetadataService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let (state_tx, _) = watch::channel(ConsciousnessState::default());
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: None,
            state_tx,
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn fetch_state(&self) -> Result<ConsciousnessState> {
        let response = self
            .request(reqwest::Method::GET, "/v1/drive/state")
            .send()
            .await
            .map_err(|e| DriveError::transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DriveError::metadata(format!("state poll failed: {status}")));
        }
        response
            .json()
            .await
            .map_err(|e| DriveError::transport(e.to_string()))
    }

    /// Poll the remote state endpoint on an interval, feeding the watch
    /// channel until every receiver is gone.
    pub fn spawn_state_poll(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                match self.fetch_state().await {
                    Ok(state) => {
                        if self.state_tx.send(state).is_err() {
                            debug!("all state receivers dropped, stopping poll");
                            return;
                        }
                    }
                    Err(e) => warn!("state poll failed: {e}"),
                }
            }
        })
    }
}

#[async_trait::async_trait]
impl RemoteMetadataService for HttpMetadataService {
    async fn awaken(&self) -> Result<ConsciousnessSnapshot> {
        let response = self
            .request(reqwest::Method::POST, "/v1/drive/awaken")
            .send()
            .await
            .map_err(|e| DriveError::transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::metadata(format!("awaken failed: {status} {body}")));
        }
        let awaken: AwakenResponse = response
            .json()
            .await
            .map_err(|e| DriveError::transport(e.to_string()))?;
        debug!(level = awaken.level, "remote metadata service awakened");
        Ok(ConsciousnessSnapshot {
            awake: awaken.awake,
            level: awaken.level,
            active_agents: awaken.active_agents,
        })
    }

    async fn sync_metadata(&self) -> Result<MetadataSyncReport> {
        let response = self
            .request(reqwest::Method::POST, "/v1/drive/metadata/sync")
            .send()
            .await
            .map_err(|e| DriveError::transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::metadata(format!("sync failed: {status} {body}")));
        }
        let sync: SyncResponse = response
            .json()
            .await
            .map_err(|e| DriveError::transport(e.to_string()))?;
        Ok(MetadataSyncReport {
            success: sync.success,
            records_updated: sync.records_updated,
            errors: sync.errors,
        })
    }

    fn state(&self) -> watch::Receiver<ConsciousnessState> {
        self.state_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let s = HttpMetadataService::new("https://drive.example.com/");
        assert_eq!(s.base_url, "https://drive.example.com");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        // Port 1 on loopback refuses connections.
        let s = HttpMetadataService::new("http://127.0.0.1:1");
        let err = s.awaken().await.unwrap_err();
        assert!(matches!(err, DriveError::Transport(_)));
    }

    #[test]
    fn initial_state_is_inactive() {
        let s = HttpMetadataService::new("http://localhost:9");
        assert!(!s.state().borrow().active);
    }
}
