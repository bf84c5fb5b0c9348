//! Pending-change journal and sync planning
//!
//! Uploads and deletes append change records; an intelligent-sync pass drains
//! the journal, resolving per-file conflicts according to the configured
//! strategy. `ManualResolve` leaves conflicting files queued for a later pass.

use chrono::{DateTime, Utc};
use oracledrive_core::{BandwidthSettings, ConflictStrategy, FileId};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Upload,
    Delete,
}

/// One journaled change awaiting synchronization.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PendingChange {
    pub file_id: FileId,
    pub kind: ChangeKind,
    pub bytes: u64,
    pub at: DateTime<Utc>,
}

impl PendingChange {
    pub fn now(file_id: FileId, kind: ChangeKind, bytes: u64) -> Self {
        Self {
            file_id,
            kind,
            bytes,
            at: Utc::now(),
        }
    }
}

/// Outcome of planning one sync pass over the journal.
#[derive(Debug, Default)]
pub struct SyncPlan {
    /// Changes applied this pass.
    pub applied: Vec<PendingChange>,
    /// Conflicting changes left queued (ManualResolve).
    pub deferred: Vec<PendingChange>,
    pub conflicts_resolved: u64,
    pub conflicts_deferred: u64,
}

/// Partition drained changes into applied and deferred sets.
///
/// Multiple changes against the same file are a conflict. `NewestWins` keeps
/// the latest change; `AiDecide` resolves the same way with the decision
/// logged; `ManualResolve` re-queues the whole conflicting group.
pub fn plan_sync(changes: Vec<PendingChange>, strategy: ConflictStrategy) -> SyncPlan {
    let mut groups: Vec<(FileId, Vec<PendingChange>)> = Vec::new();
    for change in changes {
        match groups.iter_mut().find(|(id, _)| *id == change.file_id) {
            Some((_, group)) => group.push(change),
            None => groups.push((change.file_id.clone(), vec![change])),
        }
    }

    let mut plan = SyncPlan::default();
    for (file_id, mut group) in groups {
        if group.len() == 1 {
            plan.applied.extend(group);
            continue;
        }
        match strategy {
            ConflictStrategy::NewestWins | ConflictStrategy::AiDecide => {
                group.sort_by_key(|c| c.at);
                let Some(winner) = group.pop() else {
                    continue;
                };
                if strategy == ConflictStrategy::AiDecide {
                    debug!(
                        file = %file_id,
                        kept = ?winner.kind,
                        discarded = group.len(),
                        "ai_decide resolved conflict toward newest change"
                    );
                }
                plan.conflicts_resolved += 1;
                plan.applied.push(winner);
            }
            ConflictStrategy::ManualResolve => {
                plan.conflicts_deferred += 1;
                plan.deferred.extend(group);
            }
        }
    }
    plan
}

/// Pace a sync pass against its bandwidth envelope. The sleep is capped at
/// one second per pass.
pub async fn pace(bytes: u64, bandwidth: &BandwidthSettings) {
    let Some(rate) = bandwidth.max_bytes_per_sec else {
        return;
    };
    if rate == 0 || bytes == 0 {
        return;
    }
    let secs = (bytes as f64 / rate as f64).min(1.0);
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    fn change(id: &str, kind: ChangeKind, offset_secs: i64) -> PendingChange {
        PendingChange {
            file_id: id.into(),
            kind,
            bytes: 10,
            at: Utc::now() + chrono::Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn singletons_always_apply() {
        let plan = plan_sync(
            vec![
                change("a", ChangeKind::Upload, 0),
                change("b", ChangeKind::Delete, 1),
            ],
            ConflictStrategy::ManualResolve,
        );
        assert_eq!(plan.applied.len(), 2);
        assert!(plan.deferred.is_empty());
        assert_eq!(plan.conflicts_resolved, 0);
        assert_eq!(plan.conflicts_deferred, 0);
    }

    #[test]
    fn newest_wins_keeps_latest_change() {
        let plan = plan_sync(
            vec![
                change("a", ChangeKind::Upload, 0),
                change("a", ChangeKind::Delete, 5),
            ],
            ConflictStrategy::NewestWins,
        );
        assert_eq!(plan.applied.len(), 1);
        assert_eq!(plan.applied[0].kind, ChangeKind::Delete);
        assert_eq!(plan.conflicts_resolved, 1);
    }

    #[test]
    fn manual_resolve_defers_the_whole_group() {
        let plan = plan_sync(
            vec![
                change("a", ChangeKind::Upload, 0),
                change("a", ChangeKind::Upload, 1),
                change("b", ChangeKind::Upload, 2),
            ],
            ConflictStrategy::ManualResolve,
        );
        assert_eq!(plan.applied.len(), 1);
        assert_eq!(plan.deferred.len(), 2);
        assert_eq!(plan.conflicts_deferred, 1);
    }

    #[test]
    fn ai_decide_resolves_like_newest_wins() {
        let plan = plan_sync(
            vec![
                change("a", ChangeKind::Delete, 3),
                change("a", ChangeKind::Upload, 0),
            ],
            ConflictStrategy::AiDecide,
        );
        assert_eq!(plan.applied.len(), 1);
        assert_eq!(plan.applied[0].kind, ChangeKind::Delete);
        assert_eq!(plan.conflicts_resolved, 1);
    }

    #[tokio::test]
    async fn pace_is_a_noop_without_a_rate() {
        // Must return promptly; the test itself is the assertion.
        pace(1_000_000, &BandwidthSettings::default()).await;
    }
}
