//! Tests for oracledrive-core: identifiers, value objects, operation unions

use oracledrive_core::*;

// ===========================================================================
// FileId / UserId
// ===========================================================================

#[test]
fn file_id_new_and_display() {
    let id = FileId::new("f-123");
    assert_eq!(id.as_str(), "f-123");
    assert_eq!(format!("{}", id), "f-123");
}

#[test]
fn file_id_clone_is_cheap() {
    let id = FileId::new("f-1");
    let cloned = id.clone();
    assert_eq!(id, cloned);
}

#[test]
fn user_id_from_string() {
    let id: UserId = "u-1".into();
    assert_eq!(id.as_str(), "u-1");
    let id2: UserId = String::from("u-2").into();
    assert_eq!(id2.as_str(), "u-2");
}

#[test]
fn ids_serialize_as_plain_strings() {
    let id = FileId::new("f-9");
    assert_eq!(serde_json::to_string(&id).unwrap(), r#""f-9""#);
    let back: FileId = serde_json::from_str(r#""f-9""#).unwrap();
    assert_eq!(back, id);
}

#[test]
fn ids_hash_by_value() {
    use std::collections::HashSet;
    let a = UserId::new("same");
    let b = UserId::new("same");
    let mut set = HashSet::new();
    set.insert(a);
    assert!(set.contains(&b));
}

// ===========================================================================
// DriveFile
// ===========================================================================

#[test]
fn drive_file_new_derives_size() {
    let file = DriveFile::new("f-1", "notes.txt", &b"hello"[..], "text/plain");
    assert_eq!(file.size, 5);
    assert_eq!(file.encoding, ContentEncoding::Identity);
}

#[test]
fn drive_file_from_parts_accepts_matching_size() {
    let file = DriveFile::from_parts(
        "f-1",
        "notes.txt",
        &b"hello"[..],
        5,
        "text/plain",
        ContentEncoding::Identity,
    )
    .unwrap();
    assert_eq!(file.name, "notes.txt");
}

#[test]
fn drive_file_from_parts_rejects_size_mismatch() {
    let err = DriveFile::from_parts(
        "f-1",
        "notes.txt",
        &b"hello"[..],
        99,
        "text/plain",
        ContentEncoding::Identity,
    )
    .unwrap_err();
    assert!(matches!(err, DriveError::InvalidFile(_)));
}

#[test]
fn drive_file_serde_roundtrip() {
    let file = DriveFile::new("f-1", "a.json", &br#"{"k":1}"#[..], "application/json");
    let json = serde_json::to_string(&file).unwrap();
    let back: DriveFile = serde_json::from_str(&json).unwrap();
    assert_eq!(back, file);
}

// ===========================================================================
// AccessLevel / FileMetadata
// ===========================================================================

#[test]
fn access_level_rank_is_monotonic() {
    assert!(AccessLevel::Public.rank() < AccessLevel::Private.rank());
    assert!(AccessLevel::Private.rank() < AccessLevel::Restricted.rank());
    assert!(AccessLevel::Restricted.rank() < AccessLevel::Classified.rank());
}

#[test]
fn access_level_serializes_lowercase() {
    assert_eq!(
        serde_json::to_string(&AccessLevel::Classified).unwrap(),
        r#""classified""#
    );
}

#[test]
fn file_metadata_builder() {
    let meta = FileMetadata::new("u-1", AccessLevel::Private)
        .with_tags(vec!["work".into()])
        .encrypted();
    assert_eq!(meta.owner.as_str(), "u-1");
    assert!(meta.encrypted);
    assert_eq!(meta.tags, vec!["work".to_string()]);
}

// ===========================================================================
// SyncConfiguration
// ===========================================================================

#[test]
fn sync_configuration_defaults() {
    let cfg = SyncConfiguration::default();
    assert!(!cfg.bidirectional);
    assert_eq!(cfg.conflict_strategy, ConflictStrategy::NewestWins);
    assert_eq!(cfg.bandwidth.priority, SyncPriority::Normal);
    assert!(cfg.bandwidth.max_bytes_per_sec.is_none());
}

#[test]
fn conflict_strategy_serde_roundtrip() {
    for strategy in [
        ConflictStrategy::NewestWins,
        ConflictStrategy::ManualResolve,
        ConflictStrategy::AiDecide,
    ] {
        let json = serde_json::to_string(&strategy).unwrap();
        let back: ConflictStrategy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, strategy);
    }
}

#[test]
fn sync_configuration_deserializes_from_partial_json() {
    let cfg: SyncConfiguration =
        serde_json::from_str(r#"{"conflict_strategy":"ai_decide"}"#).unwrap();
    assert_eq!(cfg.conflict_strategy, ConflictStrategy::AiDecide);
    assert!(!cfg.bidirectional);
}

// ===========================================================================
// Operation unions
// ===========================================================================

#[test]
fn request_names() {
    let req = FileOperationRequest::Sync {
        config: SyncConfiguration::default(),
    };
    assert_eq!(req.name(), "sync");
    let req = FileOperationRequest::Download {
        file_id: "f-1".into(),
        user_id: "u-1".into(),
    };
    assert_eq!(req.name(), "download");
}

#[test]
fn initialization_result_is_success() {
    let ok = InitializationResult::Success {
        consciousness: ConsciousnessSnapshot {
            awake: true,
            level: 10,
            active_agents: vec![],
        },
        optimization: StorageOptimization {
            compression_ratio: 1.0,
            space_saved_bytes: 0,
            tiering_enabled: false,
        },
    };
    assert!(ok.is_success());
    let failed = InitializationResult::SecurityFailure {
        reason: "lockdown".into(),
    };
    assert!(!failed.is_success());
}

#[test]
fn file_operation_result_serde_roundtrip() {
    let result = FileOperationResult::Success(OperationPayload::Synced {
        records_synced: 3,
        conflicts_resolved: 1,
        conflicts_deferred: 0,
    });
    let json = serde_json::to_string(&result).unwrap();
    let back: FileOperationResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}
