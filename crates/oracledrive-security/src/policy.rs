//! Rule-based security validator
//!
//! Deny rules (extensions, name patterns, size cap, executable magic bytes)
//! gate uploads; an ownership/grant registry gates reads and deletions. The
//! registry is fed by the host application - the validator only reads it.

use crate::validator::{
    DeletionCheck, DriveAccessCheck, FileAccessCheck, SecurityValidator, UploadCheck,
};
use dashmap::DashMap;
use oracledrive_core::{
    AccessLevel, ContentEncoding, DriveError, DriveFile, FileId, Result, SecurityConfig, UserId,
};
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Per-file ownership, sensitivity, and explicit read grants.
#[derive(Debug, Clone)]
struct FileAcl {
    owner: UserId,
    access_level: AccessLevel,
    grants: HashSet<UserId>,
}

/// Registry of file ACLs, shared between the validator and the host.
#[derive(Debug, Default)]
pub struct AccessRegistry {
    files: DashMap<FileId, FileAcl>,
}

impl AccessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file's owner and access level. Replaces any previous entry.
    pub fn register(&self, file_id: FileId, owner: UserId, access_level: AccessLevel) {
        self.files.insert(
            file_id,
            FileAcl {
                owner,
                access_level,
                grants: HashSet::new(),
            },
        );
    }

    /// Grant `user` read access to `file_id`. No-op for unknown files.
    pub fn grant(&self, file_id: &FileId, user: UserId) {
        if let Some(mut acl) = self.files.get_mut(file_id) {
            acl.grants.insert(user);
        }
    }

    /// Drop a file's entry, e.g. after deletion.
    pub fn forget(&self, file_id: &FileId) {
        self.files.remove(file_id);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn get(&self, file_id: &FileId) -> Option<FileAcl> {
        self.files.get(file_id).map(|acl| acl.clone())
    }
}

/// Magic prefixes of executable formats refused at upload.
const EXECUTABLE_MAGIC: &[(&[u8], &str)] = &[(b"MZ", "PE executable"), (b"\x7fELF", "ELF binary")];

#[derive(Debug)]
pub struct PolicySecurityValidator {
    config: SecurityConfig,
    name_patterns: Vec<Regex>,
    registry: Arc<AccessRegistry>,
}

impl PolicySecurityValidator {
    /// Compile the configured name patterns up front; a malformed pattern is
    /// a configuration error, not a runtime denial.
    pub fn new(config: SecurityConfig, registry: Arc<AccessRegistry>) -> Result<Self> {
        let name_patterns = config
            .blocked_name_patterns
            .iter()
            .map(|p| Regex::new(p).map_err(|e| DriveError::config(format!("bad pattern {p:?}: {e}"))))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            config,
            name_patterns,
            registry,
        })
    }

    pub fn registry(&self) -> &Arc<AccessRegistry> {
        &self.registry
    }

    fn extension_of(name: &str) -> Option<String> {
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    fn scan(&self, file: &DriveFile) -> Option<String> {
        for pattern in &self.name_patterns {
            if pattern.is_match(&file.name) {
                return Some(format!("file name {:?} matches blocked pattern", file.name));
            }
        }
        if let Some(ext) = Self::extension_of(&file.name) {
            if self.config.blocked_extensions.iter().any(|b| b.eq_ignore_ascii_case(&ext)) {
                return Some(format!("blocked file extension .{ext}"));
            }
        }
        if file.size > self.config.max_upload_bytes {
            return Some(format!(
                "file size {} exceeds upload limit {}",
                file.size, self.config.max_upload_bytes
            ));
        }
        // Magic bytes are only meaningful on identity-encoded content.
        if file.encoding == ContentEncoding::Identity {
            for (magic, kind) in EXECUTABLE_MAGIC {
                if file.content.starts_with(magic) {
                    return Some(format!("content carries {kind} signature"));
                }
            }
        }
        None
    }

    fn has_clearance(&self, user: &UserId) -> bool {
        self.config
            .classified_clearances
            .iter()
            .any(|c| c == user.as_str())
    }
}

#[async_trait::async_trait]
impl SecurityValidator for PolicySecurityValidator {
    async fn validate_drive_access(&self) -> Result<DriveAccessCheck> {
        if self.config.lockdown {
            return Ok(DriveAccessCheck::Invalid {
                reason: "drive is in lockdown".to_string(),
            });
        }
        Ok(DriveAccessCheck::Valid)
    }

    async fn validate_file_upload(&self, file: &DriveFile) -> Result<UploadCheck> {
        if let Some(description) = self.scan(file) {
            debug!(file = %file.id, threat = %description, "upload refused");
            return Ok(UploadCheck::Threat { description });
        }
        Ok(UploadCheck::Secure)
    }

    async fn validate_file_access(
        &self,
        file_id: &FileId,
        user_id: &UserId,
    ) -> Result<FileAccessCheck> {
        let Some(acl) = self.registry.get(file_id) else {
            return Ok(FileAccessCheck::Denied {
                reason: format!("unknown file {file_id}"),
            });
        };
        if acl.owner == *user_id {
            return Ok(FileAccessCheck::Granted);
        }
        let granted = match acl.access_level {
            AccessLevel::Public => true,
            AccessLevel::Private | AccessLevel::Restricted => acl.grants.contains(user_id),
            AccessLevel::Classified => self.has_clearance(user_id),
        };
        if granted {
            Ok(FileAccessCheck::Granted)
        } else {
            Ok(FileAccessCheck::Denied {
                reason: format!("user {user_id} lacks {} access to {file_id}", acl.access_level),
            })
        }
    }

    async fn validate_deletion(&self, file_id: &FileId, user_id: &UserId) -> Result<DeletionCheck> {
        let Some(acl) = self.registry.get(file_id) else {
            return Ok(DeletionCheck::Unauthorized {
                reason: format!("unknown file {file_id}"),
            });
        };
        if acl.owner == *user_id {
            Ok(DeletionCheck::Authorized)
        } else {
            Ok(DeletionCheck::Unauthorized {
                reason: format!("user {user_id} does not own {file_id}"),
            })
        }
    }
}
