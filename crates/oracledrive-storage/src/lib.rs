//! OracleDrive storage providers
//!
//! The `StorageProvider` trait is the provider seam the orchestrator delegates
//! to. Two implementations ship here: an in-process store for tests and demos,
//! and a JSON-indexed on-disk store used by the CLI.

pub mod disk;
pub mod journal;
pub mod memory;
pub mod optimize;
pub mod provider;

pub use disk::DiskStorageProvider;
pub use journal::{ChangeKind, PendingChange};
pub use memory::MemoryStorageProvider;
pub use provider::StorageProvider;
