//! OracleDrive metadata services
//!
//! The metadata collaborator owns the drive's consciousness state: it is
//! awakened once at initialization, synchronizes metadata records on demand,
//! and publishes live state over a watch channel.

pub mod local;
pub mod remote;
pub mod service;

pub use local::LocalMetadataService;
pub use remote::HttpMetadataService;
pub use service::RemoteMetadataService;
