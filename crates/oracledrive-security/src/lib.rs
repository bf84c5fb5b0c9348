//! OracleDrive security validation - gate checks for drive and file operations

pub mod policy;
pub mod validator;

pub use policy::{AccessRegistry, PolicySecurityValidator};
pub use validator::{
    DeletionCheck, DriveAccessCheck, FileAccessCheck, SecurityValidator, UploadCheck,
};
