//! OracleDrive orchestration façade

pub mod orchestrator;

pub use orchestrator::DriveOrchestrator;
