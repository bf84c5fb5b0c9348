//! OracleDrive CLI - drive status, file operations, and metadata sync

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use oracledrive_core::{
    AccessLevel, BandwidthSettings, ConflictStrategy, DriveConfig, DriveFile,
    FileOperationRequest, FileOperationResult, InitializationResult, OperationPayload,
    SyncConfiguration,
};
use oracledrive_manager::DriveOrchestrator;
use oracledrive_metadata::{HttpMetadataService, LocalMetadataService, RemoteMetadataService};
use oracledrive_security::{AccessRegistry, PolicySecurityValidator, SecurityValidator};
use oracledrive_storage::{optimize, DiskStorageProvider, StorageProvider};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "oracledrive", about = "OracleDrive - secure cloud file orchestration")]
struct Cli {
    /// Path to a TOML config file; a missing file falls back to defaults
    #[arg(long, default_value = "oracledrive.toml")]
    config: PathBuf,

    /// Directory holding the on-disk store
    #[arg(long, default_value = ".oracledrive")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the drive and print the startup report
    Status,
    /// Upload a local file into the drive
    Upload {
        /// File to upload
        path: PathBuf,
        /// Owning user id
        #[arg(long)]
        owner: String,
        /// Access level attached to the file
        #[arg(long, value_enum, default_value_t = AccessArg::Private)]
        access: AccessArg,
        /// Tags to attach (repeatable)
        #[arg(long)]
        tag: Vec<String>,
    },
    /// Download a file by id
    Download {
        /// File id to fetch
        file_id: String,
        /// Requesting user id
        #[arg(long)]
        user: String,
        /// Output path; defaults to the stored file name
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Delete a file by id
    Delete {
        /// File id to delete
        file_id: String,
        /// Requesting user id
        #[arg(long)]
        user: String,
    },
    /// Run an intelligent-sync pass over pending changes
    Sync {
        /// Sync both directions
        #[arg(long, default_value_t = false)]
        bidirectional: bool,
        /// Conflict resolution strategy
        #[arg(long, value_enum, default_value_t = ConflictArg::NewestWins)]
        conflicts: ConflictArg,
        /// Bandwidth cap in bytes per second
        #[arg(long)]
        max_bytes_per_sec: Option<u64>,
    },
    /// Synchronize metadata records with the metadata service
    SyncMetadata,
    /// Follow the metadata service's live state stream
    Watch,
}

#[derive(Clone, Copy, ValueEnum)]
enum AccessArg {
    Public,
    Private,
    Restricted,
    Classified,
}

impl From<AccessArg> for AccessLevel {
    fn from(value: AccessArg) -> Self {
        match value {
            AccessArg::Public => AccessLevel::Public,
            AccessArg::Private => AccessLevel::Private,
            AccessArg::Restricted => AccessLevel::Restricted,
            AccessArg::Classified => AccessLevel::Classified,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ConflictArg {
    NewestWins,
    ManualResolve,
    AiDecide,
}

impl From<ConflictArg> for ConflictStrategy {
    fn from(value: ConflictArg) -> Self {
        match value {
            ConflictArg::NewestWins => ConflictStrategy::NewestWins,
            ConflictArg::ManualResolve => ConflictStrategy::ManualResolve,
            ConflictArg::AiDecide => ConflictStrategy::AiDecide,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oracledrive=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = DriveConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    let drive = build_drive(&config, &cli.root).await?;

    match cli.command {
        Commands::Status => {
            match drive.orchestrator.initialize().await? {
                InitializationResult::Success {
                    consciousness,
                    optimization,
                } => {
                    println!("drive: online");
                    println!(
                        "consciousness: level {} ({} agents)",
                        consciousness.level,
                        consciousness.active_agents.len()
                    );
                    println!(
                        "storage: ratio {:.2}, {} bytes saved, tiering {}",
                        optimization.compression_ratio,
                        optimization.space_saved_bytes,
                        if optimization.tiering_enabled { "on" } else { "off" }
                    );
                }
                InitializationResult::SecurityFailure { reason } => {
                    println!("drive: locked ({reason})");
                }
                InitializationResult::Error(cause) => {
                    println!("drive: degraded ({cause})");
                }
            }
            let state = drive.orchestrator.state();
            let state = state.borrow();
            println!(
                "state: {} ({} operations in flight)",
                if state.active { "active" } else { "idle" },
                state.current_operations.len()
            );
        }

        Commands::Upload {
            path,
            owner,
            access,
            tag,
        } => {
            let file = read_local_file(&path).await?;
            let file_id = file.id.clone();
            let metadata = oracledrive_core::FileMetadata::new(owner.as_str(), access.into())
                .with_tags(tag);
            let result = drive
                .orchestrator
                .dispatch(FileOperationRequest::Upload {
                    file,
                    metadata: metadata.clone(),
                })
                .await?;
            if matches!(result, FileOperationResult::Success(_)) {
                drive
                    .registry
                    .register(file_id, metadata.owner, metadata.access_level);
            }
            print_result(&result)?;
        }

        Commands::Download { file_id, user, out } => {
            let result = drive
                .orchestrator
                .dispatch(FileOperationRequest::Download {
                    file_id: file_id.as_str().into(),
                    user_id: user.as_str().into(),
                })
                .await?;
            match result {
                FileOperationResult::Success(OperationPayload::Downloaded { file }) => {
                    let file = optimize::decode(file)?;
                    let target = out.unwrap_or_else(|| PathBuf::from(&file.name));
                    tokio::fs::write(&target, &file.content)
                        .await
                        .with_context(|| format!("writing {}", target.display()))?;
                    info!(file = %file.id, bytes = file.size, "downloaded");
                    println!("wrote {} ({} bytes)", target.display(), file.size);
                }
                other => print_result(&other)?,
            }
        }

        Commands::Delete { file_id, user } => {
            let result = drive
                .orchestrator
                .dispatch(FileOperationRequest::Delete {
                    file_id: file_id.as_str().into(),
                    user_id: user.as_str().into(),
                })
                .await?;
            if let FileOperationResult::Success(OperationPayload::Deleted { file_id }) = &result {
                drive.registry.forget(file_id);
            }
            print_result(&result)?;
        }

        Commands::Sync {
            bidirectional,
            conflicts,
            max_bytes_per_sec,
        } => {
            let result = drive
                .orchestrator
                .dispatch(FileOperationRequest::Sync {
                    config: SyncConfiguration {
                        bidirectional,
                        conflict_strategy: conflicts.into(),
                        bandwidth: BandwidthSettings {
                            max_bytes_per_sec,
                            ..BandwidthSettings::default()
                        },
                    },
                })
                .await?;
            print_result(&result)?;
        }

        Commands::SyncMetadata => {
            let report = drive.orchestrator.sync_metadata().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Watch => {
            let mut rx = drive.orchestrator.state();
            println!("{}", serde_json::to_string(&*rx.borrow())?);
            while rx.changed().await.is_ok() {
                println!("{}", serde_json::to_string(&*rx.borrow())?);
            }
        }
    }

    Ok(())
}

struct Drive {
    orchestrator: DriveOrchestrator,
    registry: Arc<AccessRegistry>,
}

/// Wire the on-disk provider, the policy validator, and a metadata service
/// (HTTP when an endpoint is configured, in-process otherwise).
async fn build_drive(config: &DriveConfig, root: &Path) -> anyhow::Result<Drive> {
    let storage = Arc::new(DiskStorageProvider::open(root, config.storage.clone()).await?);

    let registry = Arc::new(AccessRegistry::new());
    for (file_id, metadata) in storage.registered_files().await {
        registry.register(file_id, metadata.owner, metadata.access_level);
    }

    let security = Arc::new(PolicySecurityValidator::new(
        config.security.clone(),
        registry.clone(),
    )?);

    let metadata: Arc<dyn RemoteMetadataService> = match &config.metadata.endpoint {
        Some(endpoint) => {
            let mut service = HttpMetadataService::new(endpoint.clone());
            if let Some(token) = &config.metadata.api_token {
                service = service.with_api_token(token.clone());
            }
            let service = Arc::new(service);
            service.clone().spawn_state_poll(Duration::from_millis(
                config.metadata.state_poll_interval_ms,
            ));
            service
        }
        None => Arc::new(LocalMetadataService::new(config.metadata.clone())),
    };

    Ok(Drive {
        orchestrator: DriveOrchestrator::new(
            security as Arc<dyn SecurityValidator>,
            storage as Arc<dyn StorageProvider>,
            metadata,
        ),
        registry,
    })
}

async fn read_local_file(path: &Path) -> anyhow::Result<DriveFile> {
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .with_context(|| format!("{} has no usable file name", path.display()))?;
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();
    let id = uuid::Uuid::new_v4().to_string();
    Ok(DriveFile::new(id, name, content, mime_type))
}

fn print_result(result: &FileOperationResult) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}
