use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::args::{ContainerBackend, OrchestratorArgs, StorageBackend};
use crate::config::resolve_public_url;
use crate::container::{ContainerManager, InMemoryContainerManager, ProcessContainerManager};
use crate::error::AppResult;
use crate::orchestrator::{Orchestrator, bind, serve};
use crate::shutdown::{setup_signal_shutdown_handler, shutdown_channel};
use crate::storage::{MemoryStorage, SqliteStorage, StorageManager};

pub(crate) async fn run_orchestrator(args: OrchestratorArgs) -> AppResult<()> {
    let public_url = resolve_public_url(&args)?;
    let storage = build_storage(&args).await?;
    let containers = build_containers(&args)?;
    let orchestrator = Arc::new(Orchestrator::new(
        containers,
        storage,
        args.max_per_container,
        public_url.clone(),
    ));

    let listener = bind(&args.listen).await?;
    info!(
        "Runners call back on {} (at most {} workers each).",
        public_url,
        args.max_per_container.get()
    );

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let signals = setup_signal_shutdown_handler(&shutdown_tx);
    serve(listener, orchestrator, shutdown_rx).await;
    drop(shutdown_tx.send(()));
    signals.await?;
    Ok(())
}

async fn build_storage(args: &OrchestratorArgs) -> AppResult<Arc<dyn StorageManager>> {
    match args.storage {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; jobs are lost on exit.");
            Ok(Arc::new(MemoryStorage::new()))
        }
        StorageBackend::Sqlite => {
            let path = Path::new(&args.sqlite_path);
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            info!("Storing jobs in {}", path.display());
            Ok(Arc::new(SqliteStorage::open(path).await?))
        }
    }
}

fn build_containers(args: &OrchestratorArgs) -> AppResult<Arc<dyn ContainerManager>> {
    match args.container {
        ContainerBackend::Process => {
            let program = args
                .runner_binary
                .clone()
                .map_or_else(std::env::current_exe, Ok)?;
            info!(
                "Starting runners with {}, logs in {}",
                program.display(),
                args.log_dir
            );
            Ok(Arc::new(ProcessContainerManager::new(
                program,
                PathBuf::from(&args.log_dir),
            )))
        }
        ContainerBackend::None => {
            warn!("Container backend 'none': runners must be started out of band.");
            Ok(Arc::new(InMemoryContainerManager::new()))
        }
    }
}
