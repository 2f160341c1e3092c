use crate::api::{self, AppState};
use crate::config::{Settings, StorageBackend};
use crate::error::Result;
use crate::storage::{FileStorage, MemoryStorage, Repository};
use tracing::{info, warn};

/// Start the HTTP server with the configured storage backend
///
/// Blocks until the server stops.
pub fn handle_serve(mut settings: Settings, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }
    let addr = settings.socket_addr()?;

    let runtime = tokio::runtime::Runtime::new()?;
    match settings.storage.backend {
        StorageBackend::File => {
            let storage = FileStorage::open(&settings.storage.data_dir)?;
            info!("Using file storage at {}", storage.root().display());
            runtime.block_on(api::serve(state(storage, &settings)?, addr))
        },
        StorageBackend::Memory => {
            warn!("Using in-memory storage; tickets are lost on exit");
            runtime.block_on(api::serve(state(MemoryStorage::new(), &settings)?, addr))
        },
    }
}

fn state<R: Repository + 'static>(repo: R, settings: &Settings) -> Result<AppState<R>> {
    info!(
        "Lifecycle policy: {:?}, attachments under {}",
        settings.tickets.lifecycle,
        settings.attachments.root.display()
    );
    api::app_state(repo, settings)
}
