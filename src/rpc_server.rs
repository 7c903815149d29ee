//! Block History RPC Server: newline-delimited JSON over stdin/stdout.
//!
//! See [`block_history::rpc_transport`] for the line protocol. Logs go to
//! stderr so stdout carries protocol lines only.

use std::sync::Arc;

use tokio::io::{self, BufReader};

use block_history::app::App;
use block_history::config::{self, ScrubConfig};
use block_history::database::Database;
use block_history::logging;
use block_history::managers::history_manager::HistoryManager;
use block_history::managers::storage_manager::StorageManager;
use block_history::rpc_transport;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_stderr();

    let data_dir = config::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let db = Arc::new(Database::open(config::database_path())?);
    let history = Arc::new(HistoryManager::new(db.clone()));
    let storage = Arc::new(StorageManager::new(db));
    let app = Arc::new(App::new(history, storage, ScrubConfig::from_env()));
    tracing::info!(data_dir = %data_dir.display(), "Block History RPC server starting");

    app.settings.on_startup().await;
    let _monitor = app.spawn_live_monitor();

    rpc_transport::serve(app, BufReader::new(io::stdin()), io::stdout()).await?;

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
