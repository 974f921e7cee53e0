//! Daemon entry point for the rent roll MCP server.
//!
//! Loads configuration from the environment, opens the `SQLite` store, runs an
//! optional JSONL bulk load, and serves MCP over stdio and/or streamable HTTP.

mod config;
mod shutdown;

use rentroll_core::control::RentRollControlPlane;
use rentroll_core::store::{SqliteRentRollStore, StoreResult};
use rentroll_mcp::server::{self, HttpTransportConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{DbLocation, RentRollConfig};
use crate::shutdown::ShutdownSignal;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = RentRollConfig::from_args()?;
    init_tracing(&config.log_filter);

    let store = open_store(&config.db)?;
    let control = RentRollControlPlane::new(store.clone());
    let outcome = run(control, &config).await;

    if let Err(err) = store.close() {
        warn!(error = %err, "failed to close rent roll database");
    }
    outcome
}

async fn run(control: RentRollControlPlane, config: &RentRollConfig) -> Result<(), BoxError> {
    if let Some(path) = &config.load_jsonl {
        control.ingest_jsonl_file(path).await?;
    }

    if !config.serves_mcp() {
        info!("no MCP transport enabled; exiting after load");
        return Ok(());
    }

    let shutdown = ShutdownSignal::install()?;
    tokio::select! {
        result = serve(control, config) => result,
        signal = shutdown.recv() => {
            let signal = signal?;
            info!(signal, "shutdown signal received");
            Ok(())
        }
    }
}

async fn serve(control: RentRollControlPlane, config: &RentRollConfig) -> Result<(), BoxError> {
    let http_config = HttpTransportConfig::new(config.mcp_http_addr, config.mcp_sessions);
    match (config.enable_stdio, config.mcp_serve) {
        (true, true) => {
            tokio::try_join!(
                server::serve_stdio(control.clone()),
                server::serve_streamable_http(control, http_config),
            )?;
            Ok(())
        }
        (true, false) => server::serve_stdio(control).await,
        (false, _) => server::serve_streamable_http(control, http_config).await,
    }
}

fn open_store(location: &DbLocation) -> StoreResult<SqliteRentRollStore> {
    match location {
        DbLocation::File(path) => SqliteRentRollStore::open(path),
        DbLocation::InMemory => {
            info!("using in-memory rent roll database");
            SqliteRentRollStore::open_in_memory()
        }
    }
}

/// Logs go to stderr; stdout carries the stdio transport.
fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
