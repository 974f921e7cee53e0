//! Transport runners: stdio for a single local client, streamable HTTP for
//! remote ones.
//!
//! The HTTP router exposes the MCP service at `/mcp` and a store-backed
//! liveness check at `/health`.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use rentroll_core::control::RentRollControlPlane;
use rmcp::serve_server;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::RentRollMcp;

pub type ServeError = Box<dyn Error + Send + Sync>;

const SSE_KEEP_ALIVE: Duration = Duration::from_secs(15);

/// Whether HTTP clients get a session that survives between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    #[default]
    Stateful,
    Stateless,
}

/// Bind address and session handling for the streamable HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTransportConfig {
    pub addr: SocketAddr,
    pub sessions: SessionMode,
}

impl HttpTransportConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr, sessions: SessionMode) -> Self {
        Self { addr, sessions }
    }

    fn streamable(&self) -> StreamableHttpServerConfig {
        StreamableHttpServerConfig {
            sse_keep_alive: Some(SSE_KEEP_ALIVE),
            stateful_mode: self.sessions == SessionMode::Stateful,
            ..Default::default()
        }
    }
}

/// Serves one client over stdin/stdout until it disconnects.
///
/// # Errors
/// Returns any transport or server error.
pub async fn serve_stdio(control: RentRollControlPlane) -> Result<(), ServeError> {
    info!("serving MCP over stdio");
    let running = serve_server(RentRollMcp::new(control), stdio()).await?;
    let reason = running.waiting().await?;
    info!(?reason, "stdio transport closed");
    Ok(())
}

/// Binds `config.addr` and serves the HTTP router until the listener fails.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server stops.
pub async fn serve_streamable_http(
    control: RentRollControlPlane,
    config: HttpTransportConfig,
) -> Result<(), ServeError> {
    let listener = TcpListener::bind(config.addr).await?;
    info!(
        addr = %listener.local_addr()?,
        sessions = ?config.sessions,
        "serving MCP over streamable HTTP"
    );
    axum::serve(listener, router(control, &config)).await?;
    Ok(())
}

fn router(control: RentRollControlPlane, config: &HttpTransportConfig) -> Router {
    let factory = control.clone();
    let mcp = StreamableHttpService::new(
        move || Ok(RentRollMcp::new(factory.clone())),
        Arc::new(LocalSessionManager::default()),
        config.streamable(),
    );
    Router::new()
        .route("/health", get(health))
        .nest_service("/mcp", mcp)
        .with_state(control)
}

/// 200 with the unit count while the store answers, 503 once it does not.
async fn health(State(control): State<RentRollControlPlane>) -> (StatusCode, Json<Value>) {
    match control
        .store()
        .execute("SELECT COUNT(*) AS units FROM rent_roll", &[])
    {
        Ok(rows) => {
            let units = rows
                .first()
                .and_then(|row| row.get("units"))
                .cloned()
                .unwrap_or(Value::Null);
            (StatusCode::OK, Json(json!({ "status": "ok", "units": units })))
        }
        Err(err) => {
            warn!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "detail": err.engine_message() })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentroll_core::store::SqliteRentRollStore;

    fn control() -> RentRollControlPlane {
        RentRollControlPlane::new(SqliteRentRollStore::open_in_memory().expect("store"))
    }

    #[test]
    fn session_mode_controls_stateful_flag() {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let stateful = HttpTransportConfig::new(addr, SessionMode::default()).streamable();
        assert!(stateful.stateful_mode);
        assert_eq!(stateful.sse_keep_alive, Some(SSE_KEEP_ALIVE));

        let stateless = HttpTransportConfig::new(addr, SessionMode::Stateless).streamable();
        assert!(!stateless.stateful_mode);
    }

    #[tokio::test]
    async fn health_reports_unit_count() {
        let (status, Json(body)) = health(State(control())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok", "units": 0 }));
    }

    #[tokio::test]
    async fn health_fails_once_store_is_closed() {
        let control = control();
        control.store().close().expect("close");
        let (status, Json(body)) = health(State(control)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unavailable");
    }
}
