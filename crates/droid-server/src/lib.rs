//! # droid-server
//!
//! Serves a [`ToolExecutor`] to MCP hosts over one of three transports:
//!
//! - **stdio** — newline-delimited JSON-RPC on stdin/stdout
//! - **http** — streamable HTTP, one message per `POST /mcp`
//! - **sse** — `GET /sse` event stream plus `POST /messages`

pub mod handler;
pub mod http;
pub mod protocol;
pub mod stdio;

pub use handler::McpHandler;
pub use http::build_router;

use droid_config::Transport;
use droid_config::schema::ServerConfig;
use droid_core::{DroidError, ToolExecutor};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Serve `executor` with the transport selected in `config` until shutdown.
pub async fn serve(config: &ServerConfig, executor: Arc<dyn ToolExecutor>) -> droid_core::Result<()> {
    let handler = McpHandler::new(executor);

    if config.transport == Transport::Stdio {
        return stdio::run_stdio(Arc::new(handler)).await;
    }

    let handler = if config.request_timeout_secs > 0 {
        handler.with_call_timeout(Duration::from_secs(config.request_timeout_secs))
    } else {
        handler
    };
    let router = build_router(Arc::new(handler), config.transport);
    let listen = config.listen_addr();

    info!(listen = %listen, transport = %config.transport, "starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .map_err(|e| DroidError::Transport(format!("failed to bind {}: {}", listen, e)))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DroidError::Transport(format!("server error: {}", e)))?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
