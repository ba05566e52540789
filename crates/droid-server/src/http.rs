//! HTTP transports: streamable HTTP (`POST /mcp`) and server-sent events
//! (`GET /sse` + `POST /messages`).

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response, Sse, sse::Event as SseEvent, sse::KeepAlive},
    routing::{get, post},
};
use dashmap::DashMap;
use droid_config::Transport;
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::handler::McpHandler;
use crate::protocol::JsonRpcResponse;

/// Header carrying the session id assigned on `initialize`.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Shared server state.
pub struct AppState {
    pub handler: Arc<McpHandler>,
    pub transport: Transport,
    /// Open SSE streams by session id.
    pub sse_sessions: DashMap<String, mpsc::UnboundedSender<JsonRpcResponse>>,
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    transport: String,
}

#[derive(Deserialize)]
struct MessageParams {
    session_id: String,
}

/// Build the Axum router for an HTTP-based transport.
pub fn build_router(handler: Arc<McpHandler>, transport: Transport) -> Router {
    let state = Arc::new(AppState {
        handler,
        transport,
        sse_sessions: DashMap::new(),
    });

    let router = Router::new().route("/health", get(health_handler));
    let router = match transport {
        Transport::Sse => router
            .route("/sse", get(sse_handler))
            .route("/messages", post(messages_handler)),
        Transport::Http | Transport::Stdio => router.route("/mcp", post(mcp_handler)),
    };

    router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        transport: state.transport.to_string(),
    })
}

/// Streamable HTTP: one JSON-RPC message in, one JSON reply out.
async fn mcp_handler(State(state): State<Arc<AppState>>, body: String) -> Response {
    match state.handler.handle_message(&body).await {
        Some(reply) => {
            // Only an initialize result carries protocolVersion
            let assign_session = reply
                .result
                .as_ref()
                .is_some_and(|r| r.get("protocolVersion").is_some());
            let mut response = Json(reply).into_response();
            if assign_session {
                let session_id = uuid::Uuid::new_v4().to_string();
                if let Ok(value) = HeaderValue::from_str(&session_id) {
                    response.headers_mut().insert(SESSION_HEADER, value);
                }
            }
            response
        }
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Removes an SSE session when its stream is dropped.
struct SessionGuard {
    state: Arc<AppState>,
    session_id: String,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.state.sse_sessions.remove(&self.session_id);
        debug!(session_id = %self.session_id, "sse session closed");
    }
}

/// Open an event stream. The first event names the endpoint to POST to.
async fn sse_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let session_id = uuid::Uuid::new_v4().to_string();
    let (tx, mut rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
    state.sse_sessions.insert(session_id.clone(), tx);
    info!(session_id = %session_id, "sse session opened");

    let endpoint = format!("/messages?session_id={session_id}");
    let guard = SessionGuard {
        state: Arc::clone(&state),
        session_id,
    };

    let stream = async_stream::stream! {
        let _guard = guard;
        yield Ok(SseEvent::default().event("endpoint").data(endpoint));
        while let Some(reply) = rx.recv().await {
            let data = serde_json::to_string(&reply).unwrap_or_default();
            yield Ok(SseEvent::default().event("message").data(data));
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Accept a message for an SSE session; the reply goes out on its stream.
async fn messages_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MessageParams>,
    body: String,
) -> StatusCode {
    let Some(tx) = state
        .sse_sessions
        .get(&params.session_id)
        .map(|entry| entry.value().clone())
    else {
        return StatusCode::NOT_FOUND;
    };

    let handler = Arc::clone(&state.handler);
    tokio::spawn(async move {
        if let Some(reply) = handler.handle_message(&body).await {
            // Receiver gone means the client hung up
            let _ = tx.send(reply);
        }
    });

    StatusCode::ACCEPTED
}
