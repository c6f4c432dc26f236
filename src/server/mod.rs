#![allow(clippy::result_large_err)]

use crate::core::audit::{AuditLog, LogEntry};
use crate::core::config::ServerConfig;
use crate::core::error::AppError;
use crate::core::orchestrator::{HealingOrchestrator, ToolExecutionRequest};
use crate::core::types::ErrorCategory;
use axum::{
    body::Bytes,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};

const DEFAULT_LOG_LIMIT: usize = 50;

/// State shared across API requests.
pub struct ApiState {
    pub orchestrator: HealingOrchestrator,
    pub audit: Arc<AuditLog>,
}

/// Start the orchestration API and block until the service terminates.
pub async fn serve(state: Arc<ApiState>, config: &ServerConfig) -> Result<(), AppError> {
    serve_internal(state, config, None).await
}

/// Start the API and notify once the bind address is known (test helper).
pub async fn serve_with_ready_notifier(
    state: Arc<ApiState>,
    config: &ServerConfig,
    ready_notifier: oneshot::Sender<SocketAddr>,
) -> Result<(), AppError> {
    serve_internal(state, config, Some(ready_notifier)).await
}

async fn serve_internal(
    state: Arc<ApiState>,
    config: &ServerConfig,
    ready_notifier: Option<oneshot::Sender<SocketAddr>>,
) -> Result<(), AppError> {
    let bind_addr: SocketAddr = config.bind.parse().map_err(|err| {
        AppError::new(
            ErrorCategory::ValidationError,
            format!("invalid server bind address {}: {}", config.bind, err),
        )
    })?;

    // The orchestration API is consumed directly by browser UIs; the wire
    // contract keeps CORS open to any origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/v1/tools/execute", post(handle_execute))
        .route("/v1/logs", get(handle_latest_logs).delete(handle_clear_logs))
        .route("/v1/logs/stream", get(handle_stream_logs))
        .layer(Extension(state))
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(cors);

    let listener = TcpListener::bind(bind_addr).await.map_err(|err| {
        AppError::new(
            ErrorCategory::IoError,
            format!("failed to bind API listener {}: {}", bind_addr, err),
        )
    })?;
    let local_addr = listener.local_addr().map_err(|err| {
        AppError::new(
            ErrorCategory::IoError,
            format!("failed to determine API listener address: {}", err),
        )
    })?;
    if let Some(tx) = ready_notifier {
        let _ = tx.send(local_addr);
    }
    info!("orchestration API listening on {}", local_addr);
    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| {
            AppError::new(
                ErrorCategory::InternalError,
                format!("API server terminated: {}", err),
            )
        })
}

/// POST /v1/tools/execute
///
/// Orchestration failure is a normal, well-formed outcome: the handler
/// answers 200 with `success:false` rather than a transport error. Bodies
/// that cannot be deserialized are transport-level faults and answer 500.
async fn handle_execute(
    Extension(state): Extension<Arc<ApiState>>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiRejection> {
    let request: ToolExecutionRequest =
        serde_json::from_slice(&body).map_err(|err| ApiRejection::fault(err.to_string()))?;

    let result = state.orchestrator.execute(&request).await;
    let value =
        serde_json::to_value(&result).map_err(|err| ApiRejection::fault(err.to_string()))?;
    Ok(Json(value))
}

#[derive(Debug, Deserialize)]
struct LogsQuery {
    limit: Option<usize>,
}

/// GET /v1/logs?limit=N — latest N entries, newest first.
async fn handle_latest_logs(
    Extension(state): Extension<Arc<ApiState>>,
    Query(query): Query<LogsQuery>,
) -> Json<Vec<LogEntry>> {
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT);
    Json(state.audit.latest(limit))
}

/// DELETE /v1/logs — bulk clear, the only deletion path.
async fn handle_clear_logs(
    Extension(state): Extension<Arc<ApiState>>,
) -> Result<StatusCode, ApiRejection> {
    state
        .audit
        .clear()
        .map_err(|err| ApiRejection::fault(err.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/logs/stream — WebSocket push of every entry appended after
/// connect, serialized as one JSON text frame per entry.
async fn handle_stream_logs(
    Extension(state): Extension<Arc<ApiState>>,
    upgrade: WebSocketUpgrade,
) -> Response {
    let receiver = state.audit.subscribe();
    upgrade.on_upgrade(move |socket| push_entries(socket, receiver))
}

async fn push_entries(mut socket: WebSocket, receiver: broadcast::Receiver<LogEntry>) {
    let mut stream = BroadcastStream::new(receiver);
    while let Some(item) = stream.next().await {
        let entry = match item {
            Ok(entry) => entry,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!("log stream subscriber lagged, skipped {} entries", skipped);
                continue;
            }
        };
        let payload = match serde_json::to_string(&entry) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("failed to encode log entry for stream: {}", err);
                continue;
            }
        };
        if socket.send(Message::Text(payload.into())).await.is_err() {
            break;
        }
    }
}

struct ApiRejection {
    status: StatusCode,
    error: String,
}

impl ApiRejection {
    fn fault(error: String) -> Self {
        tracing::error!("API request fault: {}", error);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error,
        }
    }
}

impl IntoResponse for ApiRejection {
    fn into_response(self) -> Response {
        let mut resp = Json(json!({
            "success": false,
            "error": self.error,
        }))
        .into_response();
        *resp.status_mut() = self.status;
        resp
    }
}
