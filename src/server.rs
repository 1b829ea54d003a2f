//! HTTP transport for the dispatcher.
//!
//! `POST /dispatch` takes a [`DispatchRequest`] and answers with the
//! [`ActionResult`]. A failed action is still a 200; only malformed JSON (400)
//! and an unregistered principal (403) change the status. `GET /health`
//! answers `OK`.

use crate::config::GatewayConfig;
use crate::dispatch::{ActionResult, DispatchRequest, RequestDispatcher};
use crate::error::{ApiError, DispatchError};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

pub type SharedDispatcher = Arc<RequestDispatcher>;

/// Build the router over a shared dispatcher
pub fn router(dispatcher: SharedDispatcher) -> Router {
    Router::new()
        .route("/dispatch", post(dispatch))
        .route("/health", get(health))
        .with_state(dispatcher)
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    "OK"
}

/// POST /dispatch
async fn dispatch(State(dispatcher): State<SharedDispatcher>, body: Bytes) -> Response {
    let request: DispatchRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("invalid request body: {}", e));
        }
    };

    match dispatcher.dispatch(&request).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err @ DispatchError::UnauthorizedPrincipal(_)) => {
            error_response(StatusCode::FORBIDDEN, err.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ActionResult::failure(message))).into_response()
}

/// Serve on `listener` until `shutdown` resolves
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    dispatcher: SharedDispatcher,
    shutdown: F,
) -> Result<(), ApiError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Gateway listening");
    }
    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Bind the configured address, serve until Ctrl-C, then write the snapshot
/// back when autosave is on.
pub async fn serve(
    config: &GatewayConfig,
    workspace_root: &Path,
    dispatcher: SharedDispatcher,
) -> Result<(), ApiError> {
    let listener = TcpListener::bind(config.server.bind.as_str()).await?;
    serve_with_shutdown(listener, Arc::clone(&dispatcher), shutdown_signal()).await?;
    info!("Gateway stopped");

    if config.store.autosave {
        let path = config.snapshot_path(workspace_root);
        dispatcher.store().save_to_file(&path)?;
        info!(path = %path.display(), contexts = dispatcher.store().len(), "Snapshot saved");
    }
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl-C");
            warn!("Serving until the process is terminated");
            std::future::pending::<()>().await;
        }
    }
}
