// Server module - local web UI for the viewer
//
// Serves the page shell on `/` and a small JSON API the page script drives:
// navigation, arrow keys, `data-action` dispatch and step open state. All
// behaviour lives in `Viewer`; handlers only translate HTTP.

pub mod error;

use crate::viewer::actions::ActionOutcome;
use crate::viewer::keys::Focus;
use crate::viewer::navigator::Direction;
use crate::viewer::{ProofList, ViewUpdate, Viewer};
use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use error::ApiError;
use serde::Deserialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;

#[derive(Debug, Deserialize)]
struct KeyRequest {
    key: String,
    #[serde(default)]
    focus: Focus,
}

#[derive(Debug, Default, Deserialize)]
struct ActionRequest {
    #[serde(default)]
    fallback_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StepRequest {
    open: bool,
}

pub fn router(viewer: Viewer) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/proofs", get(proofs))
        .route("/api/nav/prev", post(nav_prev))
        .route("/api/nav/next", post(nav_next))
        .route("/api/key", post(key))
        .route("/api/action/:id", post(action))
        .route("/api/steps/:index", post(step))
        .route("/api/reload", post(reload))
        .with_state(viewer)
}

/// Bind and serve until Ctrl+C
pub async fn serve(bind_addr: SocketAddr, viewer: Viewer) -> Result<()> {
    let app = router(viewer);

    let listener = TcpListener::bind(bind_addr)
        .await
        .context("Failed to bind to address")?;

    tracing::info!("Viewer listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Viewer shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        // Without a signal handler, keep serving until the process is killed
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

async fn index(State(viewer): State<Viewer>) -> Html<String> {
    Html(viewer.page())
}

async fn proofs(State(viewer): State<Viewer>) -> Json<ProofList> {
    Json(viewer.proof_list())
}

async fn nav_prev(State(viewer): State<Viewer>) -> Json<ViewUpdate> {
    Json(viewer.navigate(Direction::Previous).await)
}

async fn nav_next(State(viewer): State<Viewer>) -> Json<ViewUpdate> {
    Json(viewer.navigate(Direction::Next).await)
}

/// `null` when the key doesn't navigate
async fn key(
    State(viewer): State<Viewer>,
    Json(request): Json<KeyRequest>,
) -> Json<Option<ViewUpdate>> {
    Json(viewer.handle_key(&request.key, request.focus).await)
}

async fn action(
    State(viewer): State<Viewer>,
    Path(id): Path<String>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<ActionOutcome>, ApiError> {
    let outcome = viewer
        .dispatch(&id, request.fallback_text.as_deref())
        .await?;
    Ok(Json(outcome))
}

async fn step(
    State(viewer): State<Viewer>,
    Path(index): Path<usize>,
    Json(request): Json<StepRequest>,
) -> Result<StatusCode, ApiError> {
    if viewer.set_step_open(index, request.open) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("No step {}", index)))
    }
}

async fn reload(State(viewer): State<Viewer>) -> Json<ViewUpdate> {
    Json(viewer.reload().await)
}
