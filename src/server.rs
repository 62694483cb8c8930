// src/server.rs
//
// HTTP surface: `GET /{owner}/{board}` → 302 to a random cached image.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::options::ServerOptions,
    core::{BoardKey, KeyError},
    scrape::ScrapeError,
    select::{self, SelectError},
    updater::CacheUpdater,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid board: {0}")]
    Key(#[from] KeyError),
    #[error(transparent)]
    Scrape(#[from] ScrapeError),
    #[error(transparent)]
    Select(#[from] SelectError),
    #[error("update task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("image reference is not a valid redirect target: {0:?}")]
    Location(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Key(_) => StatusCode::BAD_REQUEST,
            ApiError::Scrape(ScrapeError::NoContent(_)) => StatusCode::NOT_FOUND,
            ApiError::Select(SelectError::EmptyCollection) => StatusCode::NOT_FOUND,
            ApiError::Scrape(_) | ApiError::Task(_) | ApiError::Location(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match status {
            StatusCode::NOT_FOUND => s!("No images found."),
            StatusCode::BAD_REQUEST => self.to_string(),
            _ => join!("Error loading board: ", &self.to_string()),
        };
        (status, body).into_response()
    }
}

pub fn router(updater: Arc<CacheUpdater>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/{owner}/{board}", get(random_image))
        .with_state(updater)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "OK"
}

async fn random_image(
    State(updater): State<Arc<CacheUpdater>>,
    Path((owner, board)): Path<(String, String)>,
) -> Response {
    match resolve(updater, owner, board).await {
        Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
        Err(e) => {
            logw!("Server: {} {e}", e.status().as_u16());
            e.into_response()
        }
    }
}

async fn resolve(updater: Arc<CacheUpdater>, owner: String, board: String) -> Result<HeaderValue, ApiError> {
    let key = BoardKey::new(owner, board)?;

    // Detached so a client hanging up does not abort a scrape mid-merge.
    let task_key = key.clone();
    let outcome = tokio::spawn(async move { updater.update(&task_key, None).await }).await??;

    let image = select::pick(&outcome.images)?;
    logd!("Server: Redirect board={key} → {image}");
    HeaderValue::from_str(image.as_str()).map_err(|_| ApiError::Location(s!(image.as_str())))
}

/// Bind and serve until Ctrl-C.
pub async fn serve(opts: &ServerOptions, updater: Arc<CacheUpdater>) -> std::io::Result<()> {
    let listener = TcpListener::bind(opts.addr()).await?;
    logf!("Server running at http://{}", listener.local_addr()?);
    axum::serve(listener, router(updater))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        loge!("Server: Cannot listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    logf!("Server: Shutting down");
}
