use crate::config::Settings;
use crate::runner::{run_items, RunOptions};
use crate::tmdb::{TmdbApi, TmdbClient};
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const MAX_BODY_BYTES: usize = 1024 * 1024; // 1MB safety cap

#[derive(Clone)]
pub struct AppState {
    pub tmdb: Arc<dyn TmdbApi>,
    pub concurrency: usize,
}

/// Batch submitted by the workflow host.
#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub items: Vec<Value>,
    #[serde(default)]
    pub continue_on_fail: bool,
}

pub async fn run_server(settings: Settings) -> Result<()> {
    let tmdb: Arc<dyn TmdbApi> = Arc::new(TmdbClient::new(
        settings.api_token.clone(),
        settings.api_base.clone(),
    )?);
    match tmdb.test_credentials().await {
        Ok(()) => info!("TMDB credentials accepted by {}", settings.api_base),
        Err(e) => warn!("TMDB credential check failed, serving anyway: {}", e),
    }

    let state = AppState {
        tmdb,
        concurrency: settings.concurrency,
    };

    let listener = TcpListener::bind(settings.addr)
        .await
        .with_context(|| format!("binding {}", settings.addr))?;
    info!("Listening on {}", settings.addr);
    serve(listener, state, shutdown_signal()).await
}

/// Serves the node on `listener` until `shutdown` resolves, then lets
/// in-flight batches finish.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("server terminated unexpectedly")?;
    info!("Server stopped");
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/execute", post(execute))
        .route("/credentials/test", get(test_credentials))
        .route("/health", get(health))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn execute(State(state): State<AppState>, Json(req): Json<ExecuteRequest>) -> Response {
    let options = RunOptions {
        continue_on_fail: req.continue_on_fail,
        concurrency: state.concurrency,
    };
    match run_items(state.tmdb.clone(), req.items, options).await {
        Ok(items) => (StatusCode::OK, Json(json!({ "items": items }))).into_response(),
        Err(err) => {
            let status = if err.source.is_config() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::BAD_GATEWAY
            };
            (
                status,
                Json(json!({
                    "error": err.source.to_string(),
                    "item_index": err.item_index
                })),
            )
                .into_response()
        }
    }
}

async fn test_credentials(State(state): State<AppState>) -> Response {
    match state.tmdb.test_credentials().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(e) => {
            warn!("Credential test failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "status": "error", "message": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM. A handler that cannot be installed is
/// logged and never fires, so the other one still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Ctrl+C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                warn!("SIGTERM handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl+C received, draining in-flight batches"),
        _ = terminate => info!("SIGTERM received, draining in-flight batches"),
    }
}
