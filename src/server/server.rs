use anyhow::{Context, Result};
use std::future::Future;

use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info};

use super::{
    api_error::ApiError,
    catalog_routes::{make_catalog_routes, route_not_found},
    log_requests,
    metrics::metrics_handler,
    state::*,
    ServerConfig,
};

pub fn make_app(config: ServerConfig, catalog_store: GuardedCatalogStore) -> Router {
    let state = ServerState::new(config.clone(), catalog_store);

    make_catalog_routes(state.clone())
        .fallback(route_not_found)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(middleware::map_response(timeout_as_json))
        .layer(middleware::from_fn_with_state(state, log_requests))
}

/// `TimeoutLayer` answers with a bare 408; no handler produces that status.
async fn timeout_as_json(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        ApiError::Timeout.into_response()
    } else {
        response
    }
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Serve the catalog API and the metrics endpoint until `shutdown` resolves.
pub async fn run_server<F>(
    config: ServerConfig,
    catalog_store: GuardedCatalogStore,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = make_app(config.clone(), catalog_store);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    let metrics_listener = tokio::net::TcpListener::bind(("0.0.0.0", config.metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", config.metrics_port))?;

    let metrics_task = tokio::spawn(async move {
        if let Err(err) = axum::serve(metrics_listener, make_metrics_app()).await {
            error!("Metrics server stopped: {}", err);
        }
    });

    info!("Ready to serve at port {}!", config.port);
    info!("Metrics available at port {}!", config.metrics_port);

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    metrics_task.abort();
    Ok(result?)
}
