// ABOUTME: HTTP server assembly: route merging, middleware layers, and the serve loop
// ABOUTME: Stops accepting connections on Ctrl+C or SIGTERM and drains in-flight requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! HTTP server for the training plan service

#[cfg(not(unix))]
use std::future;
use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, middleware, Router};
use tokio::net::TcpListener;
use tokio::signal;
#[cfg(unix)]
use tokio::signal::unix::{signal as unix_signal, SignalKind};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::errors::{AppError, AppResult};
use crate::middleware::{
    create_request_span, error_request_id_middleware, record_response, setup_cors,
};
use crate::resources::ServerResources;
use crate::routes::{CompletionRoutes, HealthRoutes, OcrRoutes, PlanRoutes};

/// Build the full application router
///
/// Layers, outermost first: request id assignment, tracing, request id
/// propagation onto the response, request id stamping on error bodies,
/// CORS, body limit.
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let max_upload_bytes = resources.config.max_upload_bytes;
    let cors = setup_cors(&resources.config.cors);

    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .merge(OcrRoutes::routes(Arc::clone(&resources)))
        .merge(CompletionRoutes::routes(Arc::clone(&resources)))
        .merge(PlanRoutes::routes(resources))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(create_request_span)
                        .on_response(record_response),
                )
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::from_fn(error_request_id_middleware))
                .layer(cors)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}

/// Bind the configured address and serve until a shutdown signal arrives
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
pub async fn run(resources: Arc<ServerResources>) -> AppResult<()> {
    let address = format!("{}:{}", resources.config.host, resources.config.http_port);
    let listener = TcpListener::bind(&address).await.map_err(|e| {
        AppError::internal(format!("Failed to bind {address}: {e}")).with_source(e)
    })?;
    info!("HTTP server listening on {address}");

    serve(listener, resources).await
}

/// Serve on an already bound listener
///
/// # Errors
///
/// Returns an error if the server fails
pub async fn serve(listener: TcpListener, resources: Arc<ServerResources>) -> AppResult<()> {
    let app = build_router(resources);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("HTTP server error: {e}")).with_source(e))?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match unix_signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => warn!("Failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down gracefully"),
        () = terminate => info!("Received termination signal, shutting down gracefully"),
    }
}
