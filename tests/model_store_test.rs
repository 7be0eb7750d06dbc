// ABOUTME: Tests for the recognition model cache against a local file server
// ABOUTME: Verifies single download, reuse of the cached file, and fetch failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use pierre_training_plans::{
    errors::ErrorCode, ocr::ModelStore, utils::http_client::create_client_with_timeout,
};
use tempfile::TempDir;
use tokio::{fs, net::TcpListener};

const MODEL_BYTES: &[u8] = b"trained-model-bytes";

/// Serve `/eng.traineddata` and count hits; `/missing` always 404s
async fn spawn_model_server() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/eng.traineddata",
            get(|State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                MODEL_BYTES
            }),
        )
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .with_state(Arc::clone(&hits));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), hits)
}

fn store(base: &str, path: &str, dir: &TempDir) -> ModelStore {
    ModelStore::new(
        create_client_with_timeout(10).unwrap(),
        format!("{base}{path}"),
        dir.path().join("tessdata"),
        "eng.traineddata",
    )
}

#[tokio::test]
async fn test_model_downloaded_once() {
    let (base, hits) = spawn_model_server().await;
    let dir = TempDir::new().unwrap();
    let models = store(&base, "/eng.traineddata", &dir);

    let first = models.ensure_available().await.unwrap();
    let second = models.ensure_available().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first, dir.path().join("tessdata").join("eng.traineddata"));
    assert_eq!(fs::read(&first).await.unwrap(), MODEL_BYTES);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_download() {
    let (base, hits) = spawn_model_server().await;
    let dir = TempDir::new().unwrap();
    let models = Arc::new(store(&base, "/eng.traineddata", &dir));

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let models = Arc::clone(&models);
            tokio::spawn(async move { models.ensure_available().await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_download_reports_model_unavailable() {
    let (base, _) = spawn_model_server().await;
    let dir = TempDir::new().unwrap();
    let models = store(&base, "/missing", &dir);

    let error = models.ensure_available().await.unwrap_err();

    assert_eq!(error.code, ErrorCode::ModelUnavailable);
    assert_eq!(error.http_status(), 503);
    assert!(!models.model_path().exists());
}
