// ABOUTME: Text recognition over normalized page images
// ABOUTME: Engine and session traits plus a service that always releases its session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Text Recognition
//!
//! A [`RecognitionEngine`] hands out short-lived [`RecognitionSession`]s. The
//! [`RecognitionService`] opens one session per page, recognizes, and closes
//! the session on every path, including failures.
//!
//! Two engines ship with the service:
//! - [`TesseractEngine`] runs the `tesseract` executable with a cached trained model
//! - [`RemoteEngine`] forwards pages to another instance's `/api/ocr` endpoint

mod model_store;
mod remote;
mod tesseract;

pub use model_store::ModelStore;
pub use remote::RemoteEngine;
pub use tesseract::TesseractEngine;

use std::io;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::{RecognitionBackend, RecognitionConfig};
use crate::errors::{AppError, AppResult};
use crate::ingestion::RawImage;

/// Failures inside the recognition backends
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// The trained model could not be downloaded
    #[error("model download from {url} failed: {reason}")]
    ModelFetch {
        /// Model location
        url: String,
        /// What went wrong
        reason: String,
    },
    /// The engine executable could not be started
    #[error("cannot run {executable}: {source}")]
    EngineUnavailable {
        /// Executable that failed to start
        executable: String,
        /// Spawn error
        #[source]
        source: io::Error,
    },
    /// The engine ran and reported failure
    #[error("recognition exited with {status}: {stderr}")]
    EngineFailed {
        /// Exit status
        status: String,
        /// Captured diagnostics
        stderr: String,
    },
}

impl From<RecognitionError> for AppError {
    fn from(error: RecognitionError) -> Self {
        let message = error.to_string();
        match error {
            RecognitionError::ModelFetch { url, .. } => Self::model_unavailable(&url, message),
            RecognitionError::EngineUnavailable { source, .. } => {
                Self::external_unavailable("ocr", message).with_source(source)
            }
            RecognitionError::EngineFailed { .. } => Self::external_service("ocr", message),
        }
    }
}

/// Source of recognition sessions
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Engine identifier for logs
    fn name(&self) -> &'static str;

    /// Acquire a session, loading the trained model if needed
    async fn open_session(&self) -> AppResult<Box<dyn RecognitionSession>>;
}

/// One recognition worker, released with [`RecognitionSession::close`]
#[async_trait]
pub trait RecognitionSession: Send {
    /// Recognize the text on one page
    async fn recognize(&mut self, image: &RawImage) -> AppResult<String>;

    /// Release everything the session holds
    async fn close(self: Box<Self>);
}

/// Extracts text from pages using a configured engine
#[derive(Clone)]
pub struct RecognitionService {
    engine: Arc<dyn RecognitionEngine>,
}

impl RecognitionService {
    /// Wrap an engine
    #[must_use]
    pub fn new(engine: Arc<dyn RecognitionEngine>) -> Self {
        Self { engine }
    }

    /// Build the service for the configured backend
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn from_config(config: &RecognitionConfig) -> AppResult<Self> {
        let engine: Arc<dyn RecognitionEngine> = match config.backend {
            RecognitionBackend::Local => Arc::new(TesseractEngine::from_config(config)?),
            RecognitionBackend::Remote => Arc::new(RemoteEngine::new(&config.internal_api_url)?),
        };
        Ok(Self::new(engine))
    }

    /// Active engine identifier
    #[must_use]
    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Recognize the text on one page
    ///
    /// The session is closed before returning, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be opened or recognition fails
    #[instrument(skip(self, image), fields(engine = self.engine.name(), width = image.width(), height = image.height()))]
    pub async fn extract_text(&self, image: &RawImage) -> AppResult<String> {
        let started = Instant::now();
        let mut session = self.engine.open_session().await?;
        let result = session.recognize(image).await;
        session.close().await;

        match &result {
            Ok(text) => info!(
                chars = text.len(),
                duration_ms = started.elapsed().as_millis(),
                "Text recognized"
            ),
            Err(e) => warn!(error = %e, "Text recognition failed"),
        }
        result
    }
}
