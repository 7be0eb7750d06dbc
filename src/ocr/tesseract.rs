// ABOUTME: Local recognition engine backed by the tesseract executable
// ABOUTME: Each session owns a scratch directory that is removed when the session closes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{ModelStore, RecognitionEngine, RecognitionError, RecognitionSession};
use crate::config::RecognitionConfig;
use crate::constants::timeouts;
use crate::errors::AppResult;
use crate::ingestion::RawImage;
use crate::utils::http_client::create_client_with_timeout;

/// Runs `tesseract` against PNG renderings of each page
pub struct TesseractEngine {
    executable: PathBuf,
    language: String,
    models: ModelStore,
}

impl TesseractEngine {
    /// Create an engine with an explicit model store
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>, language: impl Into<String>, models: ModelStore) -> Self {
        Self {
            executable: executable.into(),
            language: language.into(),
            models,
        }
    }

    /// Create an engine from recognition settings
    ///
    /// # Errors
    ///
    /// Returns an error if the model download client cannot be created
    pub fn from_config(config: &RecognitionConfig) -> AppResult<Self> {
        let client = create_client_with_timeout(timeouts::MODEL_DOWNLOAD_TIMEOUT_SECS)?;
        let models = ModelStore::new(
            client,
            config.model_url.clone(),
            config.model_dir.clone(),
            config.model_file_name(),
        );
        Ok(Self::new(
            config.tesseract_path.clone(),
            config.language.clone(),
            models,
        ))
    }

    /// Model cache used by this engine
    #[must_use]
    pub const fn models(&self) -> &ModelStore {
        &self.models
    }
}

#[async_trait]
impl RecognitionEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn open_session(&self) -> AppResult<Box<dyn RecognitionSession>> {
        self.models.ensure_available().await?;
        let workdir = TempDir::with_prefix("pierre-ocr-")?;
        debug!("Opened recognition session in {}", workdir.path().display());
        Ok(Box::new(TesseractSession {
            executable: self.executable.clone(),
            language: self.language.clone(),
            tessdata_dir: self.models.dir().to_path_buf(),
            workdir,
        }))
    }
}

struct TesseractSession {
    executable: PathBuf,
    language: String,
    tessdata_dir: PathBuf,
    workdir: TempDir,
}

#[async_trait]
impl RecognitionSession for TesseractSession {
    async fn recognize(&mut self, image: &RawImage) -> AppResult<String> {
        let input = self.workdir.path().join("input.png");
        fs::write(&input, image.to_png()?).await?;

        let output = Command::new(&self.executable)
            .arg(&input)
            .arg("stdout")
            .arg("--tessdata-dir")
            .arg(&self.tessdata_dir)
            .arg("-l")
            .arg(&self.language)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| RecognitionError::EngineUnavailable {
                executable: self.executable.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(RecognitionError::EngineFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn close(self: Box<Self>) {
        let path = self.workdir.path().to_path_buf();
        if let Err(e) = self.workdir.close() {
            warn!("Failed to remove recognition scratch dir {}: {e}", path.display());
        }
    }
}
