// ABOUTME: Local cache for the trained recognition model
// ABOUTME: Downloads the model once and publishes it with an atomic rename
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::io::Write;
use std::path::{Path, PathBuf};

use reqwest::Client;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tokio::{fs, task};
use tracing::{info, instrument};

use super::RecognitionError;
use crate::errors::{AppError, AppResult};

/// Cached copy of the trained model file
///
/// A partially downloaded model is never visible at its final path: bytes go
/// to a temporary file in the same directory, which is renamed into place.
pub struct ModelStore {
    client: Client,
    url: String,
    dir: PathBuf,
    file_name: String,
    download_lock: Mutex<()>,
}

impl ModelStore {
    /// Create a store for `file_name` inside `dir`, fetched from `url`
    #[must_use]
    pub fn new(
        client: Client,
        url: impl Into<String>,
        dir: impl Into<PathBuf>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            dir: dir.into(),
            file_name: file_name.into(),
            download_lock: Mutex::new(()),
        }
    }

    /// Directory holding the model
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Final path of the model file
    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// Return the model path, downloading the model first if it is missing
    ///
    /// # Errors
    ///
    /// Returns `MODEL_UNAVAILABLE` if the download fails, or a storage error
    /// if the model cannot be written
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn ensure_available(&self) -> AppResult<PathBuf> {
        let path = self.model_path();
        if fs::try_exists(&path).await? {
            return Ok(path);
        }

        let _guard = self.download_lock.lock().await;
        // Another caller may have finished the download while we waited
        if fs::try_exists(&path).await? {
            return Ok(path);
        }

        info!("Downloading recognition model to {}", path.display());
        let bytes = self.download().await?;
        fs::create_dir_all(&self.dir).await?;

        let dir = self.dir.clone();
        let target = path.clone();
        task::spawn_blocking(move || -> AppResult<()> {
            let mut temp = NamedTempFile::new_in(&dir)?;
            temp.write_all(&bytes)?;
            temp.as_file().sync_all()?;
            temp.persist(&target)
                .map_err(|e| AppError::storage(format!("Failed to publish model file: {e}")))?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::internal(format!("Model write task failed: {e}")))??;

        info!("Recognition model ready at {}", path.display());
        Ok(path)
    }

    async fn download(&self) -> Result<Vec<u8>, RecognitionError> {
        let fetch_error = |reason: String| RecognitionError::ModelFetch {
            url: self.url.clone(),
            reason,
        };

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("server returned {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_error(format!("download interrupted: {e}")))?;
        if bytes.is_empty() {
            return Err(fetch_error("empty response body".to_owned()));
        }
        Ok(bytes.to_vec())
    }
}
