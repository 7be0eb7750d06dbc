// ABOUTME: Recognition engine that forwards pages to the internal /api/ocr endpoint
// ABOUTME: Used when recognition runs on a separate instance of the service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{RecognitionEngine, RecognitionSession};
use crate::constants::{form_fields, paths, timeouts};
use crate::errors::{AppError, AppResult};
use crate::ingestion::{DataUrl, RawImage};
use crate::utils::http_client::create_client_with_timeout;

#[derive(Debug, Deserialize)]
struct RecognizedText {
    text: String,
}

#[derive(Debug, Deserialize)]
struct FailureBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<FailureDetail>,
}

#[derive(Debug, Deserialize)]
struct FailureDetail {
    message: String,
}

/// Posts each page as a data URL to `{base}/api/ocr`
pub struct RemoteEngine {
    client: Client,
    endpoint: String,
}

impl RemoteEngine {
    /// Create an engine targeting the service at `base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(base_url: &str) -> AppResult<Self> {
        Ok(Self {
            client: create_client_with_timeout(timeouts::REMOTE_OCR_TIMEOUT_SECS)?,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), paths::OCR),
        })
    }
}

#[async_trait]
impl RecognitionEngine for RemoteEngine {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn open_session(&self) -> AppResult<Box<dyn RecognitionSession>> {
        Ok(Box::new(RemoteSession {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
        }))
    }
}

struct RemoteSession {
    client: Client,
    endpoint: String,
}

#[async_trait]
impl RecognitionSession for RemoteSession {
    async fn recognize(&mut self, image: &RawImage) -> AppResult<String> {
        let upload = DataUrl::encode("image/png", &image.to_png()?);
        let form = Form::new().text(form_fields::FILE, upload);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::external_unavailable("ocr", format!("Request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::external_service("ocr", format!("Failed to read response: {e}")))?;

        if status != StatusCode::CREATED {
            let message = serde_json::from_str::<FailureBody>(&body)
                .ok()
                .and_then(|b| b.message.or_else(|| b.error.map(|d| d.message)))
                .unwrap_or_else(|| format!("OCR endpoint returned {status}"));
            return Err(AppError::upstream("ocr", status.as_u16(), message));
        }

        let recognized: RecognizedText = serde_json::from_str(&body)?;
        Ok(recognized.text)
    }

    async fn close(self: Box<Self>) {}
}
