// ABOUTME: Image ingestion for uploaded training plan pages
// ABOUTME: Turns data-URL or base64 uploads into normalized RGBA pixel buffers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Image Ingestion
//!
//! Uploads arrive as `data:<mime>;base64,<payload>` strings. This module
//! decodes the payload, decodes the image, forces an alpha channel, and hands
//! back raw RGBA pixels with their dimensions. Malformed input is a client
//! error and is never retried.

mod data_url;
mod image;

pub use data_url::DataUrl;
pub use image::RawImage;

use thiserror::Error;
use tokio::task;

use crate::errors::{AppError, AppResult};

/// Failures while turning an upload into pixels
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Nothing was uploaded
    #[error("no image payload was provided")]
    EmptyPayload,
    /// The data URL header is unusable
    #[error("malformed data URL: {0}")]
    MalformedDataUrl(String),
    /// The payload is not base64
    #[error("image payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    /// The bytes are not a supported image
    #[error("unsupported or corrupt image: {0}")]
    Decode(#[from] ::image::ImageError),
    /// The image has no pixels
    #[error("image has zero width or height")]
    EmptyImage,
}

impl From<IngestionError> for AppError {
    fn from(error: IngestionError) -> Self {
        Self::invalid_format(error.to_string()).with_source(error)
    }
}

/// Decode an uploaded data URL into normalized pixels
///
/// Image decoding is CPU-bound, so it runs on the blocking pool.
///
/// # Errors
///
/// Returns an `INVALID_FORMAT` error for malformed uploads, or an internal
/// error if the decoding task is cancelled
pub async fn decode_upload(upload: &str) -> AppResult<RawImage> {
    let bytes = DataUrl::parse(upload)?.decode()?;
    task::spawn_blocking(move || RawImage::decode(&bytes))
        .await
        .map_err(|e| AppError::internal(format!("Image decoding task failed: {e}")))?
        .map_err(AppError::from)
}
