// ABOUTME: Internal text recognition endpoint
// ABOUTME: Accepts a data-URL image in multipart field "file" and answers 201 with the text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::multipart::FormFields;
use crate::constants::{form_fields, paths};
use crate::errors::{AppError, ErrorCode};
use crate::ingestion::decode_upload;
use crate::resources::ServerResources;

/// Recognized text
#[derive(Debug, Serialize, Deserialize)]
pub struct OcrResponse {
    /// Extracted text, possibly empty
    pub text: String,
}

/// OCR routes
pub struct OcrRoutes;

impl OcrRoutes {
    /// Create the OCR routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(paths::OCR, post(Self::handle_recognize))
            .with_state(resources)
    }

    /// Handle POST /api/ocr
    async fn handle_recognize(
        State(resources): State<Arc<ServerResources>>,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Response, AppError> {
        let form = FormFields::read(multipart).await?;
        let file = form
            .get(form_fields::FILE)
            .ok_or_else(|| AppError::new(ErrorCode::MissingRequiredField, "No file found"))?;

        let image = decode_upload(file).await?;
        let text = resources.recognition.extract_text(&image).await?;

        Ok((StatusCode::CREATED, Json(OcrResponse { text })).into_response())
    }
}
