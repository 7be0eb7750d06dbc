// ABOUTME: Upload pipeline endpoint turning a plan image into a stored training plan
// ABOUTME: Reads the multipart form, identifies the caller, and runs the ingestion pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use super::multipart::FormFields;
use super::user_id_from_headers;
use crate::constants::{form_fields, paths};
use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::services::PlanUpload;

/// Completion routes
pub struct CompletionRoutes;

impl CompletionRoutes {
    /// Create the completion routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(paths::COMPLETION, post(Self::handle_completion))
            .with_state(resources)
    }

    /// Handle POST /api/completion
    ///
    /// Responds 200 with `{"plan": ..., "result": ...}`.
    async fn handle_completion(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Response, AppError> {
        let user_id = user_id_from_headers(&headers)?;
        let form = FormFields::read(multipart).await?;

        let upload = PlanUpload {
            user_id,
            file: form.require(form_fields::FILE)?.to_owned(),
            start_date: form.require(form_fields::START_DATE)?.to_owned(),
            end_date: form.require(form_fields::END_DATE)?.to_owned(),
        };

        let outcome = resources.pipeline.run(&upload).await?;
        Ok((StatusCode::OK, Json(outcome)).into_response())
    }
}
