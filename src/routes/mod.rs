// ABOUTME: HTTP route modules for the ingestion service
// ABOUTME: Each route struct builds its own Router over the shared ServerResources
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # HTTP Routes
//!
//! - [`CompletionRoutes`]: `POST /api/completion`, the full upload pipeline
//! - [`OcrRoutes`]: `POST /api/ocr`, text recognition only
//! - [`PlanRoutes`]: plan reads, date updates, deletes, and details patches
//! - [`HealthRoutes`]: liveness and readiness
//!
//! Caller identity comes from the `x-user-id` header set by the fronting
//! authentication provider.

pub mod completion;
pub mod health;
mod multipart;
pub mod ocr;
pub mod plans;

pub use completion::CompletionRoutes;
pub use health::HealthRoutes;
pub use ocr::OcrRoutes;
pub use plans::PlanRoutes;

use axum::http::HeaderMap;

use crate::constants::headers;
use crate::errors::{AppError, AppResult};

/// Caller identity from the `x-user-id` header
///
/// # Errors
///
/// Returns `AUTH_REQUIRED` when the header is missing, blank, or not UTF-8
pub fn user_id_from_headers(request_headers: &HeaderMap) -> AppResult<String> {
    request_headers
        .get(headers::USER_ID)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .ok_or_else(AppError::auth_required)
}
