// ABOUTME: HTTP client side of the service: upload form, localized notices, plan reads
// ABOUTME: Used by the pierre-plans-cli binary and by integration tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Upload Client
//!
//! [`UploadForm`] mirrors the upload drawer: one image held as a data URL and
//! the plan's date range. [`UploadClient::submit`] posts it to
//! `/api/completion` and clears the form only when the service accepted it,
//! so a failed submission can be retried as-is. [`PlansClient`] reads plans
//! back for inspection.

mod locale;
mod plans;
mod upload;

pub use locale::{Locale, Notice};
pub use plans::PlansClient;
pub use upload::{UploadClient, UploadForm, UploadReceipt};

use reqwest::Response;

use crate::errors::{AppError, ErrorResponse};

/// Convert a non-success response into the error the service reported
async fn error_from_response(response: Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let mut error = serde_json::from_str::<ErrorResponse>(&body).map_or_else(
        |_| {
            let message = if body.trim().is_empty() {
                format!("Service returned {status}")
            } else {
                body.trim().to_owned()
            };
            AppError::external_service("pierre-training-plans", message)
        },
        |parsed| AppError::new(parsed.error.code, parsed.error.message),
    );
    error.upstream_status = Some(status.as_u16());
    error
}

/// Join a base URL and an absolute path
fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}
