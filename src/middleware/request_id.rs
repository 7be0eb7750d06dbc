// ABOUTME: Copies the edge-assigned request id into JSON error bodies
// ABOUTME: Lets clients quote the id from an error payload when reporting failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::constants::headers;
use crate::errors::{AppError, ErrorResponse};

/// Error payloads are small; anything larger is passed through untouched
const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

/// Stamp the request id onto error responses rendered from `AppError`
///
/// Must run inside the request id layer so the header is already set.
/// Successful responses and non-JSON bodies pass through unchanged.
pub async fn error_request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(headers::REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .map(ToOwned::to_owned);

    let response = next.run(request).await;

    let Some(request_id) = request_id else {
        return response;
    };
    if response.status().is_success() || !is_json(response.headers()) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_ERROR_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to buffer error body for request {request_id}: {e}");
            parts.headers.remove(header::CONTENT_LENGTH);
            return Response::from_parts(parts, Body::empty());
        }
    };

    let Ok(parsed) = serde_json::from_slice::<ErrorResponse>(&bytes) else {
        return Response::from_parts(parts, Body::from(bytes));
    };
    if parsed.error.request_id.is_some() {
        return Response::from_parts(parts, Body::from(bytes));
    }

    let error = AppError::new(parsed.error.code, parsed.error.message)
        .with_details(parsed.error.details)
        .with_request_id(request_id);
    match serde_json::to_vec(&ErrorResponse::from(error)) {
        Ok(stamped) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(stamped))
        }
        Err(_) => Response::from_parts(parts, Body::from(bytes)),
    }
}

fn is_json(response_headers: &HeaderMap) -> bool {
    response_headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}
