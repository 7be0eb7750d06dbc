// ABOUTME: Request tracing spans for correlation and structured logging
// ABOUTME: Spans carry the request id assigned at the edge and the response status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use axum::{body::Body, http::Request, response::Response};
use tracing::{field, Span};

use crate::constants::headers;

/// Create a tracing span for an HTTP request
///
/// Used as the `make_span_with` hook of the trace layer; the request id has
/// already been set by the request id layer.
pub fn create_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(headers::REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");
    let user_id = request
        .headers()
        .get(headers::USER_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
        user_id = %user_id,
        status_code = field::Empty,
        duration_ms = field::Empty,
    )
}

/// Record the outcome of a request in its span
pub fn record_response(response: &Response, latency: Duration, span: &Span) {
    span.record("status_code", response.status().as_u16());
    span.record(
        "duration_ms",
        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
    );
    tracing::info!(
        status = response.status().as_u16(),
        "request completed"
    );
}
