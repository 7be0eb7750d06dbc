// ABOUTME: HTTP middleware for request tracing and cross-origin access
// ABOUTME: Provides request spans, request ids on error bodies, and the CORS layer for the upload UI
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod cors;
pub mod request_id;
pub mod tracing;

// CORS configuration
pub use cors::setup_cors;

// Request ids in error bodies
pub use request_id::error_request_id_middleware;

// Request tracing
pub use tracing::{create_request_span, record_response};
