// ABOUTME: CORS middleware configuration for HTTP API endpoints
// ABOUTME: Provides Cross-Origin Resource Sharing setup for the browser upload client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use http::{header::HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::CorsConfig;
use crate::constants::headers;

/// Configure CORS settings for the plan service
///
/// Origins come from `CORS_ALLOWED_ORIGINS`. An empty list or a `*` entry
/// allows any origin.
///
/// # Allowed Headers
///
/// - Standard headers: content-type, authorization, accept, origin
/// - CORS headers: x-requested-with, access-control-request-*
/// - Identity header: x-user-id
/// - Correlation header: x-request-id
///
/// # Examples
///
/// ```bash
/// # Allow all origins (development)
/// export CORS_ALLOWED_ORIGINS="*"
///
/// # Allow specific origins (production)
/// export CORS_ALLOWED_ORIGINS="https://app.example.com,https://admin.example.com"
/// ```
#[must_use]
pub fn setup_cors(config: &CorsConfig) -> CorsLayer {
    let wildcard = config
        .allowed_origins
        .iter()
        .any(|origin| origin.trim() == "*");

    let allow_origin = if config.allowed_origins.is_empty() || wildcard {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    HeaderValue::from_str(trimmed).ok()
                }
            })
            .collect();

        if origins.is_empty() {
            // Fallback to any if parsing failed
            AllowOrigin::any()
        } else {
            AllowOrigin::list(origins)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("access-control-request-method"),
            HeaderName::from_static("access-control-request-headers"),
            HeaderName::from_static(headers::USER_ID),
            HeaderName::from_static(headers::REQUEST_ID),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ])
        .expose_headers([HeaderName::from_static(headers::REQUEST_ID)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use http::header;
    use tower::ServiceExt;

    async fn preflight(config: &CorsConfig, origin: &str) -> Option<HeaderValue> {
        let app = Router::new()
            .route("/api/plans", get(|| async { "ok" }))
            .layer(setup_cors(config));
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/plans")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .cloned()
    }

    #[tokio::test]
    async fn test_empty_list_allows_any_origin() {
        let allowed = preflight(&CorsConfig::default(), "https://x.example").await;
        assert_eq!(allowed.unwrap(), "*");
    }

    #[tokio::test]
    async fn test_listed_origin_only() {
        let config = CorsConfig {
            allowed_origins: vec!["https://app.example.com".to_owned()],
        };
        let allowed = preflight(&config, "https://app.example.com").await;
        assert_eq!(allowed.unwrap(), "https://app.example.com");

        assert!(preflight(&config, "https://evil.example").await.is_none());
    }
}
