// ABOUTME: Shared HTTP client construction with connection and request timeouts
// ABOUTME: Used by the model provider, recognition backends, and the upload client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tracing::debug;

use crate::constants::timeouts;
use crate::errors::{AppError, AppResult};

/// Create a new HTTP client with a custom request timeout
///
/// The connection timeout is shared by every client.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized
pub fn create_client_with_timeout(timeout_secs: u64) -> AppResult<Client> {
    create_custom_client(|builder| builder.timeout(Duration::from_secs(timeout_secs)))
}

/// Create a new HTTP client with custom configuration
///
/// # Errors
///
/// Returns an error if the client cannot be built
pub fn create_custom_client<F>(config_fn: F) -> AppResult<Client>
where
    F: FnOnce(ClientBuilder) -> ClientBuilder,
{
    debug!("Creating HTTP client");
    let builder =
        ClientBuilder::new().connect_timeout(Duration::from_secs(timeouts::CONNECT_TIMEOUT_SECS));
    config_fn(builder)
        .build()
        .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")).with_source(e))
}
