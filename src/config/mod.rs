// ABOUTME: Configuration module for the ingestion service
// ABOUTME: Exposes the environment-driven ServerConfig and its component sections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Environment variable parsing into typed configuration
pub mod environment;

pub use environment::{
    CorsConfig, DatabaseConfig, DatabaseUrl, Environment, LlmConfig, RecognitionBackend,
    RecognitionConfig, ServerConfig,
};
