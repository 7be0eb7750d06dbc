// ABOUTME: Main library entry point for the Pierre training plan service
// ABOUTME: Turns photographed training plans into structured, stored plans over HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # Pierre Training Plans
//!
//! An ingestion service for training plans that arrive as images. An upload
//! runs through four sequential stages:
//!
//! 1. **Ingestion**: the data URL is decoded into normalized RGBA pixels
//! 2. **Recognition**: text is extracted by a local `tesseract` engine or a
//!    remote instance's `/api/ocr` endpoint
//! 3. **Structuring**: an `OpenAI`-compatible model turns the text into a
//!    schema-constrained plan, with a bounded correction retry
//! 4. **Persistence**: the plan tree is stored in `SQLite` in one transaction
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use pierre_training_plans::config::ServerConfig;
//! use pierre_training_plans::errors::AppResult;
//! use pierre_training_plans::resources::ServerResources;
//! use pierre_training_plans::server;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     let resources = Arc::new(ServerResources::from_config(config).await?);
//!     server::run(resources).await
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by binary crates (src/bin/) and integration tests (tests/).

/// Upload form, localized notices, and read clients
pub mod client;

/// Environment-driven service configuration
pub mod config;

/// Application constants and defaults
pub mod constants;

/// `SQLite` storage for training plans
pub mod database;

/// Unified error handling re-exported from `pierre-plans-core`
pub mod errors;

/// Data URL parsing and image normalization
pub mod ingestion;

/// LLM provider abstraction used by the structuring agent
pub mod llm;

/// Production logging and structured output
pub mod logging;

/// HTTP middleware for tracing and CORS
pub mod middleware;

/// Text recognition engines and the scoped recognition service
pub mod ocr;

/// Shared server resources
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// HTTP server assembly and serve loop
pub mod server;

/// The image-to-plan pipeline
pub mod services;

/// Schema-constrained plan extraction with the language model
pub mod structuring;

/// Shared utilities
pub mod utils;

/// Plan domain models
pub use pierre_plans_core::models;
