// ABOUTME: Core types for the Pierre training plan ingestion service
// ABOUTME: Foundation crate with error handling and training plan domain models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Plans Core
//!
//! Foundation crate providing shared types for the training plan ingestion
//! service. It changes rarely, which keeps incremental builds of the service
//! crate fast.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and HTTP mapping
//! - **models**: Training plan drafts, vocabulary enums, and persisted records

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Training plan domain models
pub mod models;
