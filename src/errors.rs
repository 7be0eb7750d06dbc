// ABOUTME: Error handling entry point for the service crate
// ABOUTME: Re-exports the unified error system from pierre-plans-core
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! The types live in `pierre-plans-core` so the models crate and the service
//! crate share one taxonomy. Component-local error enums convert into
//! [`AppError`] next to their definitions.

pub use pierre_plans_core::errors::{
    AppError, AppResult, ErrorCode, ErrorResponse, ErrorResponseDetails,
};
