// ABOUTME: Shared utilities for outbound HTTP access
// ABOUTME: Central place for reqwest client construction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// HTTP client construction with consistent timeouts
pub mod http_client;
