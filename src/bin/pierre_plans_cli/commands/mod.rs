// ABOUTME: Re-exports command modules for pierre-plans-cli
// ABOUTME: Provides the upload flow and the plan inspection commands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod show;
pub mod upload;
