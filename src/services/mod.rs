// ABOUTME: Service layer composing ingestion, recognition, structuring, and persistence
// ABOUTME: Route handlers stay thin and delegate whole use cases to these services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Business services used by the HTTP routes

mod plan_ingestion;

pub use plan_ingestion::{IngestionOutcome, PlanIngestionPipeline, PlanUpload};
