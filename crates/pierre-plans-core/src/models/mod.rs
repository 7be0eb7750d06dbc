// ABOUTME: Training plan domain models shared by the pipeline, storage, and HTTP layers
// ABOUTME: Re-exports plan drafts, vocabulary enums, and persisted records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Training Plan Models
//!
//! Two shapes of the same tree:
//! - **Drafts** (`TrainingPlanDraft` and children): what the structuring agent
//!   emits, keyed by the wire schema field names.
//! - **Records** (`TrainingPlan` and children): what storage returns, with
//!   identifiers and parent references.

mod plan;
mod records;

pub use plan::{
    parse_plan_date, ActivityDetails, ActivityDraft, ActivityType, DayDraft, TrainingPlanDraft,
    WeekDraft, Weekday,
};
pub use records::{Activity, Day, TrainingPlan, Week};
