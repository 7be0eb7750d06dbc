// ABOUTME: Image-to-plan pipeline: decode, recognize text, structure with the model, persist
// ABOUTME: Request metadata is authoritative over whatever the model echoes back
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::future::Future;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::database::{parse_date_range, TrainingPlanManager};
use crate::errors::{AppError, AppResult};
use crate::ingestion::decode_upload;
use crate::logging::PipelineLogger;
use crate::models::{TrainingPlan, TrainingPlanDraft};
use crate::ocr::RecognitionService;
use crate::structuring::{PlanPrompt, PlanStructuringAgent};

/// One upload submitted to the pipeline
#[derive(Debug, Clone)]
pub struct PlanUpload {
    /// Caller identity
    pub user_id: String,
    /// Data-URL encoded image
    pub file: String,
    /// First day of the plan, as entered
    pub start_date: String,
    /// Last day of the plan, as entered
    pub end_date: String,
}

/// What a successful run produced
#[derive(Debug, Clone, Serialize)]
pub struct IngestionOutcome {
    /// Stored plan, top-level fields only
    pub plan: TrainingPlan,
    /// Structured plan as validated
    pub result: TrainingPlanDraft,
}

/// Runs uploads through every stage, sequentially
#[derive(Clone)]
pub struct PlanIngestionPipeline {
    recognition: RecognitionService,
    agent: PlanStructuringAgent,
    plans: TrainingPlanManager,
}

async fn timed_stage<T, F>(stage: &str, user_id: &str, future: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    let started = Instant::now();
    let result = future.await;
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    PipelineLogger::log_stage(stage, user_id, result.is_ok(), duration_ms);
    result
}

impl PlanIngestionPipeline {
    /// Assemble the pipeline from its stages
    #[must_use]
    pub const fn new(
        recognition: RecognitionService,
        agent: PlanStructuringAgent,
        plans: TrainingPlanManager,
    ) -> Self {
        Self {
            recognition,
            agent,
            plans,
        }
    }

    /// Process one upload end to end
    ///
    /// Metadata is validated before any expensive stage runs.
    ///
    /// # Errors
    ///
    /// Returns the first stage failure: `AUTH_REQUIRED` or validation errors
    /// for bad metadata, `INVALID_FORMAT` for undecodable images, recognition
    /// and provider errors, `SCHEMA_VALIDATION_FAILED`, or storage errors
    #[instrument(skip(self, upload), fields(user_id = %upload.user_id))]
    pub async fn run(&self, upload: &PlanUpload) -> AppResult<IngestionOutcome> {
        let user_id = upload.user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::auth_required());
        }
        parse_date_range(&upload.start_date, &upload.end_date)?;

        let image = timed_stage("decode", user_id, decode_upload(&upload.file)).await?;
        let text = timed_stage(
            "recognize",
            user_id,
            self.recognition.extract_text(&image),
        )
        .await?;
        if text.trim().is_empty() {
            warn!("No text recognized on the uploaded page");
        }

        let prompt = PlanPrompt {
            text: &text,
            user_id,
            start_date: &upload.start_date,
            end_date: &upload.end_date,
        };
        let mut draft = timed_stage("structure", user_id, self.agent.structure(&prompt)).await?;
        Self::apply_request_metadata(&mut draft, user_id, upload);

        let plan = timed_stage("persist", user_id, self.plans.create_training_plan(&draft)).await?;
        PipelineLogger::log_plan_event(&plan.id.to_string(), "created", draft.weeks.len());
        info!(plan_id = %plan.id, "Upload ingested");

        Ok(IngestionOutcome { plan, result: draft })
    }

    fn apply_request_metadata(draft: &mut TrainingPlanDraft, user_id: &str, upload: &PlanUpload) {
        if draft.user_id != user_id {
            warn!(model_user_id = %draft.user_id, "Model echoed a different user id, overriding");
            user_id.clone_into(&mut draft.user_id);
        }
        if draft.start_date != upload.start_date || draft.end_date != upload.end_date {
            warn!(
                model_start = %draft.start_date,
                model_end = %draft.end_date,
                "Model echoed a different date range, overriding"
            );
            draft.start_date.clone_from(&upload.start_date);
            draft.end_date.clone_from(&upload.end_date);
        }
    }
}
