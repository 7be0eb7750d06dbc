// ABOUTME: Plan structuring agent that turns recognized text into a validated training plan
// ABOUTME: Sends a schema-constrained request and feeds validation failures back for a retry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Plan Structuring
//!
//! The agent asks the language model for JSON matching
//! [`schema::training_plan_schema`], then validates the answer with the pure
//! [`validate_plan_output`] step. A violation is reported back to the model
//! together with its previous answer, up to `schema_retries` extra times.
//! Provider failures are returned immediately with the provider's status.

pub mod prompt;
pub mod schema;
mod validation;

pub use prompt::PlanPrompt;
pub use validation::{validate_plan_output, SchemaViolation};

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::config::LlmConfig;
use crate::errors::{AppError, AppResult};
use crate::llm::{ChatMessage, ChatRequest, LlmProvider, ResponseFormat};
use crate::models::TrainingPlanDraft;

/// Converts free text into a [`TrainingPlanDraft`] using a language model
#[derive(Clone)]
pub struct PlanStructuringAgent {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    schema_retries: u32,
}

impl PlanStructuringAgent {
    /// Create an agent with the structuring model settings
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: &LlmConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            schema_retries: config.schema_retries,
        }
    }

    fn request(&self, messages: Vec<ChatMessage>) -> ChatRequest {
        let mut request = ChatRequest::new(messages)
            .with_model(self.model.clone())
            .with_temperature(self.temperature);
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        if self.provider.capabilities().supports_structured_output() {
            request = request.with_response_format(ResponseFormat::JsonSchema {
                name: schema::SCHEMA_NAME.to_owned(),
                description: Some(schema::SCHEMA_DESCRIPTION.to_owned()),
                schema: schema::training_plan_schema().clone(),
            });
        }
        request
    }

    /// Structure recognized text into a plan draft
    ///
    /// # Errors
    ///
    /// Returns `SCHEMA_VALIDATION_FAILED` once retries are exhausted, or the
    /// provider's error unchanged
    #[instrument(skip(self, prompt), fields(provider = self.provider.name(), model = %self.model, text_len = prompt.text.len()))]
    pub async fn structure(&self, prompt: &PlanPrompt<'_>) -> AppResult<TrainingPlanDraft> {
        let mut messages = prompt.messages(schema::training_plan_schema());
        let max_attempts = self.schema_retries.saturating_add(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let response = self.provider.complete(&self.request(messages.clone())).await?;
            debug!(
                attempt,
                chars = response.content.len(),
                finish_reason = ?response.finish_reason,
                "Structuring response received"
            );

            match validate_plan_output(&response.content) {
                Ok(draft) => {
                    info!(
                        attempt,
                        weeks = draft.weeks.len(),
                        activities = draft.activity_count(),
                        "Training plan structured"
                    );
                    return Ok(draft);
                }
                Err(violation) if attempt < max_attempts => {
                    warn!(attempt, %violation, "Structuring output rejected, asking for a correction");
                    messages.push(ChatMessage::assistant(response.content));
                    messages.push(prompt::correction(&violation.to_string()));
                }
                Err(violation) => {
                    warn!(attempt, %violation, "Structuring output rejected, giving up");
                    return Err(AppError::schema_validation(
                        format!("Model output could not be parsed as a training plan: {violation}"),
                        attempt,
                    ));
                }
            }
        }
    }
}
