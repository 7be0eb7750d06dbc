// ABOUTME: Shared server resources built once at startup and handed to every route
// ABOUTME: Wires configuration, storage, recognition, the language model, and the pipeline together
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{RecognitionBackend, ServerConfig};
use crate::database::{Database, TrainingPlanManager};
use crate::errors::AppResult;
use crate::llm::{LlmProvider, OpenAiCompatibleProvider};
use crate::ocr::{RecognitionService, TesseractEngine};
use crate::services::PlanIngestionPipeline;
use crate::structuring::PlanStructuringAgent;

/// Everything route handlers need, shared behind an `Arc`
pub struct ServerResources {
    /// Service configuration
    pub config: Arc<ServerConfig>,
    /// Storage
    pub database: Database,
    /// In-process recognition serving `/api/ocr`
    pub recognition: RecognitionService,
    /// Upload pipeline serving `/api/completion`
    pub pipeline: PlanIngestionPipeline,
}

impl ServerResources {
    /// Assemble resources from explicit components
    ///
    /// `recognition` serves the OCR endpoint, `pipeline_recognition` is the
    /// backend used by the upload pipeline.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        database: Database,
        recognition: RecognitionService,
        pipeline_recognition: RecognitionService,
        provider: Arc<dyn LlmProvider>,
    ) -> Self {
        let agent = PlanStructuringAgent::new(provider, &config.llm);
        let pipeline = PlanIngestionPipeline::new(pipeline_recognition, agent, database.plans());
        Self {
            config: Arc::new(config),
            database,
            recognition,
            pipeline,
        }
    }

    /// Build every component from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or an HTTP client
    /// cannot be created
    pub async fn from_config(config: ServerConfig) -> AppResult<Self> {
        let database = Database::new(&config.database).await?;

        let local_engine = Arc::new(TesseractEngine::from_config(&config.recognition)?);
        if config.recognition.prefetch_model {
            match local_engine.models().ensure_available().await {
                Ok(path) => info!("Recognition model available at {}", path.display()),
                Err(e) => warn!("Recognition model prefetch failed, will retry on first use: {e}"),
            }
        }
        let recognition = RecognitionService::new(local_engine);
        let pipeline_recognition = match config.recognition.backend {
            RecognitionBackend::Local => recognition.clone(),
            RecognitionBackend::Remote => RecognitionService::from_config(&config.recognition)?,
        };

        let provider: Arc<dyn LlmProvider> = Arc::new(OpenAiCompatibleProvider::new(&config.llm)?);
        info!(
            provider = provider.name(),
            model = %config.llm.model,
            ocr_backend = pipeline_recognition.engine_name(),
            "Pipeline components initialized"
        );

        Ok(Self::new(
            config,
            database,
            recognition,
            pipeline_recognition,
            provider,
        ))
    }

    /// Training plan operations
    #[must_use]
    pub fn plans(&self) -> TrainingPlanManager {
        self.database.plans()
    }
}
