// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: In-memory database, fixture images, a scripted language model, and a fake OCR engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `pierre_training_plans`

use std::collections::VecDeque;
use std::env;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use anyhow::Result;
use async_trait::async_trait;
use image::{ImageBuffer, ImageFormat, Rgb};
use pierre_training_plans::{
    config::{DatabaseConfig, DatabaseUrl, ServerConfig},
    database::Database,
    errors::{AppError, AppResult},
    ingestion::{DataUrl, RawImage},
    llm::{ChatRequest, ChatResponse, LlmCapabilities, LlmProvider},
    ocr::{RecognitionEngine, RecognitionService, RecognitionSession},
    resources::ServerResources,
};
use serde_json::json;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG controls the level; tests stay quiet by default
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    let config = DatabaseConfig {
        url: DatabaseUrl::Memory,
    };
    Ok(Database::new(&config).await?)
}

/// Small RGB PNG, as a phone camera upload would be after conversion
pub fn fixture_png() -> Vec<u8> {
    let image = ImageBuffer::from_fn(8, 4, |x, _| {
        if x % 2 == 0 {
            Rgb([0_u8, 0, 0])
        } else {
            Rgb([255_u8, 255, 255])
        }
    });
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode fixture png");
    bytes
}

/// The fixture PNG as a data URL
pub fn fixture_data_url() -> String {
    DataUrl::encode("image/png", &fixture_png())
}

/// Model answer for a one-day plan: Monday, Squat 3x10
pub fn squat_plan_json(user_id: &str, start_date: &str, end_date: &str) -> String {
    json!({
        "userId": user_id,
        "start_date": start_date,
        "end_date": end_date,
        "weeks": [{
            "weekNumber": 1,
            "days": [{
                "day_en": "MONDAY",
                "activities": [{
                    "type": "WEIGHTLIFTING",
                    "details": {"name": "Squat", "sets": "3", "reps": "10"}
                }]
            }]
        }]
    })
    .to_string()
}

/// Two-week plan with several activities, used by persistence tests
pub fn two_week_plan_json(user_id: &str) -> String {
    json!({
        "userId": user_id,
        "start_date": "2024-01-01",
        "end_date": "2024-01-14",
        "weeks": [
            {
                "weekNumber": 1,
                "days": [
                    {
                        "day_en": "MONDAY",
                        "activities": [
                            {"type": "MOBILITY", "details": {"name": "Hip openers", "duration": 10.0}},
                            {"type": "WEIGHTLIFTING", "details": {"name": "Back squat", "sets": "5", "reps": "5", "weight": 80.0}}
                        ]
                    },
                    {
                        "day_en": "WEDNESDAY",
                        "activities": [
                            {"type": "AMRAP", "details": {"name": "Burpees", "duration": 12.0, "RPE": "8"}}
                        ]
                    }
                ]
            },
            {
                "weekNumber": 2,
                "days": [
                    {
                        "day_en": "MONDAY",
                        "activities": [
                            {"type": "CARDIO", "details": {"name": "Row", "work_interval": "500m", "rest_interval": "1:00", "rounds": "4"}}
                        ]
                    }
                ]
            }
        ]
    })
    .to_string()
}

/// One scripted model turn
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Answer with this content
    Content(String),
    /// Fail like the provider API with this status
    Upstream(u16, String),
}

/// Language model that replays scripted answers and records requests
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    /// Provider replaying `replies` in order
    pub fn new(replies: Vec<ScriptedReply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Provider answering once with `content`
    pub fn answering(content: String) -> Arc<Self> {
        Self::new(vec![ScriptedReply::Content(content)])
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of completions requested
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::structured()
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted provider ran out of replies");
        match reply {
            ScriptedReply::Content(content) => Ok(ChatResponse {
                content,
                model: "scripted-model".to_owned(),
                usage: None,
                finish_reason: Some("stop".to_owned()),
            }),
            ScriptedReply::Upstream(status, message) => {
                Err(AppError::upstream("scripted", status, message))
            }
        }
    }
}

/// Counters shared between a [`FakeEngine`] and its sessions
#[derive(Debug, Default)]
pub struct SessionCounters {
    /// Sessions opened
    pub opened: AtomicUsize,
    /// Sessions closed
    pub closed: AtomicUsize,
}

impl SessionCounters {
    /// Sessions opened so far
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Sessions closed so far
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Recognition engine returning fixed text, or failing
pub struct FakeEngine {
    text: Option<String>,
    counters: Arc<SessionCounters>,
}

impl FakeEngine {
    /// Engine recognizing `text` on every page
    pub fn recognizing(text: &str) -> (Arc<Self>, Arc<SessionCounters>) {
        let counters = Arc::new(SessionCounters::default());
        (
            Arc::new(Self {
                text: Some(text.to_owned()),
                counters: Arc::clone(&counters),
            }),
            counters,
        )
    }

    /// Engine whose sessions always fail
    pub fn failing() -> (Arc<Self>, Arc<SessionCounters>) {
        let counters = Arc::new(SessionCounters::default());
        (
            Arc::new(Self {
                text: None,
                counters: Arc::clone(&counters),
            }),
            counters,
        )
    }
}

#[async_trait]
impl RecognitionEngine for FakeEngine {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn open_session(&self) -> AppResult<Box<dyn RecognitionSession>> {
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            text: self.text.clone(),
            counters: Arc::clone(&self.counters),
        }))
    }
}

struct FakeSession {
    text: Option<String>,
    counters: Arc<SessionCounters>,
}

#[async_trait]
impl RecognitionSession for FakeSession {
    async fn recognize(&mut self, image: &RawImage) -> AppResult<String> {
        assert!(image.width() > 0 && image.height() > 0);
        self.text
            .clone()
            .ok_or_else(|| AppError::external_service("ocr", "engine crashed"))
    }

    async fn close(self: Box<Self>) {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Server resources backed by an in-memory database and test doubles
pub async fn create_test_resources(
    provider: Arc<dyn LlmProvider>,
    engine: Arc<dyn RecognitionEngine>,
) -> Result<Arc<ServerResources>> {
    let database = create_test_database().await?;
    let recognition = RecognitionService::new(engine);
    Ok(Arc::new(ServerResources::new(
        ServerConfig::default(),
        database,
        recognition.clone(),
        recognition,
        provider,
    )))
}
