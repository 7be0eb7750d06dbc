// ABOUTME: End-to-end tests of the image-to-plan pipeline with test doubles for OCR and the model
// ABOUTME: Verifies stage order, metadata authority, early validation, and scoped session release
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use common::{FakeEngine, ScriptedProvider, ScriptedReply, SessionCounters};
use pierre_training_plans::{
    config::LlmConfig,
    database::Database,
    errors::ErrorCode,
    models::{ActivityType, Weekday},
    ocr::RecognitionService,
    services::{PlanIngestionPipeline, PlanUpload},
    structuring::PlanStructuringAgent,
};

struct Harness {
    pipeline: PlanIngestionPipeline,
    provider: Arc<ScriptedProvider>,
    counters: Arc<SessionCounters>,
    database: Database,
}

async fn harness(
    engine: (Arc<FakeEngine>, Arc<SessionCounters>),
    replies: Vec<ScriptedReply>,
) -> Harness {
    let database = common::create_test_database().await.unwrap();
    let provider = ScriptedProvider::new(replies);
    let (engine, counters) = engine;
    let pipeline = PlanIngestionPipeline::new(
        RecognitionService::new(engine),
        PlanStructuringAgent::new(provider.clone(), &LlmConfig::default()),
        database.plans(),
    );
    Harness {
        pipeline,
        provider,
        counters,
        database,
    }
}

fn upload(user_id: &str) -> PlanUpload {
    PlanUpload {
        user_id: user_id.to_owned(),
        file: common::fixture_data_url(),
        start_date: "2024-01-01".to_owned(),
        end_date: "2024-01-07".to_owned(),
    }
}

#[tokio::test]
async fn test_upload_is_recognized_structured_and_stored() {
    let h = harness(
        FakeEngine::recognizing("Monday: Squat 3x10"),
        vec![ScriptedReply::Content(common::squat_plan_json(
            "user_1",
            "2024-01-01",
            "2024-01-07",
        ))],
    )
    .await;

    let outcome = h.pipeline.run(&upload("user_1")).await.unwrap();

    assert_eq!(outcome.plan.user_id, "user_1");
    assert_eq!(outcome.result.weeks.len(), 1);
    assert!(h.provider.requests()[0].messages[1]
        .content
        .contains("Monday: Squat 3x10"));
    assert_eq!(h.counters.opened(), 1);
    assert_eq!(h.counters.closed(), 1);

    let tree = h
        .database
        .plans()
        .get_training_plan_tree(outcome.plan.id)
        .await
        .unwrap()
        .unwrap();
    let day = &tree.weeks[0].days[0];
    assert_eq!(day.day_en, Weekday::Monday);
    let activity = &day.activities[0];
    assert_eq!(activity.activity_type, ActivityType::Weightlifting);
    assert_eq!(activity.details.name, "Squat");
    assert_eq!(activity.details.sets.as_deref(), Some("3"));
    assert_eq!(activity.details.reps.as_deref(), Some("10"));
}

#[tokio::test]
async fn test_request_metadata_overrides_model_echo() {
    let h = harness(
        FakeEngine::recognizing("Monday: Squat 3x10"),
        vec![ScriptedReply::Content(common::squat_plan_json(
            "someone_else",
            "2023-05-01",
            "2023-05-07",
        ))],
    )
    .await;

    let outcome = h.pipeline.run(&upload("user_1")).await.unwrap();

    assert_eq!(outcome.result.user_id, "user_1");
    assert_eq!(outcome.result.start_date, "2024-01-01");
    assert_eq!(outcome.plan.user_id, "user_1");
    assert_eq!(outcome.plan.start_date.to_string(), "2024-01-01");
}

#[tokio::test]
async fn test_missing_identity_fails_before_any_stage() {
    let h = harness(FakeEngine::recognizing("text"), Vec::new()).await;

    let err = h.pipeline.run(&upload("  ")).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::AuthRequired);
    assert_eq!(err.http_status(), 401);
    assert_eq!(h.counters.opened(), 0);
    assert_eq!(h.provider.call_count(), 0);
}

#[tokio::test]
async fn test_bad_dates_fail_before_recognition() {
    let h = harness(FakeEngine::recognizing("text"), Vec::new()).await;
    let mut bad = upload("user_1");
    bad.end_date = "sometime".to_owned();

    let err = h.pipeline.run(&bad).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert_eq!(h.counters.opened(), 0);
}

#[tokio::test]
async fn test_undecodable_image_is_a_client_error() {
    let h = harness(FakeEngine::recognizing("text"), Vec::new()).await;
    let mut bad = upload("user_1");
    bad.file = "data:image/png;base64,aGVsbG8gd29ybGQ=".to_owned();

    let err = h.pipeline.run(&bad).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidFormat);
    assert_eq!(err.http_status(), 400);
    assert_eq!(h.counters.opened(), 0);
}

#[tokio::test]
async fn test_recognition_failure_still_closes_session() {
    let h = harness(FakeEngine::failing(), Vec::new()).await;

    let err = h.pipeline.run(&upload("user_1")).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ExternalServiceError);
    assert_eq!(h.counters.opened(), 1);
    assert_eq!(h.counters.closed(), 1);
    assert_eq!(h.provider.call_count(), 0);
}

#[tokio::test]
async fn test_schema_failure_stores_nothing() {
    let h = harness(
        FakeEngine::recognizing("Monday: Squat 3x10"),
        vec![
            ScriptedReply::Content("nope".to_owned()),
            ScriptedReply::Content("still nope".to_owned()),
        ],
    )
    .await;

    let err = h.pipeline.run(&upload("user_1")).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::SchemaValidationFailed);
    assert!(h
        .database
        .plans()
        .list_training_plans("user_1")
        .await
        .unwrap()
        .is_empty());
}
