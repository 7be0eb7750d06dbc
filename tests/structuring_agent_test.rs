// ABOUTME: Integration tests for the plan structuring agent
// ABOUTME: Covers the schema-constrained request, the correction retry, and provider error passthrough
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{squat_plan_json, ScriptedProvider, ScriptedReply};
use pierre_training_plans::{
    config::LlmConfig,
    errors::ErrorCode,
    llm::{MessageRole, ResponseFormat},
    models::{ActivityType, Weekday},
    structuring::{prompt::CORRECTION_MESSAGE, PlanPrompt, PlanStructuringAgent},
};

const PROMPT: PlanPrompt<'static> = PlanPrompt {
    text: "Monday: Squat 3x10",
    user_id: "user_1",
    start_date: "2024-01-01",
    end_date: "2024-01-07",
};

#[tokio::test]
async fn test_structure_sends_schema_constrained_request() {
    common::init_test_logging();
    let provider = ScriptedProvider::answering(squat_plan_json("user_1", "2024-01-01", "2024-01-07"));
    let agent = PlanStructuringAgent::new(provider.clone(), &LlmConfig::default());

    let draft = agent.structure(&PROMPT).await.unwrap();

    let activity = &draft.weeks[0].days[0].activities[0];
    assert_eq!(draft.weeks[0].days[0].day_en, Weekday::Monday);
    assert_eq!(activity.activity_type, ActivityType::Weightlifting);
    assert_eq!(activity.details.name, "Squat");

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.model.as_deref(), Some("gpt-4"));
    assert!((request.temperature.unwrap() - 0.1).abs() < f32::EPSILON);
    let ResponseFormat::JsonSchema { name, .. } = request.response_format.as_ref().unwrap();
    assert_eq!(name, "training_plan_parser");
    assert_eq!(request.messages[0].role, MessageRole::System);
    assert!(request.messages[1].content.contains("Monday: Squat 3x10"));
}

#[tokio::test]
async fn test_structure_retries_once_with_correction() {
    common::init_test_logging();
    let provider = ScriptedProvider::new(vec![
        ScriptedReply::Content("Here is your plan: Monday squats".to_owned()),
        ScriptedReply::Content(format!(
            "```json\n{}\n```",
            squat_plan_json("user_1", "2024-01-01", "2024-01-07")
        )),
    ]);
    let agent = PlanStructuringAgent::new(provider.clone(), &LlmConfig::default());

    let draft = agent.structure(&PROMPT).await.unwrap();
    assert_eq!(draft.activity_count(), 1);

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    let retry = &requests[1].messages;
    assert_eq!(retry.len(), 4);
    assert_eq!(retry[2].role, MessageRole::Assistant);
    assert_eq!(retry[2].content, "Here is your plan: Monday squats");
    assert_eq!(retry[3].role, MessageRole::User);
    assert!(retry[3].content.starts_with(CORRECTION_MESSAGE));
}

#[tokio::test]
async fn test_structure_gives_up_after_retries() {
    common::init_test_logging();
    let provider = ScriptedProvider::new(vec![
        ScriptedReply::Content("not json".to_owned()),
        ScriptedReply::Content(r#"{"weeks": "nope"}"#.to_owned()),
    ]);
    let agent = PlanStructuringAgent::new(provider.clone(), &LlmConfig::default());

    let err = agent.structure(&PROMPT).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::SchemaValidationFailed);
    assert_eq!(err.http_status(), 502);
    assert_eq!(err.details["attempts"], 2);
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn test_structure_respects_configured_retries() {
    common::init_test_logging();
    let provider = ScriptedProvider::new(vec![ScriptedReply::Content(String::new())]);
    let config = LlmConfig {
        schema_retries: 0,
        ..LlmConfig::default()
    };
    let agent = PlanStructuringAgent::new(provider.clone(), &config);

    let err = agent.structure(&PROMPT).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::SchemaValidationFailed);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_provider_errors_are_not_retried() {
    common::init_test_logging();
    let provider = ScriptedProvider::new(vec![ScriptedReply::Upstream(
        429,
        "Rate limit reached for gpt-4".to_owned(),
    )]);
    let agent = PlanStructuringAgent::new(provider.clone(), &LlmConfig::default());

    let err = agent.structure(&PROMPT).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::UpstreamProviderError);
    assert_eq!(err.http_status(), 429);
    assert_eq!(err.message, "Rate limit reached for gpt-4");
    assert_eq!(provider.call_count(), 1);
}
