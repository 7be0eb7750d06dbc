// ABOUTME: Tests for the upload and plan clients against a live local service
// ABOUTME: Verifies form reset semantics, forwarded service errors, and plan reads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::NaiveDate;
use common::{FakeEngine, ScriptedProvider, ScriptedReply};
use pierre_training_plans::{
    client::{Locale, PlansClient, UploadClient, UploadForm},
    errors::ErrorCode,
    models::Weekday,
    server,
};
use tokio::net::TcpListener;
use uuid::Uuid;

const USER: &str = "client_user";

async fn spawn_service(replies: Vec<ScriptedReply>) -> String {
    let (engine, _) = FakeEngine::recognizing("Monday: Squat 3x10");
    let resources = common::create_test_resources(ScriptedProvider::new(replies), engine)
        .await
        .unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, resources));
    format!("http://{addr}")
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn filled_form(locale: Locale) -> UploadForm {
    let mut form = UploadForm::new(locale);
    form.attach_bytes(&common::fixture_png()).unwrap();
    form.set_dates(date(1), date(7));
    form
}

#[tokio::test]
async fn test_successful_upload_resets_form() {
    let base = spawn_service(vec![ScriptedReply::Content(common::squat_plan_json(
        USER,
        "2024-01-01",
        "2024-01-07",
    ))])
    .await;
    let client = UploadClient::new(&base, USER).unwrap();
    let mut form = filled_form(Locale::En);

    let receipt = client.submit(&mut form).await.unwrap();

    assert_eq!(receipt.plan.user_id, USER);
    assert_eq!(receipt.plan.start_date, date(1));
    assert_eq!(receipt.result.weeks[0].days[0].day_en, Weekday::Monday);
    assert!(form.is_empty());
    assert_eq!(form.locale(), Locale::En);
}

#[tokio::test]
async fn test_incomplete_form_is_rejected_locally() {
    let base = spawn_service(Vec::new()).await;
    let client = UploadClient::new(&base, USER).unwrap();
    let mut form = UploadForm::new(Locale::Es);
    form.attach_bytes(&common::fixture_png()).unwrap();

    let error = client.submit(&mut form).await.unwrap_err();

    assert_eq!(error.code, ErrorCode::MissingRequiredField);
    assert_eq!(error.message, "La fecha de inicio es requerida");
    assert!(form.file().is_some());
}

#[tokio::test]
async fn test_service_error_keeps_form() {
    let base = spawn_service(vec![ScriptedReply::Upstream(
        429,
        "Rate limit reached".to_owned(),
    )])
    .await;
    let client = UploadClient::new(&base, USER).unwrap();
    let mut form = filled_form(Locale::Es);

    let error = client.submit(&mut form).await.unwrap_err();

    assert_eq!(error.code, ErrorCode::UpstreamProviderError);
    assert_eq!(error.upstream_status, Some(429));
    assert_eq!(error.message, "Rate limit reached");
    assert!(!form.is_empty());
    assert_eq!(form.start_date(), Some(date(1)));
}

#[tokio::test]
async fn test_unreachable_service_is_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = UploadClient::new(format!("http://{addr}"), USER).unwrap();
    let mut form = filled_form(Locale::En);

    let error = client.submit(&mut form).await.unwrap_err();

    assert_eq!(error.code, ErrorCode::ExternalServiceUnavailable);
    assert!(!form.is_empty());
}

#[tokio::test]
async fn test_plans_client_reads_uploaded_plan() {
    let base = spawn_service(vec![ScriptedReply::Content(common::squat_plan_json(
        USER,
        "2024-01-01",
        "2024-01-07",
    ))])
    .await;
    let mut form = filled_form(Locale::Es);
    let receipt = UploadClient::new(&base, USER)
        .unwrap()
        .submit(&mut form)
        .await
        .unwrap();
    let plans = PlansClient::new(&base, USER).unwrap();

    let listed = plans.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, receipt.plan.id);

    let tree = plans.tree(receipt.plan.id).await.unwrap();
    assert_eq!(tree.weeks[0].days[0].activities[0].details.name, "Squat");

    let today = plans.today(receipt.plan.id, Some(date(1))).await.unwrap();
    assert_eq!(today.week_number, Some(1));
    assert_eq!(today.day.unwrap().activities.len(), 1);

    let other_user = PlansClient::new(&base, "someone_else").unwrap();
    assert!(other_user.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_plans_client_reports_missing_plan() {
    let base = spawn_service(Vec::new()).await;
    let plans = PlansClient::new(&base, USER).unwrap();

    let error = plans.plan(Uuid::new_v4()).await.unwrap_err();

    assert_eq!(error.code, ErrorCode::ResourceNotFound);
    assert_eq!(error.upstream_status, Some(404));
}
