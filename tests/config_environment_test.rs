// ABOUTME: Tests for environment-driven server configuration
// ABOUTME: Verifies defaults, overrides, CORS parsing, and rejection of bad values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;

use pierre_training_plans::{
    config::{DatabaseUrl, RecognitionBackend, ServerConfig},
    constants::defaults,
    errors::ErrorCode,
};
use serial_test::serial;

const CONFIG_VARS: [&str; 18] = [
    "HOST",
    "HTTP_PORT",
    "ENVIRONMENT",
    "DATABASE_URL",
    "OPENAI_API_KEY",
    "OPENAI_BASE_URL",
    "PLAN_LLM_MODEL",
    "PLAN_LLM_TEMPERATURE",
    "PLAN_LLM_MAX_TOKENS",
    "PLAN_LLM_SCHEMA_RETRIES",
    "OCR_BACKEND",
    "OCR_MODEL_URL",
    "OCR_MODEL_DIR",
    "OCR_LANGUAGE",
    "OCR_PREFETCH_MODEL",
    "API_URL",
    "CORS_ALLOWED_ORIGINS",
    "MAX_UPLOAD_BYTES",
];

fn clear_config_env() {
    for key in CONFIG_VARS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_config_env();

    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.host, defaults::HOST);
    assert_eq!(config.http_port, defaults::HTTP_PORT);
    assert_eq!(config.llm.model, "gpt-4");
    assert_eq!(config.llm.schema_retries, 1);
    assert!(config.llm.api_key.is_none());
    assert_eq!(config.recognition.backend, RecognitionBackend::Local);
    assert_eq!(config.recognition.model_file_name(), "eng.traineddata");
    assert_eq!(config.recognition.internal_api_url, "http://127.0.0.1:8081");
    assert!(config.cors.allowed_origins.is_empty());
    assert_eq!(config.max_upload_bytes, defaults::MAX_UPLOAD_BYTES);
}

#[test]
#[serial]
fn test_overrides_are_applied() {
    clear_config_env();
    env::set_var("HTTP_PORT", "9090");
    env::set_var("OCR_BACKEND", "remote");
    env::set_var("API_URL", "http://ocr.internal:8081/");
    env::set_var("PLAN_LLM_MODEL", "gpt-4o-mini");
    env::set_var("PLAN_LLM_MAX_TOKENS", "2048");
    env::set_var("DATABASE_URL", "sqlite::memory:");

    let config = ServerConfig::from_env().unwrap();
    clear_config_env();

    assert_eq!(config.http_port, 9090);
    assert_eq!(config.recognition.backend, RecognitionBackend::Remote);
    assert_eq!(config.recognition.internal_api_url, "http://ocr.internal:8081");
    assert_eq!(config.llm.model, "gpt-4o-mini");
    assert_eq!(config.llm.max_tokens, Some(2048));
    assert!(matches!(config.database.url, DatabaseUrl::Memory));
}

#[test]
#[serial]
fn test_api_url_defaults_to_listen_address() {
    clear_config_env();
    env::set_var("HOST", "0.0.0.0");
    env::set_var("HTTP_PORT", "7000");

    let config = ServerConfig::from_env().unwrap();
    clear_config_env();

    assert_eq!(config.recognition.internal_api_url, "http://0.0.0.0:7000");
}

#[test]
#[serial]
fn test_cors_origin_list_parsing() {
    clear_config_env();
    env::set_var(
        "CORS_ALLOWED_ORIGINS",
        "http://localhost:3000, https://plans.example.com ,,",
    );

    let config = ServerConfig::from_env().unwrap();
    clear_config_env();

    assert_eq!(
        config.cors.allowed_origins,
        vec!["http://localhost:3000", "https://plans.example.com"]
    );

    env::set_var("CORS_ALLOWED_ORIGINS", "*");
    let wildcard = ServerConfig::from_env().unwrap();
    clear_config_env();
    assert!(wildcard.cors.allowed_origins.is_empty());
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
    clear_config_env();
    env::set_var("HTTP_PORT", "not-a-port");
    let error = ServerConfig::from_env().unwrap_err();
    clear_config_env();
    assert_eq!(error.code, ErrorCode::ConfigInvalid);
    assert!(error.message.contains("HTTP_PORT"));

    env::set_var("OCR_BACKEND", "cloud");
    let error = ServerConfig::from_env().unwrap_err();
    clear_config_env();
    assert!(error.message.contains("OCR_BACKEND"));

    env::set_var("API_URL", "not a url");
    let error = ServerConfig::from_env().unwrap_err();
    clear_config_env();
    assert!(error.message.contains("API_URL"));
}

#[test]
#[serial]
fn test_summary_redacts_api_key() {
    clear_config_env();
    env::set_var("OPENAI_API_KEY", "sk-secret-value");

    let config = ServerConfig::from_env().unwrap();
    clear_config_env();

    let summary = config.summary();
    assert!(summary.contains("api key set"));
    assert!(!summary.contains("sk-secret-value"));
}
