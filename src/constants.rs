// ABOUTME: Application constants for the training plan ingestion service
// ABOUTME: Defaults, header names, form field names, and API paths grouped by domain
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into small domain modules instead of one flat list.

/// Service identity used in logs and startup banners
pub mod service_names {
    /// Name of the ingestion service
    pub const PIERRE_TRAINING_PLANS: &str = "pierre-training-plans";
}

/// Default configuration values used when the environment is silent
pub mod defaults {
    /// HTTP listen host
    pub const HOST: &str = "127.0.0.1";
    /// HTTP listen port
    pub const HTTP_PORT: u16 = 8081;
    /// SQLite database location
    pub const DATABASE_URL: &str = "sqlite:./data/training_plans.db";
    /// OpenAI-compatible API base URL
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
    /// Model used for plan structuring
    pub const PLAN_LLM_MODEL: &str = "gpt-4";
    /// Sampling temperature for plan structuring
    pub const PLAN_LLM_TEMPERATURE: f32 = 0.1;
    /// Extra attempts granted after a schema violation
    pub const PLAN_LLM_SCHEMA_RETRIES: u32 = 1;
    /// Trained recognition model download location
    pub const OCR_MODEL_URL: &str =
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/eng.traineddata";
    /// Directory holding trained recognition models
    pub const OCR_MODEL_DIR: &str = "./data/tessdata";
    /// Recognition language (also the model file stem)
    pub const OCR_LANGUAGE: &str = "eng";
    /// Tesseract executable
    pub const TESSERACT_PATH: &str = "tesseract";
    /// Largest accepted request body (10 MiB)
    pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
    /// Service base URL used by the command-line client
    pub const SERVER_URL: &str = "http://127.0.0.1:8081";
}

/// Timeouts for outbound HTTP clients
pub mod timeouts {
    /// Connection timeout for every outbound client
    pub const CONNECT_TIMEOUT_SECS: u64 = 30;
    /// Request timeout for LLM completions
    pub const LLM_REQUEST_TIMEOUT_SECS: u64 = 300;
    /// Request timeout for model downloads
    pub const MODEL_DOWNLOAD_TIMEOUT_SECS: u64 = 600;
    /// Request timeout for the internal OCR endpoint
    pub const REMOTE_OCR_TIMEOUT_SECS: u64 = 120;
    /// Request timeout for uploads, which wait on the whole pipeline
    pub const UPLOAD_TIMEOUT_SECS: u64 = 600;
    /// Request timeout for plan reads
    pub const PLAN_READ_TIMEOUT_SECS: u64 = 30;
}

/// HTTP header names
pub mod headers {
    /// Caller identity supplied by the fronting auth provider
    pub const USER_ID: &str = "x-user-id";
    /// Request correlation id
    pub const REQUEST_ID: &str = "x-request-id";
}

/// Multipart form field names shared by server and client
pub mod form_fields {
    /// Data-URL encoded image
    pub const FILE: &str = "file";
    /// First day of the plan
    pub const START_DATE: &str = "start_date";
    /// Last day of the plan
    pub const END_DATE: &str = "end_date";
}

/// API paths
pub mod paths {
    /// Full ingestion pipeline
    pub const COMPLETION: &str = "/api/completion";
    /// Internal text recognition endpoint
    pub const OCR: &str = "/api/ocr";
    /// Plan collection
    pub const PLANS: &str = "/api/plans";
}
