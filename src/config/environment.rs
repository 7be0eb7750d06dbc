// ABOUTME: Environment configuration for the ingestion service
// ABOUTME: Parses environment variables into one typed ServerConfig handed to component constructors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management
//!
//! Configuration is read once at startup. Components receive the relevant
//! sub-struct through their constructors and never read the environment
//! themselves.

use std::env;
use std::fmt::{self, Display};
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::constants::defaults;
use crate::errors::{AppError, AppResult};

/// Environment type for deployment-specific behavior
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// SQLite database with file path
    SQLite {
        /// Database file
        path: PathBuf,
    },
    /// In-memory SQLite (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from a `sqlite:` URL or a bare file path
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        let path_str = s
            .strip_prefix("sqlite://")
            .or_else(|| s.strip_prefix("sqlite:"))
            .unwrap_or(s);
        if path_str == ":memory:" {
            Self::Memory
        } else {
            Self::SQLite {
                path: PathBuf::from(path_str),
            }
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::parse_url(defaults::DATABASE_URL)
    }
}

impl Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Database configuration
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
}

/// Settings for the plan structuring language model
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Provider API key
    pub api_key: Option<String>,
    /// OpenAI-compatible API base URL
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token cap
    pub max_tokens: Option<u32>,
    /// Extra attempts after a schema violation
    pub schema_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: defaults::OPENAI_BASE_URL.to_owned(),
            model: defaults::PLAN_LLM_MODEL.to_owned(),
            temperature: defaults::PLAN_LLM_TEMPERATURE,
            max_tokens: None,
            schema_retries: defaults::PLAN_LLM_SCHEMA_RETRIES,
        }
    }
}

/// Which text recognition backend serves the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognitionBackend {
    /// Run the tesseract engine in-process
    #[default]
    Local,
    /// Call the internal `/api/ocr` endpoint
    Remote,
}

impl FromStr for RecognitionBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "tesseract" => Ok(Self::Local),
            "remote" | "http" => Ok(Self::Remote),
            other => Err(format!("unknown OCR backend '{other}' (expected local or remote)")),
        }
    }
}

impl Display for RecognitionBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// Settings for text recognition
#[derive(Debug, Clone)]
pub struct RecognitionConfig {
    /// Active backend
    pub backend: RecognitionBackend,
    /// Trained model download location
    pub model_url: String,
    /// Directory holding trained models
    pub model_dir: PathBuf,
    /// Recognition language
    pub language: String,
    /// Tesseract executable
    pub tesseract_path: PathBuf,
    /// Download the model during startup
    pub prefetch_model: bool,
    /// Internal service base URL used by the remote backend
    pub internal_api_url: String,
}

impl RecognitionConfig {
    /// File name of the trained model for the configured language
    #[must_use]
    pub fn model_file_name(&self) -> String {
        format!("{}.traineddata", self.language)
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            backend: RecognitionBackend::Local,
            model_url: defaults::OCR_MODEL_URL.to_owned(),
            model_dir: PathBuf::from(defaults::OCR_MODEL_DIR),
            language: defaults::OCR_LANGUAGE.to_owned(),
            tesseract_path: PathBuf::from(defaults::TESSERACT_PATH),
            prefetch_model: false,
            internal_api_url: format!("http://{}:{}", defaults::HOST, defaults::HTTP_PORT),
        }
    }
}

/// CORS settings
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    /// Allowed origins; empty means any origin
    pub allowed_origins: Vec<String>,
}

/// Complete service configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Storage settings
    pub database: DatabaseConfig,
    /// Structuring model settings
    pub llm: LlmConfig,
    /// Text recognition settings
    pub recognition: RecognitionConfig,
    /// CORS settings
    pub cors: CorsConfig,
    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::HOST.to_owned(),
            http_port: defaults::HTTP_PORT,
            environment: Environment::Development,
            database: DatabaseConfig::default(),
            llm: LlmConfig::default(),
            recognition: RecognitionConfig::default(),
            cors: CorsConfig::default(),
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
        }
    }
}

/// Read a variable, treating empty values as unset
fn optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Read a variable or fall back to a default
fn env_var_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_owned())
}

/// Read and parse a variable, rejecting unparseable values
fn parse_env<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    optional_env(key).map_or(Ok(default), |raw| {
        raw.parse::<T>()
            .map_err(|e| AppError::config_invalid(key, format!("'{raw}' ({e})")))
    })
}

/// Read and parse an optional variable
fn parse_optional_env<T>(key: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    optional_env(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| AppError::config_invalid(key, format!("'{raw}' ({e})")))
        })
        .transpose()
}

/// Validate that a configured URL is absolute and parseable
fn validated_url(key: &str, value: String) -> AppResult<String> {
    Url::parse(&value).map_err(|e| AppError::config_invalid(key, format!("'{value}' ({e})")))?;
    Ok(value.trim_end_matches('/').to_owned())
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a variable is present but invalid
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let host = env_var_or("HOST", defaults::HOST);
        let http_port = parse_env("HTTP_PORT", defaults::HTTP_PORT)?;
        let default_api_url = format!("http://{host}:{http_port}");

        let llm = LlmConfig {
            api_key: optional_env("OPENAI_API_KEY"),
            base_url: validated_url(
                "OPENAI_BASE_URL",
                env_var_or("OPENAI_BASE_URL", defaults::OPENAI_BASE_URL),
            )?,
            model: env_var_or("PLAN_LLM_MODEL", defaults::PLAN_LLM_MODEL),
            temperature: parse_env("PLAN_LLM_TEMPERATURE", defaults::PLAN_LLM_TEMPERATURE)?,
            max_tokens: parse_optional_env("PLAN_LLM_MAX_TOKENS")?,
            schema_retries: parse_env("PLAN_LLM_SCHEMA_RETRIES", defaults::PLAN_LLM_SCHEMA_RETRIES)?,
        };

        let recognition = RecognitionConfig {
            backend: parse_env("OCR_BACKEND", RecognitionBackend::Local)?,
            model_url: validated_url(
                "OCR_MODEL_URL",
                env_var_or("OCR_MODEL_URL", defaults::OCR_MODEL_URL),
            )?,
            model_dir: PathBuf::from(env_var_or("OCR_MODEL_DIR", defaults::OCR_MODEL_DIR)),
            language: env_var_or("OCR_LANGUAGE", defaults::OCR_LANGUAGE),
            tesseract_path: PathBuf::from(env_var_or("TESSERACT_PATH", defaults::TESSERACT_PATH)),
            prefetch_model: parse_env("OCR_PREFETCH_MODEL", false)?,
            internal_api_url: validated_url("API_URL", env_var_or("API_URL", &default_api_url))?,
        };

        let allowed_origins = optional_env("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty() && *origin != "*")
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host,
            http_port,
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
            database: DatabaseConfig {
                url: DatabaseUrl::parse_url(&env_var_or("DATABASE_URL", defaults::DATABASE_URL)),
            },
            llm,
            recognition,
            cors: CorsConfig { allowed_origins },
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults::MAX_UPLOAD_BYTES)?,
        })
    }

    /// Human-readable configuration summary with secrets redacted
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Pierre Training Plans Configuration:\n\
             - Listen: {}:{}\n\
             - Environment: {}\n\
             - Database: {}\n\
             - LLM: {} at {} (temperature {}, api key {})\n\
             - OCR backend: {} (model {}, dir {})\n\
             - Internal API: {}\n\
             - Max upload: {} bytes",
            self.host,
            self.http_port,
            self.environment,
            self.database.url,
            self.llm.model,
            self.llm.base_url,
            self.llm.temperature,
            if self.llm.api_key.is_some() {
                "set"
            } else {
                "missing"
            },
            self.recognition.backend,
            self.recognition.model_file_name(),
            self.recognition.model_dir.display(),
            self.recognition.internal_api_url,
            self.max_upload_bytes,
        )
    }
}
