// ABOUTME: OpenAI-compatible chat completions provider used for plan structuring
// ABOUTME: Sends schema-constrained requests and forwards provider errors with their status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # `OpenAI`-Compatible Provider
//!
//! Talks to any endpoint implementing the `OpenAI` chat completions API. The
//! base URL, key, and model come from [`LlmConfig`], so the hosted API,
//! Ollama, or vLLM all work without code changes.
//!
//! Provider failures keep the provider's HTTP status: a 429 from the model
//! API reaches the caller as a 429, with the provider's message.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use super::{
    ChatMessage, ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, ResponseFormat,
    TokenUsage,
};
use crate::config::LlmConfig;
use crate::constants::timeouts;
use crate::errors::AppError;
use crate::utils::http_client::create_client_with_timeout;

/// Provider identifier used in logs and forwarded errors
const PROVIDER_NAME: &str = "openai";

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<OpenAiResponseFormat>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OpenAiResponseFormat {
    JsonSchema { json_schema: OpenAiJsonSchema },
}

#[derive(Debug, Serialize)]
struct OpenAiJsonSchema {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    schema: Value,
    strict: bool,
}

impl From<&ResponseFormat> for OpenAiResponseFormat {
    fn from(format: &ResponseFormat) -> Self {
        let ResponseFormat::JsonSchema {
            name,
            description,
            schema,
        } = format;
        // Non-strict: optional fields in the plan schema are not all listed as required
        Self::JsonSchema {
            json_schema: OpenAiJsonSchema {
                name: name.clone(),
                description: description.clone(),
                schema: schema.clone(),
                strict: false,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

impl From<&ChatMessage> for OpenAiMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role.as_str().to_owned(),
            content: msg.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(rename = "prompt_tokens")]
    prompt: u32,
    #[serde(rename = "completion_tokens")]
    completion: u32,
    #[serde(rename = "total_tokens")]
    total: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// `OpenAI`-compatible LLM provider
pub struct OpenAiCompatibleProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    default_model: String,
}

impl OpenAiCompatibleProvider {
    /// Create a provider from the structuring model settings
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &LlmConfig) -> Result<Self, AppError> {
        let client = create_client_with_timeout(timeouts::LLM_REQUEST_TIMEOUT_SECS)?;

        if config.api_key.is_none() {
            warn!("OPENAI_API_KEY is not set; requests to {} are unauthenticated", config.base_url);
        }

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            default_model: config.model.clone(),
        })
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint)
    }

    /// Add authorization header if an API key is configured
    fn add_auth_header(&self, request: RequestBuilder) -> RequestBuilder {
        if let Some(ref api_key) = self.api_key {
            request.bearer_auth(api_key)
        } else {
            request
        }
    }

    /// Turn a non-success response into an upstream error carrying the provider status
    fn parse_error_response(status: StatusCode, body: &str) -> AppError {
        let message = serde_json::from_str::<OpenAiErrorResponse>(body).map_or_else(
            |_| {
                let snippet: String = body.chars().take(200).collect();
                if snippet.trim().is_empty() {
                    format!("API error ({status})")
                } else {
                    format!("API error ({status}): {snippet}")
                }
            },
            |error_response| {
                debug!(
                    error_type = error_response.error.error_type.as_deref().unwrap_or("unknown"),
                    "Provider returned structured error"
                );
                error_response.error.message
            },
        );
        AppError::upstream(PROVIDER_NAME, status.as_u16(), message)
    }

    fn transport_error(&self, e: &reqwest::Error) -> AppError {
        error!("Failed to send request to {PROVIDER_NAME}: {e}");
        if e.is_connect() || e.is_timeout() {
            AppError::external_unavailable(
                PROVIDER_NAME,
                format!("Cannot reach {}: {e}", self.base_url),
            )
        } else {
            AppError::external_service(PROVIDER_NAME, format!("Request failed: {e}"))
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::structured()
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.default_model)))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request.model.as_deref().unwrap_or(&self.default_model);

        let openai_request = OpenAiRequest {
            model: model.to_owned(),
            messages: request.messages.iter().map(OpenAiMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.response_format.as_ref().map(Into::into),
        };

        debug!(
            "Sending chat completion request to {PROVIDER_NAME} with {} messages",
            openai_request.messages.len()
        );

        let http_request = self
            .client
            .post(self.api_url("chat/completions"))
            .json(&openai_request);

        let response = self
            .add_auth_header(http_request)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read API response: {e}");
            AppError::external_service(PROVIDER_NAME, format!("Failed to read response: {e}"))
        })?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &body));
        }

        let openai_response: OpenAiResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse API response: {e}");
            AppError::external_service(PROVIDER_NAME, format!("Failed to parse response: {e}"))
        })?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::external_service(PROVIDER_NAME, "API returned no choices"))?;

        if let Some(refusal) = choice.message.refusal {
            return Err(AppError::external_service(
                PROVIDER_NAME,
                format!("Model refused the request: {refusal}"),
            ));
        }

        let content = choice.message.content.unwrap_or_default();

        debug!(
            "Received response from {PROVIDER_NAME}: {} chars, finish_reason: {:?}",
            content.len(),
            choice.finish_reason
        );

        Ok(ChatResponse {
            content,
            model: openai_response.model,
            usage: openai_response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt,
                completion_tokens: u.completion,
                total_tokens: u.total,
            }),
            finish_reason: choice.finish_reason,
        })
    }
}
