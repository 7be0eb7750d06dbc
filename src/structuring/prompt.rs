// ABOUTME: Prompt construction for the plan structuring agent
// ABOUTME: System instruction with the embedded schema plus the per-upload user message
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde_json::Value;

use crate::llm::ChatMessage;

/// Feedback sent back to the model after unusable output
pub const CORRECTION_MESSAGE: &str = "Please try again. There was an error parsing the response.";

const INSTRUCTION: &str = r#"Transform the provided training plan text into a structured JSON object suitable for insertion into a relational database, following the provided JSON schema for "days", "activities", and "details". The schema defines the expected structure for each part of the training plan, ensuring consistency and flexibility in data format.

The JSON object must adhere to the provided schema, organizing the diverse types of exercises and training specifics mentioned in the plan into a coherent structure for database insertion. Use "OTHER" when an activity fits no listed type. Respond with the JSON object only."#;

/// Inputs for one structuring request
#[derive(Debug, Clone, Copy)]
pub struct PlanPrompt<'a> {
    /// Extracted page text
    pub text: &'a str,
    /// Owning user
    pub user_id: &'a str,
    /// First day of the plan, as supplied
    pub start_date: &'a str,
    /// Last day of the plan, as supplied
    pub end_date: &'a str,
}

impl PlanPrompt<'_> {
    /// Initial conversation: instruction with schema, then the upload
    #[must_use]
    pub fn messages(&self, schema: &Value) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(format!("{INSTRUCTION}\n\nJSON schema:\n{schema}")),
            ChatMessage::user(self.user_message()),
        ]
    }

    fn user_message(&self) -> String {
        format!(
            "User ID: {}\nStart Date: {}\nEnd Date: {}\n\nText:\n{}",
            self.user_id, self.start_date, self.end_date, self.text
        )
    }
}

/// Follow-up message after a schema violation
#[must_use]
pub fn correction(violation: &str) -> ChatMessage {
    ChatMessage::user(format!("{CORRECTION_MESSAGE} {violation}"))
}
