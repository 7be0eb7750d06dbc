// ABOUTME: Multipart form reading shared by the upload endpoints
// ABOUTME: Text parts are kept as-is, binary file parts are converted to data URLs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;

use axum::extract::multipart::MultipartRejection;
use axum::extract::Multipart;

use crate::errors::{AppError, AppResult};
use crate::ingestion::DataUrl;

/// Named text fields of a multipart form
#[derive(Debug, Default)]
pub struct FormFields {
    fields: HashMap<String, String>,
}

impl FormFields {
    /// Read every part of the form
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` if the body is not a readable multipart form
    pub async fn read(multipart: Result<Multipart, MultipartRejection>) -> AppResult<Self> {
        let mut multipart = multipart
            .map_err(|e| AppError::invalid_input(format!("Expected a multipart form: {e}")))?;
        let mut fields = HashMap::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::invalid_input(format!("Malformed multipart body: {e}")))?
        {
            let Some(name) = field.name().map(ToOwned::to_owned) else {
                continue;
            };

            let value = if field.file_name().is_some() {
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::invalid_input(format!("Failed to read part '{name}': {e}"))
                })?;
                DataUrl::encode(&mime, &bytes)
            } else {
                field.text().await.map_err(|e| {
                    AppError::invalid_input(format!("Failed to read part '{name}': {e}"))
                })?
            };
            fields.insert(name, value);
        }

        Ok(Self { fields })
    }

    /// Value of a field, if present and not blank
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Value of a required field
    ///
    /// # Errors
    ///
    /// Returns `MISSING_REQUIRED_FIELD` when the field is absent or blank
    pub fn require(&self, name: &str) -> AppResult<&str> {
        self.get(name).ok_or_else(|| AppError::missing_field(name))
    }
}
