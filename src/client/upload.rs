// ABOUTME: Upload form state and the client that submits it to /api/completion
// ABOUTME: Only image files can be attached; the form is cleared only after a successful submission
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;

use chrono::NaiveDate;
use reqwest::multipart::Form;
use reqwest::Client;
use serde::Deserialize;
use tokio::fs;
use tracing::{debug, info, warn};

use super::{endpoint, error_from_response, Locale, Notice};
use crate::constants::{form_fields, headers, paths, timeouts};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::ingestion::DataUrl;
use crate::models::{TrainingPlan, TrainingPlanDraft};
use crate::utils::http_client::create_client_with_timeout;

/// Date format sent in the form fields
const FORM_DATE_FORMAT: &str = "%Y-%m-%d";

/// What the service returns for an accepted upload
#[derive(Debug, Clone, Deserialize)]
pub struct UploadReceipt {
    /// Stored plan, top-level fields only
    pub plan: TrainingPlan,
    /// Structured plan as validated
    pub result: TrainingPlanDraft,
}

/// Pending upload: one image and the plan's date range
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    file: Option<String>,
    file_name: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    locale: Locale,
}

impl UploadForm {
    /// Empty form rendering validation messages in `locale`
    #[must_use]
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            ..Self::default()
        }
    }

    /// Read an image from disk and hold it as a data URL
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not an image; the
    /// form keeps its previous file in that case
    pub async fn attach_file(&mut self, path: &Path) -> AppResult<()> {
        let bytes = fs::read(path).await.map_err(|e| {
            AppError::invalid_input(format!("Cannot read {}: {e}", path.display())).with_source(e)
        })?;
        self.attach_bytes(&bytes)?;
        self.file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        Ok(())
    }

    /// Hold in-memory image bytes as a data URL
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a recognized image format
    pub fn attach_bytes(&mut self, bytes: &[u8]) -> AppResult<()> {
        let format = image::guess_format(bytes)
            .map_err(|_| AppError::invalid_format(self.locale.message(Notice::ImageRequired)))?;
        self.file = Some(DataUrl::encode(format.to_mime_type(), bytes));
        self.file_name = None;
        Ok(())
    }

    /// Set the plan's date range
    pub fn set_dates(&mut self, start_date: NaiveDate, end_date: NaiveDate) {
        self.start_date = Some(start_date);
        self.end_date = Some(end_date);
    }

    /// Attached image as a data URL
    #[must_use]
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// Name of the attached file, when attached from disk
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// First day of the plan
    #[must_use]
    pub const fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    /// Last day of the plan
    #[must_use]
    pub const fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// Locale used for validation messages
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Whether nothing has been entered
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.file.is_none() && self.start_date.is_none() && self.end_date.is_none()
    }

    /// Clear every field, keeping the locale
    pub fn reset(&mut self) {
        *self = Self::new(self.locale);
    }

    /// Check required fields, in form order
    ///
    /// # Errors
    ///
    /// Returns a missing-field error with a localized message
    pub fn validate(&self) -> AppResult<(&str, NaiveDate, NaiveDate)> {
        let required = |notice: Notice, field: &str| {
            AppError::new(ErrorCode::MissingRequiredField, self.locale.message(notice))
                .with_detail("field", field)
        };
        let file = self
            .file
            .as_deref()
            .ok_or_else(|| required(Notice::FileRequired, form_fields::FILE))?;
        let start_date = self
            .start_date
            .ok_or_else(|| required(Notice::StartDateRequired, form_fields::START_DATE))?;
        let end_date = self
            .end_date
            .ok_or_else(|| required(Notice::EndDateRequired, form_fields::END_DATE))?;
        Ok((file, start_date, end_date))
    }

    fn to_multipart(&self) -> AppResult<Form> {
        let (file, start_date, end_date) = self.validate()?;
        Ok(Form::new()
            .text(form_fields::FILE, file.to_owned())
            .text(
                form_fields::START_DATE,
                start_date.format(FORM_DATE_FORMAT).to_string(),
            )
            .text(
                form_fields::END_DATE,
                end_date.format(FORM_DATE_FORMAT).to_string(),
            ))
    }
}

/// Submits upload forms to a running service
#[derive(Clone)]
pub struct UploadClient {
    client: Client,
    base_url: String,
    user_id: String,
}

impl UploadClient {
    /// Create a client acting as `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(base_url: impl Into<String>, user_id: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            client: create_client_with_timeout(timeouts::UPLOAD_TIMEOUT_SECS)?,
            base_url: base_url.into(),
            user_id: user_id.into(),
        })
    }

    /// Submit the form and clear it on success
    ///
    /// On failure the form is left populated for resubmission.
    ///
    /// # Errors
    ///
    /// Returns the validation error, a transport error, or the error the
    /// service reported
    pub async fn submit(&self, form: &mut UploadForm) -> AppResult<UploadReceipt> {
        let multipart = form.to_multipart()?;
        let url = endpoint(&self.base_url, paths::COMPLETION);
        debug!(url = %url, user_id = %self.user_id, "Submitting training plan upload");

        let response = self
            .client
            .post(&url)
            .header(headers::USER_ID, &self.user_id)
            .multipart(multipart)
            .send()
            .await
            .map_err(|e| {
                AppError::external_unavailable("pierre-training-plans", format!("Upload failed: {e}"))
            })?;

        if !response.status().is_success() {
            let error = error_from_response(response).await;
            warn!(code = ?error.code, "Upload rejected: {}", error.message);
            return Err(error);
        }

        let receipt: UploadReceipt = response.json().await.map_err(|e| {
            AppError::external_service("pierre-training-plans", format!("Invalid response: {e}"))
        })?;
        info!(plan_id = %receipt.plan.id, "Upload accepted");
        form.reset();
        Ok(receipt)
    }
}
