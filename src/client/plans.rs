// ABOUTME: Read-side client for stored training plans
// ABOUTME: Lists, fetches, and looks up the scheduled day of plans over HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::{endpoint, error_from_response};
use crate::constants::{headers, paths, timeouts};
use crate::errors::{AppError, AppResult};
use crate::models::TrainingPlan;
use crate::routes::plans::{ListPlansResponse, TodayResponse};
use crate::utils::http_client::create_client_with_timeout;

/// Reads plans from a running service
#[derive(Clone)]
pub struct PlansClient {
    client: Client,
    base_url: String,
    user_id: String,
}

impl PlansClient {
    /// Create a client acting as `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(base_url: impl Into<String>, user_id: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            client: create_client_with_timeout(timeouts::PLAN_READ_TIMEOUT_SECS)?,
            base_url: base_url.into(),
            user_id: user_id.into(),
        })
    }

    /// Plans owned by the client's user, newest first
    ///
    /// # Errors
    ///
    /// Returns a transport error or the error the service reported
    pub async fn list(&self) -> AppResult<Vec<TrainingPlan>> {
        let response: ListPlansResponse = self.get_json(paths::PLANS).await?;
        Ok(response.plans)
    }

    /// Plan with weeks and days
    ///
    /// # Errors
    ///
    /// Returns a transport error or the error the service reported
    pub async fn plan(&self, plan_id: Uuid) -> AppResult<TrainingPlan> {
        self.get_json(&format!("{}/{plan_id}", paths::PLANS)).await
    }

    /// Plan with the full tree including activities
    ///
    /// # Errors
    ///
    /// Returns a transport error or the error the service reported
    pub async fn tree(&self, plan_id: Uuid) -> AppResult<TrainingPlan> {
        self.get_json(&format!("{}/{plan_id}/tree", paths::PLANS))
            .await
    }

    /// Scheduled day of a plan, defaulting to the service's current date
    ///
    /// # Errors
    ///
    /// Returns a transport error or the error the service reported
    pub async fn today(&self, plan_id: Uuid, date: Option<NaiveDate>) -> AppResult<TodayResponse> {
        let path = date.map_or_else(
            || format!("{}/{plan_id}/today", paths::PLANS),
            |d| format!("{}/{plan_id}/today?date={}", paths::PLANS, d.format("%Y-%m-%d")),
        );
        self.get_json(&path).await
    }

    fn request(&self, path: &str) -> RequestBuilder {
        self.client
            .get(endpoint(&self.base_url, path))
            .header(headers::USER_ID, &self.user_id)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let response = self.request(path).send().await.map_err(|e| {
            AppError::external_unavailable("pierre-training-plans", format!("Request failed: {e}"))
        })?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response.json().await.map_err(|e| {
            AppError::external_service("pierre-training-plans", format!("Invalid response: {e}"))
        })
    }
}
