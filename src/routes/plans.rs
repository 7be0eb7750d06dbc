// ABOUTME: Route handlers for stored training plans and activity details
// ABOUTME: Reads, schedule lookup, date range updates, deletes, and details patches
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Training plan routes
//!
//! Plans are addressed by id. Listing requires the `x-user-id` header.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::user_id_from_headers;
use crate::constants::paths;
use crate::database::{parse_date_field, parse_date_range};
use crate::errors::AppError;
use crate::models::{Day, TrainingPlan, Weekday};
use crate::resources::ServerResources;

/// Body of PUT /api/plans/:id
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdatePlanBody {
    /// New first day
    pub start_date: String,
    /// New last day
    pub end_date: String,
}

/// Query of GET /api/plans/:id/today
#[derive(Debug, Default, Deserialize)]
pub struct TodayQuery {
    /// Date to look up, defaults to the server's local date
    pub date: Option<String>,
}

/// Scheduled training for one calendar date
#[derive(Debug, Serialize, Deserialize)]
pub struct TodayResponse {
    /// Plan id
    pub plan_id: Uuid,
    /// Looked-up date
    pub date: NaiveDate,
    /// Day of the week of `date`
    pub day_en: Weekday,
    /// Spanish tab label for `day_en`
    pub day_label: String,
    /// Plan week covering `date`, if inside the plan
    pub week_number: Option<u32>,
    /// Scheduled day with activities, if any
    pub day: Option<Day>,
}

/// Plan list
#[derive(Debug, Serialize, Deserialize)]
pub struct ListPlansResponse {
    /// Plans, newest first
    pub plans: Vec<TrainingPlan>,
    /// Number of plans
    pub total: usize,
}

/// Training plan routes
pub struct PlanRoutes;

impl PlanRoutes {
    /// Create all plan routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(paths::PLANS, get(Self::handle_list))
            .route(
                "/api/plans/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route("/api/plans/:id/tree", get(Self::handle_tree))
            .route("/api/plans/:id/today", get(Self::handle_today))
            .route(
                "/api/activities/:id/details",
                patch(Self::handle_patch_details),
            )
            .with_state(resources)
    }

    fn parse_id(id: &str) -> Result<Uuid, AppError> {
        Uuid::parse_str(id).map_err(|_| AppError::invalid_input(format!("Invalid id '{id}'")))
    }

    /// Handle GET /api/plans
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user_id = user_id_from_headers(&headers)?;
        let plans = resources.plans().list_training_plans(&user_id).await?;
        let response = ListPlansResponse {
            total: plans.len(),
            plans,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/plans/:id - plan with weeks and days
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let plan_id = Self::parse_id(&id)?;
        let plan = resources
            .plans()
            .get_training_plan_by_id(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Training plan {id}")))?;
        Ok((StatusCode::OK, Json(plan)).into_response())
    }

    /// Handle GET /api/plans/:id/tree - full tree including activities
    async fn handle_tree(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let plan_id = Self::parse_id(&id)?;
        let plan = resources
            .plans()
            .get_training_plan_tree(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Training plan {id}")))?;
        Ok((StatusCode::OK, Json(plan)).into_response())
    }

    /// Handle GET /api/plans/:id/today
    async fn handle_today(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        Query(query): Query<TodayQuery>,
    ) -> Result<Response, AppError> {
        let plan_id = Self::parse_id(&id)?;
        let date = match query.date.as_deref() {
            Some(value) => parse_date_field("date", value)?,
            None => Local::now().date_naive(),
        };

        let plan = resources
            .plans()
            .get_training_plan_tree(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Training plan {id}")))?;

        let day_en = Weekday::of(date);
        let response = TodayResponse {
            plan_id,
            date,
            day_en,
            day_label: day_en.spanish_name().to_owned(),
            week_number: plan.week_number_on(date),
            day: plan.day_on(date).map(|(_, day)| day.clone()),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PUT /api/plans/:id - replace the date range
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        Json(body): Json<UpdatePlanBody>,
    ) -> Result<Response, AppError> {
        let plan_id = Self::parse_id(&id)?;
        let (start_date, end_date) = parse_date_range(&body.start_date, &body.end_date)?;
        let plan = resources
            .plans()
            .update_training_plan(plan_id, start_date, end_date)
            .await?;
        Ok((StatusCode::OK, Json(plan)).into_response())
    }

    /// Handle DELETE /api/plans/:id - returns the deleted plan
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let plan_id = Self::parse_id(&id)?;
        let plan = resources.plans().delete_training_plan(plan_id).await?;
        Ok((StatusCode::OK, Json(plan)).into_response())
    }

    /// Handle PATCH /api/activities/:id/details - shallow merge
    async fn handle_patch_details(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        Json(patch): Json<Value>,
    ) -> Result<Response, AppError> {
        let activity_id = Self::parse_id(&id)?;
        let details = resources
            .plans()
            .update_activity_details(activity_id, &patch)
            .await?;
        Ok((StatusCode::OK, Json(details)).into_response())
    }
}
