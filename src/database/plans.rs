// ABOUTME: Training plan persistence: nested transactional create, reads, date updates, deletes
// ABOUTME: Activity details are stored as a JSON blob and patched with a shallow merge
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::transactions::{retry_transaction, SqliteTransactionGuard};
use crate::errors::{AppError, AppResult};
use crate::models::{
    parse_plan_date, Activity, ActivityDetails, ActivityType, Day, TrainingPlan,
    TrainingPlanDraft, Week, Weekday,
};

/// Attempts for a plan tree write, including the first
const CREATE_MAX_ATTEMPTS: u32 = 3;

/// Stored date format
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a user-supplied plan date
///
/// # Errors
///
/// Returns `MISSING_REQUIRED_FIELD` for a blank value and `INVALID_INPUT`
/// for an unrecognized format
pub fn parse_date_field(field: &str, value: &str) -> AppResult<NaiveDate> {
    if value.trim().is_empty() {
        return Err(AppError::missing_field(field));
    }
    parse_plan_date(value).ok_or_else(|| {
        AppError::invalid_input(format!(
            "Invalid {field} '{value}': expected YYYY-MM-DD, MM/DD/YYYY or an RFC 3339 timestamp"
        ))
    })
}

/// Parse and check a user-supplied date range
///
/// # Errors
///
/// Returns a validation error if either date is missing or malformed, or if
/// the range ends before it starts
pub fn parse_date_range(start: &str, end: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let start_date = parse_date_field("start_date", start)?;
    let end_date = parse_date_field("end_date", end)?;
    validate_range(start_date, end_date)?;
    Ok((start_date, end_date))
}

fn validate_range(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if end < start {
        return Err(AppError::invalid_input(format!(
            "end_date {end} is before start_date {start}"
        )));
    }
    Ok(())
}

fn position(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

/// Training plan database operations
#[derive(Clone)]
pub struct TrainingPlanManager {
    pool: SqlitePool,
}

impl TrainingPlanManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a structured plan with all its weeks, days, activities, and details
    ///
    /// The whole tree is written in one transaction. Returns the top-level
    /// plan without children.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a missing user id or bad date range,
    /// or a database error if the write fails
    #[instrument(skip(self, draft), fields(user_id = %draft.user_id, weeks = draft.weeks.len()))]
    pub async fn create_training_plan(&self, draft: &TrainingPlanDraft) -> AppResult<TrainingPlan> {
        let user_id = draft.user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::missing_field("userId"));
        }
        let (start_date, end_date) = parse_date_range(&draft.start_date, &draft.end_date)?;

        let now = Utc::now();
        let plan = TrainingPlan {
            id: Uuid::new_v4(),
            user_id: user_id.to_owned(),
            start_date,
            end_date,
            created_at: now,
            updated_at: now,
            weeks: Vec::new(),
        };

        retry_transaction(|| self.insert_plan_tree(&plan, draft), CREATE_MAX_ATTEMPTS).await?;

        info!(
            plan_id = %plan.id,
            activities = draft.activity_count(),
            "Training plan created"
        );
        Ok(plan)
    }

    async fn insert_plan_tree(&self, plan: &TrainingPlan, draft: &TrainingPlanDraft) -> AppResult<()> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        let mut guard = SqliteTransactionGuard::new(tx);

        sqlx::query(
            r"
            INSERT INTO training_plans (id, user_id, start_date, end_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ",
        )
        .bind(plan.id.to_string())
        .bind(&plan.user_id)
        .bind(plan.start_date.format(DATE_FORMAT).to_string())
        .bind(plan.end_date.format(DATE_FORMAT).to_string())
        .bind(plan.created_at.to_rfc3339())
        .execute(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to create training plan: {e}")))?;

        for (week_index, week) in draft.weeks.iter().enumerate() {
            let week_id = Uuid::new_v4();
            sqlx::query(
                r"
                INSERT INTO weeks (id, training_plan_id, week_number, position)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(week_id.to_string())
            .bind(plan.id.to_string())
            .bind(i64::from(week.week_number))
            .bind(position(week_index))
            .execute(guard.executor()?)
            .await
            .map_err(|e| AppError::database(format!("Failed to create week: {e}")))?;

            for (day_index, day) in week.days.iter().enumerate() {
                let day_id = Uuid::new_v4();
                sqlx::query(
                    r"
                    INSERT INTO days (id, week_id, day_en, position)
                    VALUES ($1, $2, $3, $4)
                    ",
                )
                .bind(day_id.to_string())
                .bind(week_id.to_string())
                .bind(day.day_en.as_str())
                .bind(position(day_index))
                .execute(guard.executor()?)
                .await
                .map_err(|e| AppError::database(format!("Failed to create day: {e}")))?;

                for (activity_index, activity) in day.activities.iter().enumerate() {
                    let activity_id = Uuid::new_v4();
                    sqlx::query(
                        r"
                        INSERT INTO activities (id, day_id, activity_type, position)
                        VALUES ($1, $2, $3, $4)
                        ",
                    )
                    .bind(activity_id.to_string())
                    .bind(day_id.to_string())
                    .bind(activity.activity_type.as_str())
                    .bind(position(activity_index))
                    .execute(guard.executor()?)
                    .await
                    .map_err(|e| AppError::database(format!("Failed to create activity: {e}")))?;

                    sqlx::query(
                        r"
                        INSERT INTO activity_details (id, activity_id, details)
                        VALUES ($1, $2, $3)
                        ",
                    )
                    .bind(Uuid::new_v4().to_string())
                    .bind(activity_id.to_string())
                    .bind(serde_json::to_string(&activity.details)?)
                    .execute(guard.executor()?)
                    .await
                    .map_err(|e| {
                        AppError::database(format!("Failed to create activity details: {e}"))
                    })?;
                }
            }
        }

        guard.commit().await
    }

    /// Plan with weeks and days loaded; activities are not loaded
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_training_plan_by_id(&self, id: Uuid) -> AppResult<Option<TrainingPlan>> {
        let Some(mut plan) = self.get_plan_row(id).await? else {
            return Ok(None);
        };
        plan.weeks = self.load_weeks_with_days(id).await?;
        Ok(Some(plan))
    }

    /// Plan with the complete tree: weeks, days, activities, and details
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_training_plan_tree(&self, id: Uuid) -> AppResult<Option<TrainingPlan>> {
        let Some(mut plan) = self.get_plan_row(id).await? else {
            return Ok(None);
        };
        let mut weeks = self.load_weeks_with_days(id).await?;

        for activity in self.load_activities(id).await? {
            if let Some(day) = weeks
                .iter_mut()
                .flat_map(|week| &mut week.days)
                .find(|day| day.id == activity.day_id)
            {
                day.activities.push(activity);
            }
        }

        plan.weeks = weeks;
        Ok(Some(plan))
    }

    /// Top-level plans owned by a user, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_training_plans(&self, user_id: &str) -> AppResult<Vec<TrainingPlan>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, start_date, end_date, created_at, updated_at
            FROM training_plans
            WHERE user_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list training plans: {e}")))?;

        rows.iter().map(row_to_plan).collect()
    }

    /// Replace the plan's date range
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` if `end_date` precedes `start_date` and
    /// `RESOURCE_NOT_FOUND` if the plan does not exist
    #[instrument(skip(self))]
    pub async fn update_training_plan(
        &self,
        id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<TrainingPlan> {
        validate_range(start_date, end_date)?;

        let result = sqlx::query(
            r"
            UPDATE training_plans
            SET start_date = $1, end_date = $2, updated_at = $3
            WHERE id = $4
            ",
        )
        .bind(start_date.format(DATE_FORMAT).to_string())
        .bind(end_date.format(DATE_FORMAT).to_string())
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update training plan: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Training plan {id}")));
        }

        self.get_plan_row(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Training plan {id}")))
    }

    /// Delete a plan; weeks, days, activities, and details cascade
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if the plan does not exist
    #[instrument(skip(self))]
    pub async fn delete_training_plan(&self, id: Uuid) -> AppResult<TrainingPlan> {
        let plan = self
            .get_plan_row(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Training plan {id}")))?;

        let result = sqlx::query("DELETE FROM training_plans WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete training plan: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Training plan {id}")));
        }

        info!(plan_id = %id, "Training plan deleted");
        Ok(plan)
    }

    /// Shallow-merge `patch` over an activity's stored details
    ///
    /// Keys in `patch` replace existing keys; all other keys are kept.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` if the patch is not an object or would leave
    /// the details without a name, and `RESOURCE_NOT_FOUND` if the activity
    /// does not exist
    #[instrument(skip(self, patch))]
    pub async fn update_activity_details(
        &self,
        activity_id: Uuid,
        patch: &Value,
    ) -> AppResult<ActivityDetails> {
        let Some(patch) = patch.as_object() else {
            return Err(AppError::invalid_input("Details patch must be a JSON object"));
        };

        let row = sqlx::query("SELECT details FROM activity_details WHERE activity_id = $1")
            .bind(activity_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to read activity details: {e}")))?
            .ok_or_else(|| AppError::not_found("Activity"))?;

        let stored: String = row.get("details");
        let mut merged: Map<String, Value> = serde_json::from_str(&stored)?;
        merged.extend(patch.iter().map(|(key, value)| (key.clone(), value.clone())));

        let has_name = merged
            .get("name")
            .and_then(Value::as_str)
            .is_some_and(|name| !name.trim().is_empty());
        if !has_name {
            return Err(AppError::invalid_input(
                "Activity details must keep a non-empty name",
            ));
        }

        let details: ActivityDetails = serde_json::from_value(Value::Object(merged))
            .map_err(|e| AppError::invalid_input(format!("Invalid activity details: {e}")))?;

        sqlx::query("UPDATE activity_details SET details = $1 WHERE activity_id = $2")
            .bind(serde_json::to_string(&details)?)
            .bind(activity_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update activity details: {e}")))?;

        debug!(activity_id = %activity_id, keys = patch.len(), "Activity details patched");
        Ok(details)
    }

    async fn get_plan_row(&self, id: Uuid) -> AppResult<Option<TrainingPlan>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, start_date, end_date, created_at, updated_at
            FROM training_plans
            WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get training plan: {e}")))?;

        row.as_ref().map(row_to_plan).transpose()
    }

    async fn load_weeks_with_days(&self, plan_id: Uuid) -> AppResult<Vec<Week>> {
        let week_rows = sqlx::query(
            r"
            SELECT id, training_plan_id, week_number
            FROM weeks
            WHERE training_plan_id = $1
            ORDER BY position
            ",
        )
        .bind(plan_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load weeks: {e}")))?;

        let mut weeks = week_rows
            .iter()
            .map(row_to_week)
            .collect::<AppResult<Vec<_>>>()?;

        let day_rows = sqlx::query(
            r"
            SELECT d.id, d.week_id, d.day_en
            FROM days d
            JOIN weeks w ON w.id = d.week_id
            WHERE w.training_plan_id = $1
            ORDER BY w.position, d.position
            ",
        )
        .bind(plan_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load days: {e}")))?;

        for row in &day_rows {
            let day = row_to_day(row)?;
            if let Some(week) = weeks.iter_mut().find(|week| week.id == day.week_id) {
                week.days.push(day);
            }
        }

        Ok(weeks)
    }

    async fn load_activities(&self, plan_id: Uuid) -> AppResult<Vec<Activity>> {
        let rows = sqlx::query(
            r"
            SELECT a.id, a.day_id, a.activity_type, ad.details
            FROM activities a
            JOIN activity_details ad ON ad.activity_id = a.id
            JOIN days d ON d.id = a.day_id
            JOIN weeks w ON w.id = d.week_id
            WHERE w.training_plan_id = $1
            ORDER BY w.position, d.position, a.position
            ",
        )
        .bind(plan_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load activities: {e}")))?;

        rows.iter().map(row_to_activity).collect()
    }
}

fn parse_uuid(value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))
}

fn parse_stored_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| AppError::internal(format!("Invalid stored date '{value}': {e}")))
}

fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid stored timestamp '{value}': {e}")))
}

fn row_to_plan(row: &SqliteRow) -> AppResult<TrainingPlan> {
    let id: String = row.get("id");
    let start_date: String = row.get("start_date");
    let end_date: String = row.get("end_date");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(TrainingPlan {
        id: parse_uuid(&id)?,
        user_id: row.get("user_id"),
        start_date: parse_stored_date(&start_date)?,
        end_date: parse_stored_date(&end_date)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
        weeks: Vec::new(),
    })
}

fn row_to_week(row: &SqliteRow) -> AppResult<Week> {
    let id: String = row.get("id");
    let plan_id: String = row.get("training_plan_id");
    let week_number: i64 = row.get("week_number");

    Ok(Week {
        id: parse_uuid(&id)?,
        training_plan_id: parse_uuid(&plan_id)?,
        week_number: u32::try_from(week_number)
            .map_err(|e| AppError::internal(format!("Invalid stored week number: {e}")))?,
        days: Vec::new(),
    })
}

fn row_to_day(row: &SqliteRow) -> AppResult<Day> {
    let id: String = row.get("id");
    let week_id: String = row.get("week_id");
    let day_en: String = row.get("day_en");

    Ok(Day {
        id: parse_uuid(&id)?,
        week_id: parse_uuid(&week_id)?,
        day_en: Weekday::parse(&day_en)
            .ok_or_else(|| AppError::internal(format!("Invalid stored weekday '{day_en}'")))?,
        activities: Vec::new(),
    })
}

fn row_to_activity(row: &SqliteRow) -> AppResult<Activity> {
    let id: String = row.get("id");
    let day_id: String = row.get("day_id");
    let activity_type: String = row.get("activity_type");
    let details: String = row.get("details");

    Ok(Activity {
        id: parse_uuid(&id)?,
        day_id: parse_uuid(&day_id)?,
        activity_type: ActivityType::parse(&activity_type),
        details: serde_json::from_str(&details)?,
    })
}
