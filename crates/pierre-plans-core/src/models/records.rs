// ABOUTME: Persisted training plan records (plan, week, day, activity) as read back from storage
// ABOUTME: Includes schedule lookups that map a calendar date to a week and day of the plan
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::plan::{ActivityDetails, ActivityType, Weekday};

/// Stored training plan
///
/// `weeks` is empty when the plan was loaded without its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPlan {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: String,
    /// First day of the plan
    pub start_date: NaiveDate,
    /// Last day of the plan
    pub end_date: NaiveDate,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Weeks in plan order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weeks: Vec<Week>,
}

/// Stored week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Week {
    /// Unique identifier
    pub id: Uuid,
    /// Parent plan
    pub training_plan_id: Uuid,
    /// 1-based week number
    pub week_number: u32,
    /// Days in plan order
    #[serde(default)]
    pub days: Vec<Day>,
}

/// Stored day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    /// Unique identifier
    pub id: Uuid,
    /// Parent week
    pub week_id: Uuid,
    /// Day of the week
    pub day_en: Weekday,
    /// Activities in plan order, empty unless the full tree was loaded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub activities: Vec<Activity>,
}

/// Stored activity with its details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Unique identifier
    pub id: Uuid,
    /// Parent day
    pub day_id: Uuid,
    /// Activity category
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    /// Exercise attributes
    pub details: ActivityDetails,
}

impl TrainingPlan {
    /// Whether `date` falls inside the plan's date range
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// 1-based week number scheduled on `date`
    #[must_use]
    pub fn week_number_on(&self, date: NaiveDate) -> Option<u32> {
        if !self.covers(date) {
            return None;
        }
        let elapsed = (date - self.start_date).num_days();
        u32::try_from(elapsed / 7 + 1).ok()
    }

    /// Scheduled day on `date`, looked up in the loaded weeks
    #[must_use]
    pub fn day_on(&self, date: NaiveDate) -> Option<(&Week, &Day)> {
        let week_number = self.week_number_on(date)?;
        let weekday = Weekday::of(date);
        let week = self.weeks.iter().find(|w| w.week_number == week_number)?;
        let day = week.days.iter().find(|d| d.day_en == weekday)?;
        Some((week, day))
    }
}
