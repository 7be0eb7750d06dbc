// ABOUTME: Training plan vocabulary and the structured plan draft emitted by the structuring agent
// ABOUTME: Weekday and activity enumerations, activity details, and plan date parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Weekday as ChronoWeekday};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Day of the week, English-named as it appears in structured plans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Weekday {
    /// Monday
    Monday,
    /// Tuesday
    Tuesday,
    /// Wednesday
    Wednesday,
    /// Thursday
    Thursday,
    /// Friday
    Friday,
    /// Saturday
    Saturday,
    /// Sunday
    Sunday,
}

impl Weekday {
    /// All days, Monday first
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Convert to the stored representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Monday => "MONDAY",
            Self::Tuesday => "TUESDAY",
            Self::Wednesday => "WEDNESDAY",
            Self::Thursday => "THURSDAY",
            Self::Friday => "FRIDAY",
            Self::Saturday => "SATURDAY",
            Self::Sunday => "SUNDAY",
        }
    }

    /// Spanish display name used by the dashboard tabs
    #[must_use]
    pub const fn spanish_name(&self) -> &'static str {
        match self {
            Self::Monday => "Lunes",
            Self::Tuesday => "Martes",
            Self::Wednesday => "Miércoles",
            Self::Thursday => "Jueves",
            Self::Friday => "Viernes",
            Self::Saturday => "Sábado",
            Self::Sunday => "Domingo",
        }
    }

    /// Parse case-insensitively (`MONDAY`, `monday`, `Monday`)
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|day| day.as_str() == upper)
    }

    /// Day of the week for a calendar date
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self::from(date.weekday())
    }
}

impl From<ChronoWeekday> for Weekday {
    fn from(day: ChronoWeekday) -> Self {
        match day {
            ChronoWeekday::Mon => Self::Monday,
            ChronoWeekday::Tue => Self::Tuesday,
            ChronoWeekday::Wed => Self::Wednesday,
            ChronoWeekday::Thu => Self::Thursday,
            ChronoWeekday::Fri => Self::Friday,
            ChronoWeekday::Sat => Self::Saturday,
            ChronoWeekday::Sun => Self::Sunday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of activity categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    /// Mobility work
    Mobility,
    /// Strength work with external load
    Weightlifting,
    /// Conditioning
    Cardio,
    /// Tabata intervals
    Tabata,
    /// Core work
    Core,
    /// Stretching
    Stretching,
    /// Rest day or rest block
    Rest,
    /// As many rounds as possible
    Amrap,
    /// Every minute on the minute
    Emom,
    /// Timed workout
    ForTime,
    /// Anything else
    Other,
}

impl ActivityType {
    /// All activity types in schema order
    pub const ALL: [Self; 11] = [
        Self::Mobility,
        Self::Weightlifting,
        Self::Cardio,
        Self::Tabata,
        Self::Core,
        Self::Stretching,
        Self::Rest,
        Self::Amrap,
        Self::Emom,
        Self::ForTime,
        Self::Other,
    ];

    /// Convert to the stored representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mobility => "MOBILITY",
            Self::Weightlifting => "WEIGHTLIFTING",
            Self::Cardio => "CARDIO",
            Self::Tabata => "TABATA",
            Self::Core => "CORE",
            Self::Stretching => "STRETCHING",
            Self::Rest => "REST",
            Self::Amrap => "AMRAP",
            Self::Emom => "EMOM",
            Self::ForTime => "FOR_TIME",
            Self::Other => "OTHER",
        }
    }

    /// Parse from the stored representation, unknown values map to `Other`
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == upper)
            .unwrap_or(Self::Other)
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-form exercise attributes for one activity
///
/// `name` is the only required attribute. Keys outside the known set are kept
/// in `extra` so the stored blob stays open-ended.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivityDetails {
    /// Exercise name
    pub name: String,
    /// Rounds, as written in the plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds: Option<String>,
    /// Repetitions, as written in the plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<String>,
    /// Sets, as written in the plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<String>,
    /// Load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Duration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Intensity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
    /// Work interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_interval: Option<String>,
    /// Rest interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_interval: Option<String>,
    /// Rate of perceived exertion
    #[serde(
        default,
        rename = "RPE",
        skip_serializing_if = "Option::is_none"
    )]
    pub rpe: Option<String>,
    /// Coach notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Attributes outside the known set
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ActivityDetails {
    /// Details carrying only a name
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Structured training plan as produced by the structuring agent
///
/// Field names follow the wire schema handed to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPlanDraft {
    /// Owning user
    #[serde(rename = "userId")]
    pub user_id: String,
    /// First day of the plan, as supplied by the user
    pub start_date: String,
    /// Last day of the plan, as supplied by the user
    pub end_date: String,
    /// Weeks in plan order
    pub weeks: Vec<WeekDraft>,
}

/// One week of a [`TrainingPlanDraft`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekDraft {
    /// 1-based week number
    #[serde(rename = "weekNumber")]
    pub week_number: u32,
    /// Days in plan order
    pub days: Vec<DayDraft>,
}

/// One day of a [`WeekDraft`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayDraft {
    /// Day of the week
    pub day_en: Weekday,
    /// Activities in plan order
    pub activities: Vec<ActivityDraft>,
}

/// One activity of a [`DayDraft`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDraft {
    /// Activity category
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    /// Exercise attributes
    pub details: ActivityDetails,
}

impl TrainingPlanDraft {
    /// Number of activities across the whole plan
    #[must_use]
    pub fn activity_count(&self) -> usize {
        self.weeks
            .iter()
            .flat_map(|week| &week.days)
            .map(|day| day.activities.len())
            .sum()
    }
}

/// Accepted textual date formats, tried in order
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Parse a plan date
///
/// Accepts ISO dates, the `M/D/YYYY` form browsers produce for
/// `toLocaleDateString`, and RFC 3339 timestamps (date part kept).
#[must_use]
pub fn parse_plan_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_weekday_parse_is_case_insensitive() {
        assert_eq!(Weekday::parse("monday"), Some(Weekday::Monday));
        assert_eq!(Weekday::parse(" SUNDAY "), Some(Weekday::Sunday));
        assert_eq!(Weekday::parse("lunes"), None);
    }

    #[test]
    fn test_weekday_of_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(Weekday::of(date), Weekday::Monday);
        assert_eq!(Weekday::of(date).spanish_name(), "Lunes");
    }

    #[test]
    fn test_activity_type_wire_names() {
        assert_eq!(
            serde_json::to_value(ActivityType::ForTime).unwrap(),
            json!("FOR_TIME")
        );
        assert_eq!(ActivityType::parse("amrap"), ActivityType::Amrap);
        assert_eq!(ActivityType::parse("yoga"), ActivityType::Other);
    }

    #[test]
    fn test_details_keep_unknown_attributes() {
        let details: ActivityDetails = serde_json::from_value(json!({
            "name": "Row",
            "RPE": "7",
            "tempo": "3-1-1"
        }))
        .unwrap();

        assert_eq!(details.rpe.as_deref(), Some("7"));
        assert_eq!(details.extra["tempo"], "3-1-1");

        let back = serde_json::to_value(&details).unwrap();
        assert_eq!(back, json!({"name": "Row", "RPE": "7", "tempo": "3-1-1"}));
    }

    #[test]
    fn test_parse_plan_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 7);
        assert_eq!(parse_plan_date("2024-01-07"), expected);
        assert_eq!(parse_plan_date("1/7/2024"), expected);
        assert_eq!(parse_plan_date("2024-01-07T10:00:00Z"), expected);
        assert_eq!(parse_plan_date(""), None);
        assert_eq!(parse_plan_date("next monday"), None);
    }
}
