// ABOUTME: Pure validation of raw model output against the training plan shape
// ABOUTME: Strips code fences, parses JSON, deserializes, then checks plan semantics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use thiserror::Error;

use crate::models::TrainingPlanDraft;

/// Why model output was rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaViolation {
    /// Nothing came back
    #[error("the response was empty")]
    Empty,
    /// Not JSON, or JSON of the wrong shape
    #[error("the response does not match the training plan schema: {0}")]
    Shape(String),
    /// Week numbers start at 1
    #[error("week at position {position} has week number 0")]
    WeekNumber {
        /// 0-based position of the week
        position: usize,
    },
    /// Every activity needs a name
    #[error("activity {activity} of {day} in week {week} has an empty name")]
    EmptyActivityName {
        /// Week number
        week: u32,
        /// Day of the week
        day: String,
        /// 0-based position within the day
        activity: usize,
    },
}

/// Identifier fields the model sometimes echoes into details
const ECHOED_ID_KEYS: [&str; 2] = ["id", "activityId"];

/// Remove a surrounding Markdown code fence, if any
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening line
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Validate raw model output and turn it into a plan draft
///
/// # Errors
///
/// Returns a [`SchemaViolation`] describing the first problem found
pub fn validate_plan_output(raw: &str) -> Result<TrainingPlanDraft, SchemaViolation> {
    let json = strip_code_fence(raw);
    if json.is_empty() {
        return Err(SchemaViolation::Empty);
    }

    let mut draft: TrainingPlanDraft =
        serde_json::from_str(json).map_err(|e| SchemaViolation::Shape(e.to_string()))?;

    for activity in draft
        .weeks
        .iter_mut()
        .flat_map(|week| &mut week.days)
        .flat_map(|day| &mut day.activities)
    {
        for key in ECHOED_ID_KEYS {
            activity.details.extra.remove(key);
        }
    }

    for (position, week) in draft.weeks.iter().enumerate() {
        if week.week_number == 0 {
            return Err(SchemaViolation::WeekNumber { position });
        }
        for day in &week.days {
            if let Some(activity) = day
                .activities
                .iter()
                .position(|a| a.details.name.trim().is_empty())
            {
                return Err(SchemaViolation::EmptyActivityName {
                    week: week.week_number,
                    day: day.day_en.to_string(),
                    activity,
                });
            }
        }
    }

    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityType, Weekday};

    const VALID: &str = r#"{
        "userId": "user_1",
        "start_date": "2024-01-01",
        "end_date": "2024-01-07",
        "weeks": [{
            "weekNumber": 1,
            "days": [{
                "day_en": "MONDAY",
                "activities": [{
                    "id": "ignored",
                    "type": "WEIGHTLIFTING",
                    "details": {"id": "echo", "name": "Squat", "sets": "3", "reps": "10"}
                }]
            }]
        }]
    }"#;

    #[test]
    fn test_accepts_valid_output() {
        let draft = validate_plan_output(VALID).unwrap();
        let day = &draft.weeks[0].days[0];
        assert_eq!(day.day_en, Weekday::Monday);
        assert_eq!(day.activities[0].activity_type, ActivityType::Weightlifting);
        assert_eq!(day.activities[0].details.sets.as_deref(), Some("3"));
        assert!(day.activities[0].details.extra.is_empty());
    }

    #[test]
    fn test_strips_code_fences() {
        let fenced = format!("```json\n{VALID}\n```");
        assert!(validate_plan_output(&fenced).is_ok());
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {} "), "{}");
    }

    #[test]
    fn test_rejects_bad_output() {
        assert_eq!(validate_plan_output("  "), Err(SchemaViolation::Empty));
        assert!(matches!(
            validate_plan_output("Here is your plan!"),
            Err(SchemaViolation::Shape(_))
        ));
        assert!(matches!(
            validate_plan_output(&VALID.replace("MONDAY", "LUNES")),
            Err(SchemaViolation::Shape(_))
        ));
        assert_eq!(
            validate_plan_output(&VALID.replace("\"weekNumber\": 1", "\"weekNumber\": 0")),
            Err(SchemaViolation::WeekNumber { position: 0 })
        );
        assert!(matches!(
            validate_plan_output(&VALID.replace("\"Squat\"", "\" \"")),
            Err(SchemaViolation::EmptyActivityName { week: 1, .. })
        ));
    }
}
