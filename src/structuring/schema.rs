// ABOUTME: JSON schema describing the structured training plan handed to the language model
// ABOUTME: Field descriptions steer the model, enumerations come from the domain types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::OnceLock;

use serde_json::{json, Value};

use crate::models::{ActivityType, Weekday};

/// Schema name reported to the provider
pub const SCHEMA_NAME: &str = "training_plan_parser";

/// Schema purpose reported to the provider
pub const SCHEMA_DESCRIPTION: &str = "Parses a training plan text into a structured JSON object";

fn optional_string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn optional_number(description: &str) -> Value {
    json!({ "type": "number", "description": description })
}

fn build_schema() -> Value {
    let weekdays: Vec<&str> = Weekday::ALL.iter().map(Weekday::as_str).collect();
    let activity_types: Vec<&str> = ActivityType::ALL.iter().map(ActivityType::as_str).collect();

    let details = json!({
        "type": "object",
        "description": "the details of the activity",
        "properties": {
            "name": { "type": "string", "description": "the name of the activity" },
            "rounds": optional_string("the rounds of the activity"),
            "reps": optional_string("the reps of the activity"),
            "sets": optional_string("the sets of the activity"),
            "weight": optional_number("the weight of the activity"),
            "duration": optional_number("the duration of the activity"),
            "intensity": optional_number("the intensity of the activity"),
            "work_interval": optional_string("the work interval of the activity"),
            "rest_interval": optional_string("the rest interval of the activity"),
            "RPE": optional_string("the RPE of the activity"),
            "notes": optional_string("the notes of the activity")
        },
        "required": ["name"]
    });

    let activity = json!({
        "type": "object",
        "properties": {
            "type": {
                "type": "string",
                "enum": activity_types,
                "description": "the type of the activity"
            },
            "details": details
        },
        "required": ["type", "details"]
    });

    let day = json!({
        "type": "object",
        "properties": {
            "day_en": {
                "type": "string",
                "enum": weekdays,
                "description": "the name of the day in English"
            },
            "activities": {
                "type": "array",
                "items": activity,
                "description": "the activities of the day"
            }
        },
        "required": ["day_en", "activities"]
    });

    let week = json!({
        "type": "object",
        "properties": {
            "weekNumber": {
                "type": "integer",
                "minimum": 1,
                "description": "the number of the week"
            },
            "days": {
                "type": "array",
                "items": day,
                "description": "the days of the week"
            }
        },
        "required": ["weekNumber", "days"]
    });

    json!({
        "type": "object",
        "properties": {
            "userId": {
                "type": "string",
                "description": "the user id provided by the user"
            },
            "start_date": {
                "type": "string",
                "description": "the start date of the training plan provided by the user"
            },
            "end_date": {
                "type": "string",
                "description": "the end date of the training plan provided by the user"
            },
            "weeks": {
                "type": "array",
                "items": week,
                "description": "the weeks of the training plan"
            }
        },
        "required": ["userId", "start_date", "end_date", "weeks"]
    })
}

/// The training plan output schema, built once
#[must_use]
pub fn training_plan_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(build_schema)
}
