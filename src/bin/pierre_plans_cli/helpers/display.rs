// ABOUTME: Output formatting helpers for pierre-plans-cli
// ABOUTME: Prints notices, plan summaries, plan trees, and the scheduled day
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use pierre_training_plans::{
    client::{Locale, Notice, UploadReceipt},
    models::{Activity, ActivityDetails, Day, TrainingPlan},
    routes::plans::TodayResponse,
};

/// Print a localized notice
pub fn display_notice(locale: Locale, notice: Notice) {
    match notice {
        Notice::Processed => println!("\nSuccess {}", locale.message(notice)),
        _ => eprintln!("\nError {}", locale.message(notice)),
    }
}

/// Print what an accepted upload produced
pub fn display_upload_receipt(receipt: &UploadReceipt) {
    println!("{}", "=".repeat(60));
    println!("   Plan ID: {}", receipt.plan.id);
    println!(
        "   Dates: {} -> {}",
        receipt.plan.start_date, receipt.plan.end_date
    );
    println!("   Weeks: {}", receipt.result.weeks.len());
    println!("   Activities: {}", receipt.result.activity_count());
    println!("{}", "=".repeat(60));
}

/// Print a one-line summary per plan
pub fn display_plan_list(plans: &[TrainingPlan]) {
    if plans.is_empty() {
        println!("No plans found");
        return;
    }
    for plan in plans {
        println!(
            "{}  {} -> {}  (created {})",
            plan.id,
            plan.start_date,
            plan.end_date,
            plan.created_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
}

/// Print a plan with whatever children were loaded
pub fn display_plan(plan: &TrainingPlan) {
    println!("\nPlan {}", plan.id);
    println!("{}", "=".repeat(60));
    println!("   User: {}", plan.user_id);
    println!("   Dates: {} -> {}", plan.start_date, plan.end_date);
    for week in &plan.weeks {
        println!("\n   Week {}", week.week_number);
        for day in &week.days {
            display_day(day, "      ");
        }
    }
}

/// Print the scheduled day for a date
pub fn display_today(today: &TodayResponse) {
    println!("\n{} ({})", today.date, today.day_label);
    match (today.week_number, &today.day) {
        (None, _) => println!("   Outside the plan's date range"),
        (Some(week), None) => println!("   Week {week}: nothing scheduled"),
        (Some(week), Some(day)) => {
            println!("   Week {week}");
            display_day(day, "   ");
        }
    }
}

fn display_day(day: &Day, indent: &str) {
    println!("{indent}{} ({})", day.day_en.spanish_name(), day.day_en);
    for activity in &day.activities {
        println!("{indent}   - {}", describe_activity(activity));
    }
}

fn describe_activity(activity: &Activity) -> String {
    let ActivityDetails {
        name,
        sets,
        reps,
        rounds,
        weight,
        duration,
        ..
    } = &activity.details;

    let mut parts = vec![format!("[{}] {name}", activity.activity_type)];
    if let (Some(sets), Some(reps)) = (sets, reps) {
        parts.push(format!("{sets}x{reps}"));
    } else if let Some(reps) = reps {
        parts.push(format!("{reps} reps"));
    }
    if let Some(rounds) = rounds {
        parts.push(format!("{rounds} rounds"));
    }
    if let Some(weight) = weight {
        parts.push(format!("@ {weight}"));
    }
    if let Some(duration) = duration {
        parts.push(format!("{duration} min"));
    }
    parts.join(" ")
}
