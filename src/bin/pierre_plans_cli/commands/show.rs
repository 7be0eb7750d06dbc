// ABOUTME: Plan inspection commands for pierre-plans-cli
// ABOUTME: Lists plans, prints one plan or its full tree, and shows the scheduled day
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use pierre_training_plans::{
    client::PlansClient, database::parse_date_field, errors::AppResult,
};
use uuid::Uuid;

use crate::helpers::display::{display_plan, display_plan_list, display_today};

/// List the caller's plans
pub async fn list(server: &str, user_id: &str) -> AppResult<()> {
    let client = PlansClient::new(server, user_id)?;
    let plans = client.list().await?;
    display_plan_list(&plans);
    Ok(())
}

/// Show one plan, optionally with every activity
pub async fn plan(server: &str, user_id: &str, plan_id: Uuid, tree: bool) -> AppResult<()> {
    let client = PlansClient::new(server, user_id)?;
    let plan = if tree {
        client.tree(plan_id).await?
    } else {
        client.plan(plan_id).await?
    };
    display_plan(&plan);
    Ok(())
}

/// Show the day scheduled on `date`
pub async fn today(
    server: &str,
    user_id: &str,
    plan_id: Uuid,
    date: Option<&str>,
) -> AppResult<()> {
    let date = date.map(|d| parse_date_field("date", d)).transpose()?;
    let client = PlansClient::new(server, user_id)?;
    let today = client.today(plan_id, date).await?;
    display_today(&today);
    Ok(())
}
