// ABOUTME: Pierre Plans CLI - uploads training plan images and inspects stored plans
// ABOUTME: Talks to a running pierre-plans-server over HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Upload a photographed plan for January
//! pierre-plans-cli upload --file plan.jpg --start-date 2024-01-01 --end-date 2024-01-28
//!
//! # Retry twice on failure, English notices
//! pierre-plans-cli upload --file plan.jpg --start-date 1/1/2024 --end-date 1/28/2024 \
//!     --locale en --retries 2
//!
//! # List plans, then show one with every activity
//! pierre-plans-cli list
//! pierre-plans-cli show 0b6a7c1e-0000-4000-8000-000000000000 --tree
//!
//! # What is scheduled today
//! pierre-plans-cli today 0b6a7c1e-0000-4000-8000-000000000000
//! ```

mod commands;
mod helpers;

use std::env;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pierre_training_plans::{client::Locale, constants::defaults, errors::AppResult};
use tracing::debug;
use uuid::Uuid;

type Result<T> = AppResult<T>;

/// Identity used when neither `--user-id` nor `PIERRE_USER_ID` is set
const DEFAULT_USER_ID: &str = "cli-user";

#[derive(Parser)]
#[command(
    name = "pierre-plans-cli",
    about = "Pierre Training Plans CLI",
    long_about = "Upload training plan images to a Pierre Training Plans server and inspect the stored plans."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Server base URL (defaults to `PIERRE_PLANS_URL` or the local server)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Caller identity sent as `x-user-id` (defaults to `PIERRE_USER_ID`)
    #[arg(long, global = true)]
    user_id: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Upload a training plan image
    Upload {
        /// Image file (PNG, JPEG, WebP, ...)
        #[arg(long)]
        file: PathBuf,

        /// First day of the plan (YYYY-MM-DD or M/D/YYYY)
        #[arg(long)]
        start_date: String,

        /// Last day of the plan (YYYY-MM-DD or M/D/YYYY)
        #[arg(long)]
        end_date: String,

        /// Notice language (es, en)
        #[arg(long, default_value = "es")]
        locale: Locale,

        /// Extra attempts after a transport or server failure
        #[arg(long, default_value = "0")]
        retries: u32,
    },

    /// List the caller's plans
    List,

    /// Show one plan
    Show {
        /// Plan ID
        plan_id: Uuid,

        /// Include every activity
        #[arg(long)]
        tree: bool,
    },

    /// Show the day scheduled on a date
    Today {
        /// Plan ID
        plan_id: Uuid,

        /// Date to look up (defaults to the server's current date)
        #[arg(long)]
        date: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let server = cli
        .server
        .or_else(|| env::var("PIERRE_PLANS_URL").ok())
        .unwrap_or_else(|| defaults::SERVER_URL.to_owned());
    let user_id = cli
        .user_id
        .or_else(|| env::var("PIERRE_USER_ID").ok())
        .unwrap_or_else(|| DEFAULT_USER_ID.to_owned());
    debug!(server = %server, user_id = %user_id, "Pierre Plans CLI");

    match cli.command {
        Command::Upload {
            file,
            start_date,
            end_date,
            locale,
            retries,
        } => {
            commands::upload::run(
                &server,
                &user_id,
                &file,
                &start_date,
                &end_date,
                locale,
                retries,
            )
            .await?;
        }
        Command::List => commands::show::list(&server, &user_id).await?,
        Command::Show { plan_id, tree } => {
            commands::show::plan(&server, &user_id, plan_id, tree).await?;
        }
        Command::Today { plan_id, date } => {
            commands::show::today(&server, &user_id, plan_id, date.as_deref()).await?;
        }
    }

    Ok(())
}
