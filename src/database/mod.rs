// ABOUTME: SQLite storage for training plans: connection setup, migrations, and managers
// ABOUTME: Foreign keys are enforced so deleting a plan cascades to its whole tree
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database
//!
//! [`Database`] owns the connection pool and the schema. Domain operations
//! live on managers that borrow the pool, such as [`TrainingPlanManager`].

mod plans;
pub mod transactions;

pub use plans::{parse_date_field, parse_date_range, TrainingPlanManager};
pub use transactions::{retry_transaction, SqliteTransactionGuard, TransactionGuard};

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::fs;
use tracing::info;

use crate::config::{DatabaseConfig, DatabaseUrl};
use crate::errors::{AppError, AppResult};

/// Connection pool plus schema management
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and run migrations
    ///
    /// In-memory databases use a single long-lived connection so every query
    /// sees the same data.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated
    pub async fn new(config: &DatabaseConfig) -> AppResult<Self> {
        if let DatabaseUrl::SQLite { path } = &config.url {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await?;
            }
        }

        let options = SqliteConnectOptions::from_str(&config.url.to_connection_string())
            .map_err(|e| AppError::config_invalid("DATABASE_URL", e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if config.url.is_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open {}: {e}", config.url)))?;

        let db = Self { pool };
        db.migrate().await?;
        info!("Database ready at {}", config.url);
        Ok(db)
    }

    /// Connection pool for managers
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Training plan operations
    #[must_use]
    pub fn plans(&self) -> TrainingPlanManager {
        TrainingPlanManager::new(self.pool.clone())
    }

    /// Cheap round trip used by readiness checks
    ///
    /// # Errors
    ///
    /// Returns an error if the database does not answer
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database ping failed: {e}")))?;
        Ok(())
    }

    /// Create tables and indexes if they do not exist
    ///
    /// # Errors
    ///
    /// Returns an error if a statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        const STATEMENTS: [&str; 9] = [
            r"
            CREATE TABLE IF NOT EXISTS training_plans (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            r"
            CREATE INDEX IF NOT EXISTS idx_training_plans_user
                ON training_plans(user_id, created_at)
            ",
            r"
            CREATE TABLE IF NOT EXISTS weeks (
                id TEXT PRIMARY KEY,
                training_plan_id TEXT NOT NULL REFERENCES training_plans(id) ON DELETE CASCADE,
                week_number INTEGER NOT NULL,
                position INTEGER NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS days (
                id TEXT PRIMARY KEY,
                week_id TEXT NOT NULL REFERENCES weeks(id) ON DELETE CASCADE,
                day_en TEXT NOT NULL,
                position INTEGER NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS activities (
                id TEXT PRIMARY KEY,
                day_id TEXT NOT NULL REFERENCES days(id) ON DELETE CASCADE,
                activity_type TEXT NOT NULL,
                position INTEGER NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS activity_details (
                id TEXT PRIMARY KEY,
                activity_id TEXT NOT NULL UNIQUE REFERENCES activities(id) ON DELETE CASCADE,
                details TEXT NOT NULL
            )
            ",
            r"
            CREATE INDEX IF NOT EXISTS idx_weeks_plan ON weeks(training_plan_id, position)
            ",
            r"
            CREATE INDEX IF NOT EXISTS idx_days_week ON days(week_id, position)
            ",
            r"
            CREATE INDEX IF NOT EXISTS idx_activities_day ON activities(day_id, position)
            ",
        ];

        for statement in STATEMENTS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Migration failed: {e}")))?;
        }
        Ok(())
    }
}
