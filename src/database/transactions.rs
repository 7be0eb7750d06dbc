// ABOUTME: Transaction guard with rollback on drop, plus retry with backoff for transient lock errors
// ABOUTME: Used by plan creation so a plan tree is written completely or not at all
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Transaction management
//!
//! - [`TransactionGuard`] wraps a `SQLx` transaction and rolls it back unless
//!   [`TransactionGuard::commit`] is reached.
//! - [`retry_transaction`] reruns a whole unit of work when `SQLite` reports
//!   a transient locking error, with exponential backoff.
//!
//! ```text
//! retry_transaction(|| async {
//!     let mut guard = TransactionGuard::new(pool.begin().await?);
//!     sqlx::query("INSERT INTO training_plans ...").execute(guard.executor()?).await?;
//!     sqlx::query("INSERT INTO weeks ...").execute(guard.executor()?).await?;
//!     guard.commit().await
//! }, 3).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use sqlx::{Database, Sqlite, Transaction};
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::errors::{AppError, AppResult};

/// Run `f` again when it fails with a retryable database error
///
/// `max_attempts` counts the first try. Backoff doubles from 20ms.
/// Non-retryable errors (constraint violations, validation failures) are
/// returned immediately.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted, or the first
/// non-retryable error
pub async fn retry_transaction<F, Fut, T>(mut f: F, max_attempts: u32) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempts = 0;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempts += 1;
                if attempts >= max_attempts {
                    error!(attempts, error = %e, "Transaction failed after max retries");
                    return Err(e);
                }

                if is_retryable_error(&e.to_string()) {
                    let backoff_ms = 10 * (1u64 << attempts);
                    warn!(
                        attempt = attempts,
                        backoff_ms,
                        error = %e,
                        "Transaction failed with retryable error, retrying after backoff"
                    );
                    sleep(Duration::from_millis(backoff_ms)).await;
                } else {
                    return Err(e);
                }
            }
        }
    }
}

/// Whether a database error message describes a transient condition
fn is_retryable_error(error_msg: &str) -> bool {
    let error_lower = error_msg.to_lowercase();

    if error_lower.contains("constraint") {
        return false;
    }

    error_lower.contains("database is locked")
        || error_lower.contains("database table is locked")
        || error_lower.contains("busy")
        || error_lower.contains("timed out")
        || error_lower.contains("timeout")
}

/// Transaction wrapper that rolls back when dropped without a commit
pub struct TransactionGuard<'c, DB: Database> {
    transaction: Option<Transaction<'c, DB>>,
}

impl<'c, DB: Database> TransactionGuard<'c, DB> {
    /// Wrap a transaction obtained from `pool.begin()`
    #[must_use]
    pub fn new(transaction: Transaction<'c, DB>) -> Self {
        Self {
            transaction: Some(transaction),
        }
    }

    /// Commit the transaction and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails
    pub async fn commit(mut self) -> AppResult<()> {
        let tx = self
            .transaction
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed - cannot commit"))?;
        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Transaction commit failed: {e}")))?;
        debug!("Transaction committed");
        Ok(())
    }

    /// Connection to run statements inside the transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the guard was already consumed
    pub fn executor(&mut self) -> AppResult<&mut <DB as Database>::Connection> {
        self.transaction
            .as_deref_mut()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))
    }
}

impl<DB: Database> Drop for TransactionGuard<'_, DB> {
    fn drop(&mut self) {
        if self.transaction.is_some() {
            warn!("Transaction dropped without commit, rolling back");
        }
    }
}

/// `SQLite` transaction guard
pub type SqliteTransactionGuard<'c> = TransactionGuard<'c, Sqlite>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(is_retryable_error("error returned from database: database is locked"));
        assert!(is_retryable_error("pool timed out while waiting for an open connection"));
        assert!(!is_retryable_error("FOREIGN KEY constraint failed"));
        assert!(!is_retryable_error("UNIQUE constraint failed: activity_details.activity_id"));
        assert!(!is_retryable_error("Missing required field: userId"));
    }
}
