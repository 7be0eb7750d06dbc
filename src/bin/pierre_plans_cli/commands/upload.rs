// ABOUTME: Upload command for pierre-plans-cli
// ABOUTME: Fills the upload form once and resubmits it unchanged on transport or server failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;
use std::time::Duration;

use pierre_training_plans::{
    client::{Locale, Notice, UploadClient, UploadForm},
    database::parse_date_range,
    errors::{AppError, AppResult},
};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::helpers::display::{display_notice, display_upload_receipt};

/// Pause between attempts
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Upload one image and report the outcome in `locale`
pub async fn run(
    server: &str,
    user_id: &str,
    file: &Path,
    start_date: &str,
    end_date: &str,
    locale: Locale,
    retries: u32,
) -> AppResult<()> {
    let (start, end) = parse_date_range(start_date, end_date)?;

    let mut form = UploadForm::new(locale);
    form.attach_file(file).await?;
    form.set_dates(start, end);

    let client = UploadClient::new(server, user_id)?;
    let mut attempt = 0;
    loop {
        attempt += 1;
        info!(attempt, file = %file.display(), "Uploading training plan");
        match client.submit(&mut form).await {
            Ok(receipt) => {
                display_notice(locale, Notice::Processed);
                display_upload_receipt(&receipt);
                return Ok(());
            }
            Err(e) => {
                display_notice(locale, Notice::Failed);
                eprintln!("   {}", e.message);
                if attempt > retries || !is_retryable(&e) {
                    return Err(e);
                }
                warn!(attempt, "Upload failed, retrying with the same form");
                sleep(RETRY_DELAY).await;
            }
        }
    }
}

/// Transport failures and 5xx responses may succeed on resubmission; 4xx will not
fn is_retryable(error: &AppError) -> bool {
    error.http_status() >= 500
}
