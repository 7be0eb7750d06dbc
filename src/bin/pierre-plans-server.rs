// ABOUTME: HTTP server binary for the training plan ingestion service
// ABOUTME: Loads configuration from the environment, wires resources, and serves until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![recursion_limit = "256"]

//! # Pierre Training Plans Server Binary
//!
//! Serves the upload pipeline, the internal OCR endpoint, and the plan API.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use pierre_training_plans::{
    config::ServerConfig, constants::paths, logging, resources::ServerResources, server,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "pierre-plans-server")]
#[command(about = "Pierre Training Plans - image-to-plan ingestion service")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override listen host
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }

    logging::init_from_env()?;

    info!("Starting Pierre Training Plans");
    info!("{}", config.summary());

    display_available_endpoints(&config);

    let resources = Arc::new(ServerResources::from_config(config).await?);
    info!("Ready to ingest training plans");

    if let Err(e) = server::run(resources).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

/// Display all available API endpoints
#[allow(clippy::cognitive_complexity)]
fn display_available_endpoints(config: &ServerConfig) {
    let host = &config.host;
    let port = config.http_port;

    info!("=== Available API Endpoints ===");
    info!("Pipeline:");
    info!("   Upload Plan:       POST   http://{host}:{port}{}", paths::COMPLETION);
    info!("   Recognize Text:    POST   http://{host}:{port}{}", paths::OCR);
    info!("Plans:");
    info!("   List Plans:        GET    http://{host}:{port}{}", paths::PLANS);
    info!("   Get Plan:          GET    http://{host}:{port}{}/{{id}}", paths::PLANS);
    info!("   Plan Tree:         GET    http://{host}:{port}{}/{{id}}/tree", paths::PLANS);
    info!("   Today:             GET    http://{host}:{port}{}/{{id}}/today", paths::PLANS);
    info!("   Update Dates:      PUT    http://{host}:{port}{}/{{id}}", paths::PLANS);
    info!("   Delete Plan:       DELETE http://{host}:{port}{}/{{id}}", paths::PLANS);
    info!("   Patch Details:     PATCH  http://{host}:{port}/api/activities/{{id}}/details");
    info!("Health:");
    info!("   Health Check:      GET    http://{host}:{port}/health");
    info!("   Readiness:         GET    http://{host}:{port}/ready");
    info!("=== End of Endpoint List ===");
}
