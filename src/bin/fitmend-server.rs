// ABOUTME: Server binary: loads environment configuration, assembles the router, and serves HTTP
// ABOUTME: Upload form, rewrite endpoint, and health checks behind tracing/limit/timeout layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # fitmend server binary
//!
//! Starts the FIT sport rewriter web service.

use std::time::Duration;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing::info;

use fitmend::config::ServerConfig;
use fitmend::constants::limits;
use fitmend::logging;
use fitmend::routes::{HealthRoutes, UploadRoutes};

#[derive(Parser)]
#[command(name = "fitmend-server")]
#[command(about = "FIT sport rewriter - upload a .fit file, retag its sport, download it")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override bind address
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
    info!("Starting fitmend server");
    info!("{}", config.summary());

    let app = build_router(&config);

    let listener = TcpListener::bind((config.host.as_str(), config.http_port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Compose the route modules and shared layers
fn build_router(config: &ServerConfig) -> Router {
    Router::new()
        .merge(UploadRoutes::routes())
        .merge(HealthRoutes::routes())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            limits::REQUEST_TIMEOUT_SECS,
        )))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes))
}

/// Resolve on ctrl-c so in-flight requests can finish
async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to install ctrl-c handler");
    }
}
