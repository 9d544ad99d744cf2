// ABOUTME: Route module organization for fitmend HTTP endpoints
// ABOUTME: Upload form and download flow, plus health endpoints for monitoring
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! HTTP routes.
//!
//! Each domain module exposes a struct with a `routes()` constructor; the
//! server binary composes them into one router and applies the shared
//! tower layers (tracing, body limits, timeouts).

/// Health check and system status routes
pub mod health;
/// Upload form and sport rewrite routes
pub mod upload;

/// Health route handlers
pub use health::HealthRoutes;
/// Upload route handlers
pub use upload::UploadRoutes;
