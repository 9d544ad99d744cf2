// ABOUTME: Configuration module for the fitmend server
// ABOUTME: Environment-only configuration, no files and no database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Environment-based server configuration
pub mod environment;

pub use environment::{Environment, ServerConfig};
