// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Environment-based configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

use crate::constants::{defaults, env_keys, limits};

/// Environment type for logging and other environment-sensitive behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP bind address
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,
    /// Deployment environment
    pub environment: Environment,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::HOST.into(),
            http_port: defaults::HTTP_PORT,
            max_upload_bytes: limits::MAX_UPLOAD_BYTES,
            environment: Environment::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Fails when a set variable cannot be parsed (e.g. a non-numeric
    /// `HTTP_PORT`); unset variables fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let host = env::var(env_keys::HOST).unwrap_or_else(|_| defaults::HOST.into());

        let http_port = match env::var(env_keys::HTTP_PORT) {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("invalid {}: {value}", env_keys::HTTP_PORT))?,
            Err(_) => defaults::HTTP_PORT,
        };

        let max_upload_bytes = match env::var(env_keys::MAX_UPLOAD_BYTES) {
            Ok(value) => value
                .parse::<usize>()
                .with_context(|| format!("invalid {}: {value}", env_keys::MAX_UPLOAD_BYTES))?,
            Err(_) => limits::MAX_UPLOAD_BYTES,
        };

        let environment = Environment::from_str_or_default(
            &env::var(env_keys::ENVIRONMENT).unwrap_or_default(),
        );

        Ok(Self {
            host,
            http_port,
            max_upload_bytes,
            environment,
        })
    }

    /// One-line configuration summary for startup logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "listening on {}:{}, environment: {}, upload cap: {} bytes",
            self.host, self.http_port, self.environment, self.max_upload_bytes
        )
    }
}
