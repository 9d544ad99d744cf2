// ABOUTME: Application constants and configuration values
// ABOUTME: Defaults, limits, and environment variable names used across config, routes, and the binary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Service identity
pub mod service {
    /// Service name used in logs and health responses
    pub const NAME: &str = "fitmend";
}

/// Default configuration values
pub mod defaults {
    /// Default HTTP bind address
    pub const HOST: &str = "0.0.0.0";
    /// Default HTTP port
    pub const HTTP_PORT: u16 = 8080;
    /// Default sport when the form omits one
    pub const SPORT: &str = "generic";
}

/// Hard limits
pub mod limits {
    /// Maximum accepted upload size in bytes (FIT activity files are small;
    /// 32 MiB leaves generous headroom for multi-day recordings)
    pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;
    /// Request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
}

/// Environment variable names
pub mod env_keys {
    /// HTTP bind address
    pub const HOST: &str = "HOST";
    /// HTTP port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// Upload size cap override
    pub const MAX_UPLOAD_BYTES: &str = "MAX_UPLOAD_BYTES";
    /// Deployment environment (development, production, testing)
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
}

/// Upload handling
pub mod upload {
    /// The only accepted upload extension
    pub const FIT_EXTENSION: &str = "fit";
    /// Prefix for the download filename
    pub const DOWNLOAD_PREFIX: &str = "modified_";
    /// Fallback filename when the upload carries none
    pub const DEFAULT_FILENAME: &str = "activity.fit";
    /// Response header carrying fallback/degradation warnings
    pub const WARNING_HEADER: &str = "x-fit-warning";
}
