// ABOUTME: Main library entry point for the fitmend FIT sport rewriter
// ABOUTME: Decode a FIT upload, rewrite its sport classification, re-encode, and serve it back
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # fitmend
//!
//! A small service that rewrites the sport classification of Garmin FIT
//! activity files. Upload a `.fit` file, pick one of the canonical sports,
//! and download the same activity re-tagged.
//!
//! ## Architecture
//!
//! - **`fit`**: the binary container codec - profile tables, CRC, decoder,
//!   encoder. Pure data transformation.
//! - **`models`**: records, typed field values, and the [`models::Sport`]
//!   enum shared by the codec and the rewriter.
//! - **`rewrite`**: the pipeline - validate the sport, decode, mutate the
//!   `file_id` record, re-encode, and fall back to the original bytes when
//!   anything but validation fails.
//! - **`routes`**: the axum upload/download surface and health endpoints.
//!
//! ## Example
//!
//! ```rust
//! use fitmend::rewrite::rewrite_sport;
//!
//! // A corrupt-but-nonempty buffer falls back to the original bytes
//! let input = vec![0x0E, 0x10, 0x00, 0x00];
//! let outcome = rewrite_sport(&input, "running").unwrap();
//! assert_eq!(outcome.bytes, input);
//! assert!(outcome.warning.is_some());
//! ```

/// Configuration management (environment-only)
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// FIT binary container codec
pub mod fit;

/// Structured logging setup
pub mod logging;

/// Domain model: records, field values, sports
pub mod models;

/// The sport rewrite pipeline
pub mod rewrite;

/// HTTP routes
pub mod routes;
