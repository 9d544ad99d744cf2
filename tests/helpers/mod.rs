// ABOUTME: Test helper module organization
// ABOUTME: Shared HTTP testing utilities for integration tests

/// Axum HTTP testing helpers
pub mod axum_test;
