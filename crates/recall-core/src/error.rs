// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the recall engine.

use thiserror::Error;

/// The primary error type used across all recall crates.
///
/// Task-local failures (a single fetch, a single persist) are absorbed at
/// their originating component and surfaced as statistics or partial
/// results; only run-level failures propagate through this type.
#[derive(Debug, Error)]
pub enum RecallError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Network errors (page fetch failed, connection refused, DNS).
    #[error("network error: {message}")]
    Network {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// AI provider errors (API failure, malformed response, quota).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The external curation capability failed; terminal for the ingestion run.
    #[error("curation unavailable: {message}")]
    CurationUnavailable { message: String },

    /// Connectivity preflight failed; ingestion aborts before any fetch work.
    #[error("no internet connection")]
    NoConnectivity,

    /// Operation exceeded its wall-clock budget.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
