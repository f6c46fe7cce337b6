// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation of configuration values.
//!
//! Figment guarantees types; this pass guarantees ranges and cross-field
//! consistency, and compiles the blocklist regexes once to fail fast on
//! malformed patterns.

use thiserror::Error;

use crate::model::RecallConfig;

/// A single invalid configuration value.
#[derive(Debug, Error)]
#[error("invalid config `{key}`: {reason}")]
pub struct ValidationError {
    pub key: String,
    pub reason: String,
}

fn err(key: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError {
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Validate a loaded configuration, collecting every violation.
pub fn validate_config(config: &RecallConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.fetch.concurrency == 0 {
        errors.push(err("fetch.concurrency", "must be at least 1"));
    }
    if config.fetch.request_timeout_secs == 0 {
        errors.push(err("fetch.request_timeout_secs", "must be at least 1"));
    }
    if config.fetch.single_timeout_secs < config.fetch.request_timeout_secs {
        errors.push(err(
            "fetch.single_timeout_secs",
            "must be >= fetch.request_timeout_secs",
        ));
    }

    if config.curation.target_count == 0 {
        errors.push(err("curation.target_count", "must be at least 1"));
    }
    if config.curation.max_candidates < config.curation.target_count {
        errors.push(err(
            "curation.max_candidates",
            "must be >= curation.target_count",
        ));
    }

    if !(-1.0..=1.0).contains(&config.ranking.min_similarity) {
        errors.push(err("ranking.min_similarity", "must be within [-1, 1]"));
    }
    if config.ranking.recency_decay_days <= 0.0 {
        errors.push(err("ranking.recency_decay_days", "must be positive"));
    }
    if config.ranking.similarity_weight < 0.0 {
        errors.push(err("ranking.similarity_weight", "must be non-negative"));
    }
    if config.ranking.recency_weight < 0.0 {
        errors.push(err("ranking.recency_weight", "must be non-negative"));
    }
    if config.ranking.top_k == 0 {
        errors.push(err("ranking.top_k", "must be at least 1"));
    }

    if config.ingest.max_process_chars == 0 {
        errors.push(err("ingest.max_process_chars", "must be at least 1"));
    }

    if config.bridge.max_request_bytes == 0 {
        errors.push(err("bridge.max_request_bytes", "must be at least 1"));
    }

    for pattern in &config.blocklist.patterns {
        if let Err(e) = regex_lite_check(pattern) {
            errors.push(err("blocklist.patterns", format!("`{pattern}`: {e}")));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// regex compilation is deferred to the filter itself; here we only verify
// the pattern parses so startup fails with a config error, not mid-run.
fn regex_lite_check(pattern: &str) -> Result<(), String> {
    regex::Regex::new(pattern).map(|_| ()).map_err(|e| e.to_string())
}
