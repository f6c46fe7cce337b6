// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./recall.toml` > `~/.config/recall/recall.toml`
//! > `/etc/recall/recall.toml` with environment variable overrides via the
//! `RECALL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RecallConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/recall/recall.toml` (system-wide)
/// 3. `~/.config/recall/recall.toml` (user XDG config)
/// 4. `./recall.toml` (local directory)
/// 5. `RECALL_*` environment variables
pub fn load_config() -> Result<RecallConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RecallConfig::default()))
        .merge(Toml::file("/etc/recall/recall.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("recall/recall.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("recall.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<RecallConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RecallConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RecallConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RecallConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `RECALL_OPENAI_API_KEY` must map to
/// `openai.api_key`, not `openai.api.key`.
fn env_provider() -> Env {
    Env::prefixed("RECALL_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("app_", "app.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("fetch_", "fetch.", 1)
            .replacen("curation_", "curation.", 1)
            .replacen("ranking_", "ranking.", 1)
            .replacen("ingest_", "ingest.", 1)
            .replacen("bridge_", "bridge.", 1)
            .replacen("blocklist_", "blocklist.", 1)
            .replacen("openai_", "openai.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.fetch.concurrency, 5);
        assert_eq!(config.app.log_level, "info");
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [fetch]
            concurrency = 8
            request_timeout_secs = 20

            [ranking]
            top_k = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.fetch.concurrency, 8);
        assert_eq!(config.fetch.request_timeout_secs, 20);
        assert_eq!(config.ranking.top_k, 3);
        // Untouched sections keep defaults.
        assert_eq!(config.curation.max_candidates, 500);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = load_config_from_str(
            r#"
            [fetch]
            concurency = 8
            "#,
        );
        assert!(result.is_err(), "typo'd key should be rejected");
    }

    #[test]
    #[serial]
    fn env_vars_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recall.toml");
        std::fs::write(&path, "[fetch]\nconcurrency = 2\n").unwrap();

        // set_var is unsafe in edition 2024; #[serial] keeps other
        // env-touching tests off this thread's back.
        unsafe {
            std::env::set_var("RECALL_FETCH_CONCURRENCY", "9");
            std::env::set_var("RECALL_OPENAI_API_KEY", "sk-test");
        }
        let config = load_config_from_path(&path).unwrap();
        unsafe {
            std::env::remove_var("RECALL_FETCH_CONCURRENCY");
            std::env::remove_var("RECALL_OPENAI_API_KEY");
        }

        assert_eq!(config.fetch.concurrency, 9);
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn blocklist_is_replaceable_from_toml() {
        let config = load_config_from_str(
            r#"
            [blocklist]
            domains = ["example-ads.net"]
            patterns = []
            "#,
        )
        .unwrap();
        assert_eq!(config.blocklist.domains, vec!["example-ads.net"]);
        assert!(config.blocklist.patterns.is_empty());
    }
}
