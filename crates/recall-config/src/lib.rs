// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the recall engine.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides.
//!
//! # Usage
//!
//! ```no_run
//! let config = recall_config::load_and_validate().expect("config errors");
//! println!("database: {}", config.storage.database_path);
//! ```

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    AppConfig, BlocklistConfig, BridgeConfig, CurationConfig, FetchConfig, IngestConfig,
    OpenAiConfig, RankingConfig, RecallConfig, StorageConfig,
};
pub use validation::ValidationError;

use recall_core::RecallError;

/// Load configuration from the XDG hierarchy and validate it.
///
/// Returns a single `RecallError::Config` carrying every violation so the
/// binary can print one actionable message and exit.
pub fn load_and_validate() -> Result<RecallConfig, RecallError> {
    let config = loader::load_config().map_err(|e| RecallError::Config(e.to_string()))?;
    validation::validate_config(&config).map_err(join_errors)?;
    Ok(config)
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<RecallConfig, RecallError> {
    let config =
        loader::load_config_from_str(toml_content).map_err(|e| RecallError::Config(e.to_string()))?;
    validation::validate_config(&config).map_err(join_errors)?;
    Ok(config)
}

fn join_errors(errors: Vec<ValidationError>) -> RecallError {
    let joined = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    RecallError::Config(joined)
}
