// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `recall ingest` command implementation.
//!
//! Reads a JSON export of browsing history, runs the ingestion pipeline,
//! and prints progress as it arrives.

use std::path::Path;
use std::sync::Arc;

use recall_config::RecallConfig;
use recall_core::traits::AiProvider;
use recall_core::types::{HistoryEntry, ProgressEvent};
use recall_core::RecallError;
use recall_ingest::IngestPipeline;
use recall_storage::Database;
use tokio::sync::mpsc;

pub async fn run_ingest(
    db: Database,
    provider: Arc<dyn AiProvider>,
    config: Arc<RecallConfig>,
    user_id: &str,
    file: &Path,
) -> Result<(), RecallError> {
    let raw = tokio::fs::read_to_string(file).await.map_err(|e| {
        RecallError::Config(format!("cannot read history file {}: {e}", file.display()))
    })?;
    let entries: Vec<HistoryEntry> = serde_json::from_str(&raw).map_err(|e| {
        RecallError::Config(format!("history file is not a JSON array of entries: {e}"))
    })?;

    let pipeline = IngestPipeline::new(db, provider, config)?;
    let (tx, mut rx) = mpsc::channel::<ProgressEvent>(64);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match &event.current_url {
                Some(url) => eprintln!("[{:>3}%] {} ({url})", event.percent, event.message),
                None => eprintln!("[{:>3}%] {}", event.percent, event.message),
            }
        }
    });

    let result = pipeline.run(user_id, entries, tx).await;
    let _ = printer.await;

    let report = result?;
    println!("{}", report.message);
    println!(
        "input {} / after blocklist {} / curated {} / fetched {} / saved {}",
        report.stats.total_input,
        report.stats.after_blocklist,
        report.stats.curated_count,
        report.stats.successfully_fetched,
        report.stats.final_count
    );
    Ok(())
}
