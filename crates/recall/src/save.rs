// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `recall save` command implementation.
//!
//! Fetches a single page on demand and persists it as a memory. Unlike
//! batch ingestion, failures here surface directly to the user.

use std::sync::Arc;
use std::time::Duration;

use recall_config::RecallConfig;
use recall_core::traits::AiProvider;
use recall_core::RecallError;
use recall_fetch::{fetch_single, FetchPool};
use recall_ingest::{canonicalize, save_memory, Blocklist, SaveOutcome, SaveRequest};
use recall_storage::queries::memories;
use recall_storage::Database;

pub async fn run_save(
    db: Database,
    provider: Arc<dyn AiProvider>,
    config: Arc<RecallConfig>,
    user_id: &str,
    url: &str,
) -> Result<(), RecallError> {
    let blocklist = Blocklist::new(&config.blocklist)?;
    if !blocklist.admits(url) {
        println!("This URL is blocked and will not be saved.");
        return Ok(());
    }

    let canonical_url = canonicalize(url);
    if let Some((id, _created_at)) =
        memories::find_by_canonical_url(&db, user_id, &canonical_url).await?
    {
        println!("Already saved as memory {id}.");
        return Ok(());
    }

    let pool = FetchPool::new(&config.fetch)?;
    let timeout = Duration::from_secs(config.fetch.single_timeout_secs);
    let article = fetch_single(&pool, url, timeout).await?;

    let outcome = save_memory(
        &db,
        provider.as_ref(),
        SaveRequest {
            user_id: user_id.to_string(),
            url: url.to_string(),
            title: article.title,
            content: article.text,
            source_type: "manual".to_string(),
        },
        config.ingest.max_process_chars,
    )
    .await?;

    match outcome {
        SaveOutcome::Saved { id, .. } => println!("Saved memory {id}."),
        SaveOutcome::Duplicate { .. } => println!("Already saved."),
    }
    Ok(())
}
