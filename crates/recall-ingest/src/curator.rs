// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Curation boundary.
//!
//! Delegates the quality judgment over candidate URLs to the injected AI
//! capability. Curation failure is terminal for an ingestion run: the
//! engine refuses to guess which pages are worth remembering.

use recall_config::CurationConfig;
use recall_core::traits::AiProvider;
use recall_core::types::{HistoryEntry, UrlCandidate};
use recall_core::RecallError;
use tracing::info;

/// Ask the AI capability for the most memory-worthy URLs among `entries`.
///
/// At most `max_candidates` entries are submitted. Returns the selected
/// URLs in the capability's preference order; an empty selection is a
/// valid outcome. Any provider failure maps to
/// [`RecallError::CurationUnavailable`].
pub async fn curate(
    provider: &dyn AiProvider,
    config: &CurationConfig,
    entries: &[HistoryEntry],
) -> Result<Vec<String>, RecallError> {
    let candidates: Vec<UrlCandidate> = entries
        .iter()
        .take(config.max_candidates)
        .map(|entry| UrlCandidate {
            url: entry.url.clone(),
            title: entry.title.clone(),
            visit_count: entry.visit_count,
        })
        .collect();

    let selected = provider
        .rank_top_urls(&candidates, config.target_count)
        .await
        .map_err(|e| RecallError::CurationUnavailable {
            message: e.to_string(),
        })?;

    info!(
        submitted = candidates.len(),
        selected = selected.len(),
        "curation complete"
    );
    Ok(selected)
}
