// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory persistence: clean, truncate, summarize, embed, insert.
//!
//! The embedding is always computed from the summary, never the raw
//! content. A duplicate canonical URL is a logged no-op, not an error;
//! per-item AI or storage failures are reported to the caller, which
//! decides whether they are terminal.

use std::sync::LazyLock;

use recall_core::traits::AiProvider;
use recall_core::types::NewMemory;
use recall_core::RecallError;
use recall_storage::queries::memories;
use recall_storage::Database;
use regex::Regex;
use tracing::{debug, info};

use crate::canonical::canonicalize;

/// Boilerplate markers; cleaned text is truncated at the earliest match.
static BOILERPLATE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)Copyright",
        r"(?i)All rights reserved",
        r"(?i)subscribe to our newsletter",
        r"(?i)follow us on",
        r"(?i)sign up to read more",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Content to be persisted as a memory.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub user_id: String,
    pub url: String,
    pub title: String,
    pub content: String,
    pub source_type: String,
}

/// What persisting one item produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { id: i64, canonical_url: String },
    /// A memory for the same canonical URL already exists; nothing changed.
    Duplicate { canonical_url: String },
}

/// Collapse whitespace and cut the text at the first boilerplate marker.
pub fn clean_content(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let cut = BOILERPLATE_RES
        .iter()
        .filter_map(|re| re.find(&collapsed).map(|m| m.start()))
        .min()
        .unwrap_or(collapsed.len());
    collapsed[..cut].trim().to_string()
}

/// Cap text at `max_chars` characters, never splitting a character.
pub fn trim_for_processing(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Persist one item as a memory.
///
/// Runs the full write path: clean, truncate to `max_process_chars`,
/// summarize, embed the summary, insert. Insertion respects the
/// (user_id, canonical_url) uniqueness invariant.
pub async fn save_memory(
    db: &Database,
    provider: &dyn AiProvider,
    request: SaveRequest,
    max_process_chars: usize,
) -> Result<SaveOutcome, RecallError> {
    let canonical_url = canonicalize(&request.url);

    let cleaned = clean_content(&request.content);
    let trimmed = trim_for_processing(&cleaned, max_process_chars);
    let summary = provider.summarize(trimmed).await?;
    let embedding = provider.embed(&summary).await?;

    let inserted = memories::insert_memory(
        db,
        &NewMemory {
            user_id: request.user_id,
            url: request.url,
            canonical_url: canonical_url.clone(),
            title: request.title,
            content: cleaned,
            summary,
            embedding,
            source_type: request.source_type,
        },
    )
    .await?;

    match inserted {
        Some(id) => {
            info!(id, canonical_url = %canonical_url, "memory saved");
            Ok(SaveOutcome::Saved { id, canonical_url })
        }
        None => {
            debug!(canonical_url = %canonical_url, "duplicate canonical URL, skipping");
            Ok(SaveOutcome::Duplicate { canonical_url })
        }
    }
}
