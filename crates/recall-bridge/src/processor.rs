// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capture request processing: extract, dedup-check, persist.
//!
//! A full-page capture of an already-saved canonical URL is answered
//! with a friendly "You saved this N days ago." rejection; an explicit
//! text selection (`selectedOnly`) always saves.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use recall_config::RecallConfig;
use recall_core::traits::AiProvider;
use recall_core::RecallError;
use recall_fetch::extract::{excerpt_of, extract_article};
use recall_ingest::canonical::canonicalize;
use recall_ingest::writer::{save_memory, SaveOutcome, SaveRequest};
use recall_storage::queries::memories;
use recall_storage::Database;
use tracing::{debug, warn};

use crate::protocol::{BridgeRequest, BridgeResponse, Processed};

/// Source type recorded for memories captured through the bridge.
const WEB_SOURCE: &str = "web";

/// Handles parsed bridge requests.
#[derive(Clone)]
pub struct BridgeProcessor {
    db: Database,
    provider: Arc<dyn AiProvider>,
    config: Arc<RecallConfig>,
}

impl BridgeProcessor {
    pub fn new(db: Database, provider: Arc<dyn AiProvider>, config: Arc<RecallConfig>) -> Self {
        Self {
            db,
            provider,
            config,
        }
    }

    /// Process one capture request into its response.
    pub async fn handle(&self, request: BridgeRequest) -> Result<BridgeResponse, RecallError> {
        let Some(url) = request.url.clone().filter(|u| !u.is_empty()) else {
            return Ok(BridgeResponse::rejection(request.id, "invalid_request"));
        };
        let canonical_url = canonicalize(&url);

        if !request.selected_only {
            if let Some((id, created_at)) =
                memories::find_by_canonical_url(&self.db, &self.user_id(), &canonical_url).await?
            {
                debug!(canonical_url = %canonical_url, "duplicate capture rejected");
                return Ok(BridgeResponse {
                    id: request.id,
                    ok: false,
                    reason: Some(format!("You saved this {}.", time_ago(&created_at))),
                    processed: Some(Processed {
                        saved_id: Some(id),
                        ..Default::default()
                    }),
                });
            }
        }

        let mut title = request.title.clone().unwrap_or_default();
        let mut content = request.text.clone().unwrap_or_default();
        let mut word_count = request.word_count.unwrap_or(0);
        let mut byline = None;
        let mut excerpt = None;
        let mut reading_time = None;

        if let Some(html) = request.html.as_deref().filter(|h| !h.is_empty()) {
            match extract_article(html, self.config.fetch.min_content_length) {
                Ok(article) => {
                    if !article.title.is_empty() {
                        title = article.title;
                    }
                    content = article.text;
                    word_count = article.word_count;
                    byline = article.byline;
                    excerpt = Some(article.excerpt);
                    reading_time = Some(article.reading_time);
                }
                Err(e) => {
                    // Fall back to the agent-supplied plain text.
                    debug!(url = %url, error = %e, "extraction failed, using raw text");
                }
            }
        }
        let excerpt = excerpt.unwrap_or_else(|| excerpt_of(&content));

        let outcome = save_memory(
            &self.db,
            self.provider.as_ref(),
            SaveRequest {
                user_id: self.user_id(),
                url: url.clone(),
                title: title.clone(),
                content: content.clone(),
                source_type: WEB_SOURCE.to_string(),
            },
            self.config.ingest.max_process_chars,
        )
        .await?;

        let saved_id = match outcome {
            SaveOutcome::Saved { id, .. } => id,
            SaveOutcome::Duplicate { canonical_url } => {
                // Raced with another save; answer like the up-front check.
                warn!(canonical_url = %canonical_url, "capture raced an existing memory");
                return Ok(BridgeResponse::rejection(
                    request.id,
                    "You saved this just now.",
                ));
            }
        };

        Ok(BridgeResponse {
            id: request.id,
            ok: true,
            reason: None,
            processed: Some(Processed {
                url: Some(url),
                canonical_url: Some(canonical_url),
                title: Some(title),
                content: Some(content),
                word_count: Some(word_count),
                excerpt: Some(excerpt),
                byline,
                reading_time,
                saved_id: Some(saved_id),
            }),
        })
    }

    // The bridge serves the single local profile.
    fn user_id(&self) -> String {
        "local".to_string()
    }
}

/// Human-readable age of a timestamp: "just now", "N minutes ago", up
/// through "N months ago".
pub fn time_ago(created_at: &str) -> String {
    let Ok(created) = DateTime::parse_from_rfc3339(created_at) else {
        return "some time ago".to_string();
    };
    let elapsed = (Utc::now() - created.with_timezone(&Utc))
        .num_seconds()
        .max(0) as u64;

    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;
    const WEEK: u64 = 7 * DAY;
    const MONTH: u64 = 30 * DAY;

    if elapsed < MINUTE {
        "just now".to_string()
    } else if elapsed < HOUR {
        format!("{} minutes ago", elapsed / MINUTE)
    } else if elapsed < DAY {
        format!("{} hours ago", elapsed / HOUR)
    } else if elapsed < WEEK {
        format!("{} days ago", elapsed / DAY)
    } else if elapsed < MONTH {
        format!("{} weeks ago", elapsed / WEEK)
    } else {
        format!("{} months ago", elapsed / MONTH)
    }
}
