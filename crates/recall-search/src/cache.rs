// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query cache keyed by (user_id, normalized_query).
//!
//! A cached response is served only while the stored corpus snapshot
//! token still equals the current one; any new memory advances the token
//! and implicitly invalidates every cached query for that user. Hits are
//! returned verbatim from the stored JSON, with no re-ranking.

use recall_config::RankingConfig;
use recall_core::traits::AiProvider;
use recall_core::types::SearchResponse;
use recall_core::RecallError;
use recall_storage::queries::{memories, searches};
use recall_storage::Database;
use tracing::{debug, warn};

use crate::ranker::rank;

/// Normalize a query for cache keying: trim, lowercase, collapse
/// internal whitespace.
pub fn normalize_query(query: &str) -> String {
    query
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Semantic search with snapshot-validated caching.
///
/// On a cache miss the query is embedded, ranked against the user's full
/// corpus, and the response is stored for next time.
pub async fn semantic_search(
    db: &Database,
    provider: &dyn AiProvider,
    config: &RankingConfig,
    user_id: &str,
    query: &str,
) -> Result<SearchResponse, RecallError> {
    let normalized = normalize_query(query);
    let snapshot = memories::snapshot_token(db, user_id).await?;

    if let Some(hit) = searches::get_cached(db, user_id, &normalized).await? {
        if hit.memory_snapshot_at == snapshot {
            match serde_json::from_str::<SearchResponse>(&hit.response_json) {
                Ok(response) => {
                    debug!(user_id, normalized, "query cache hit");
                    return Ok(response);
                }
                Err(e) => {
                    // A corrupt cache row falls through to a fresh search.
                    warn!(user_id, normalized, error = %e, "discarding unreadable cache row");
                }
            }
        } else {
            debug!(user_id, normalized, "cache row stale, corpus changed");
        }
    }

    let query_embedding = provider.embed(query).await?;
    let corpus = memories::list_for_user(db, user_id).await?;
    let results = rank(&corpus, &query_embedding, config);

    let response = SearchResponse {
        query: query.to_string(),
        top_similarity: results.first().map(|r| r.similarity).unwrap_or(0.0),
        used_ai: !results.is_empty(),
        results,
    };

    let response_json = serde_json::to_string(&response)
        .map_err(|e| RecallError::Internal(format!("failed to serialize response: {e}")))?;
    searches::upsert(
        db,
        &searches::CacheWrite {
            user_id: user_id.to_string(),
            normalized_query: normalized,
            original_query: query.to_string(),
            response_json,
            top_similarity: f64::from(response.top_similarity),
            used_ai: response.used_ai,
            memory_snapshot_at: snapshot,
        },
    )
    .await?;

    Ok(response)
}
