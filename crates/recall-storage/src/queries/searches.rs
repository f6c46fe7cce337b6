// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query-cache operations on the recent_searches table.
//!
//! One live row per (user_id, normalized_query); writes are upserts
//! (last-write-wins), never locks. Invalidation is implicit via the
//! memory_snapshot_at token.

use recall_core::RecallError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::models::CachedSearch;

/// A cached response row as read at lookup time.
#[derive(Debug, Clone)]
pub struct CacheHit {
    pub response_json: String,
    pub memory_snapshot_at: String,
}

/// A cache row to be written after a fresh ranking pass.
#[derive(Debug, Clone)]
pub struct CacheWrite {
    pub user_id: String,
    pub normalized_query: String,
    pub original_query: String,
    pub response_json: String,
    pub top_similarity: f64,
    pub used_ai: bool,
    pub memory_snapshot_at: String,
}

/// Look up the cached row for (user_id, normalized_query), if any.
///
/// The caller compares the stored snapshot token against the current one;
/// this function does not decide freshness.
pub async fn get_cached(
    db: &Database,
    user_id: &str,
    normalized_query: &str,
) -> Result<Option<CacheHit>, RecallError> {
    let user_id = user_id.to_string();
    let normalized_query = normalized_query.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT response_json, memory_snapshot_at FROM recent_searches
                 WHERE user_id = ?1 AND normalized_query = ?2 LIMIT 1",
                params![user_id, normalized_query],
                |row| {
                    Ok(CacheHit {
                        response_json: row.get(0)?,
                        memory_snapshot_at: row.get(1)?,
                    })
                },
            );
            match result {
                Ok(hit) => Ok(Some(hit)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Store a fresh response, overwriting any prior row for the same key.
pub async fn upsert(db: &Database, write: &CacheWrite) -> Result<(), RecallError> {
    let write = write.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO recent_searches
                 (user_id, normalized_query, original_query, response_json, top_similarity, used_ai, memory_snapshot_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    write.user_id,
                    write.normalized_query,
                    write.original_query,
                    write.response_json,
                    write.top_similarity,
                    write.used_ai as i64,
                    write.memory_snapshot_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// The user's most recent cached searches, newest first, capped at `limit`.
///
/// Rows are distinct by normalized query by construction (it is part of
/// the primary key).
pub async fn recent(
    db: &Database,
    user_id: &str,
    limit: usize,
) -> Result<Vec<CachedSearch>, RecallError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT original_query, created_at FROM recent_searches
                 WHERE user_id = ?1 ORDER BY created_at DESC LIMIT ?2",
            )?;
            let searches = stmt
                .query_map(params![user_id, limit as i64], |row| {
                    Ok(CachedSearch {
                        query: row.get(0)?,
                        date: row.get(1)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(searches)
        })
        .await
        .map_err(map_tr_err)
}
