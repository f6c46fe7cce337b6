// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CRUD operations on the memories table.
//!
//! The unique index on (user_id, canonical_url) is the single point that
//! enforces the one-memory-per-canonical-URL invariant; inserts lean on
//! it via ON CONFLICT DO NOTHING instead of racing a SELECT.

use recall_core::types::{blob_to_vec, vec_to_blob, EPOCH_ISO};
use recall_core::RecallError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::models::{Memory, NewMemory, UserStats};

/// Insert a memory, respecting the (user_id, canonical_url) uniqueness
/// invariant.
///
/// Returns the new row id, or `None` when a row for the same canonical
/// URL already exists (the insert is a no-op, never a second row).
pub async fn insert_memory(db: &Database, memory: &NewMemory) -> Result<Option<i64>, RecallError> {
    let memory = memory.clone();
    let embedding_blob = vec_to_blob(&memory.embedding);
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "INSERT INTO memories (user_id, url, canonical_url, title, content, summary, embedding, source_type)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(user_id, canonical_url) DO NOTHING",
                params![
                    memory.user_id,
                    memory.url,
                    memory.canonical_url,
                    memory.title,
                    memory.content,
                    memory.summary,
                    embedding_blob,
                    memory.source_type,
                ],
            )?;
            if changed == 0 {
                Ok(None)
            } else {
                Ok(Some(conn.last_insert_rowid()))
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Look up an existing memory by canonical URL.
///
/// Returns (id, created_at) so callers can report when it was saved.
pub async fn find_by_canonical_url(
    db: &Database,
    user_id: &str,
    canonical_url: &str,
) -> Result<Option<(i64, String)>, RecallError> {
    let user_id = user_id.to_string();
    let canonical_url = canonical_url.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT id, created_at FROM memories
                 WHERE user_id = ?1 AND canonical_url = ?2 LIMIT 1",
                params![user_id, canonical_url],
                |row| Ok((row.get(0)?, row.get(1)?)),
            );
            match result {
                Ok(pair) => Ok(Some(pair)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Load every memory for a user. One snapshot read per ranking pass.
pub async fn list_for_user(db: &Database, user_id: &str) -> Result<Vec<Memory>, RecallError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, url, canonical_url, title, content, summary, embedding, created_at, source_type
                 FROM memories WHERE user_id = ?1",
            )?;
            let memories = stmt
                .query_map(params![user_id], row_to_memory)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(memories)
        })
        .await
        .map_err(map_tr_err)
}

/// The corpus snapshot token: MAX(created_at) across a user's memories,
/// or the epoch sentinel when the corpus is empty. Any insert advances it,
/// implicitly invalidating every cached query for the user.
pub async fn snapshot_token(db: &Database, user_id: &str) -> Result<String, RecallError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let token: Option<String> = conn.query_row(
                "SELECT MAX(created_at) FROM memories WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )?;
            Ok(token.unwrap_or_else(|| EPOCH_ISO.to_string()))
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a memory by id. The only destructive operation on the corpus.
pub async fn delete_by_id(db: &Database, id: i64) -> Result<(), RecallError> {
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM memories WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Corpus/usage statistics for one user.
pub async fn stats_for_user(db: &Database, user_id: &str) -> Result<UserStats, RecallError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let total_memories: i64 = conn.query_row(
                "SELECT COUNT(*) FROM memories WHERE user_id = ?1",
                params![&user_id],
                |row| row.get(0),
            )?;
            let total_cached_searches: i64 = conn.query_row(
                "SELECT COUNT(*) FROM recent_searches WHERE user_id = ?1",
                params![&user_id],
                |row| row.get(0),
            )?;
            let last_memory_at: Option<String> = conn.query_row(
                "SELECT MAX(created_at) FROM memories WHERE user_id = ?1",
                params![&user_id],
                |row| row.get(0),
            )?;
            Ok(UserStats {
                total_memories,
                total_cached_searches,
                last_memory_at,
            })
        })
        .await
        .map_err(map_tr_err)
}

fn row_to_memory(row: &rusqlite::Row) -> Result<Memory, rusqlite::Error> {
    let embedding_blob: Option<Vec<u8>> = row.get(7)?;
    Ok(Memory {
        id: row.get(0)?,
        user_id: row.get(1)?,
        url: row.get(2)?,
        canonical_url: row.get(3)?,
        title: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        content: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        summary: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        embedding: embedding_blob.map(|b| blob_to_vec(&b)).unwrap_or_default(),
        created_at: row.get(8)?,
        source_type: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
    })
}
