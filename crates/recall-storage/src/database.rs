// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and
//! embedded migrations.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use recall_config::StorageConfig;
use recall_core::RecallError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// Convert a tokio_rusqlite error into `RecallError::Storage`.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> RecallError {
    RecallError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the single-writer SQLite connection.
///
/// Opening runs PRAGMAs and all pending migrations, so a `Database` is
/// always fully migrated.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if necessary) the configured database file.
    pub async fn open(config: &StorageConfig) -> Result<Self, RecallError> {
        let path = config.database_path.as_str();
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| RecallError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| map_tr_err(tokio_rusqlite::Error::from(e)))?;
        Self::setup(&conn, config.wal_mode).await?;
        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database (tests).
    pub async fn open_in_memory() -> Result<Self, RecallError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| map_tr_err(tokio_rusqlite::Error::from(e)))?;
        // WAL is meaningless for :memory:, skip it.
        Self::setup(&conn, false).await?;
        Ok(Self { conn })
    }

    async fn setup(conn: &Connection, wal: bool) -> Result<(), RecallError> {
        conn.call(move |conn| -> Result<(), RecallError> {
            if wal {
                conn.execute_batch(
                    "PRAGMA journal_mode = WAL;
                     PRAGMA synchronous = NORMAL;",
                )
                .map_err(|e| RecallError::Storage {
                    source: Box::new(e),
                })?;
            }
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )
            .map_err(|e| RecallError::Storage {
                source: Box::new(e),
            })?;
            migrations::run_migrations(conn)?;
            Ok(())
        })
        .await
        .map_err(|e| RecallError::Storage {
            source: Box::new(e),
        })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL and flush pending writes.
    pub async fn close(&self) -> Result<(), RecallError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}
