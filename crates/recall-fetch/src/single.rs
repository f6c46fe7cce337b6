// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-URL fetch path used by the explicit save flow.
//!
//! Unlike batch ingestion, a failure here propagates to the caller: the
//! user asked for this exact page and deserves the real error. The whole
//! operation runs under one wall-clock budget.

use std::time::Duration;

use recall_core::types::Article;
use recall_core::RecallError;

use crate::pool::FetchPool;

/// Fetch one page and extract its article, bounded by `timeout`.
pub async fn fetch_single(
    pool: &FetchPool,
    url: &str,
    timeout: Duration,
) -> Result<Article, RecallError> {
    let result = tokio::time::timeout(timeout, pool.fetch_one(0, url))
        .await
        .map_err(|_| RecallError::Timeout { duration: timeout })?;

    match result.article {
        Some(article) => Ok(article),
        None => Err(RecallError::Network {
            message: result
                .error
                .unwrap_or_else(|| "page yielded no readable content".to_string()),
            source: None,
        }),
    }
}
