// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The opaque AI capability consumed by ingestion and search.

use async_trait::async_trait;

use crate::error::RecallError;
use crate::types::UrlCandidate;

/// External AI capability: summarization, embedding, and URL ranking.
///
/// Production binds this to a remote API client; tests bind it to a
/// deterministic stub. The engine never depends on a concrete provider.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Summarize article text into a short dense paragraph.
    async fn summarize(&self, text: &str) -> Result<String, RecallError>;

    /// Generate an embedding vector for the given text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RecallError>;

    /// Rank candidate URLs and return an ordered subset of at most
    /// `target` high-value URLs.
    async fn rank_top_urls(
        &self,
        candidates: &[UrlCandidate],
        target: usize,
    ) -> Result<Vec<String>, RecallError>;
}
