// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock AI provider for deterministic testing.
//!
//! `MockAiProvider` implements `AiProvider` with pre-configured curation
//! answers and hash-seeded embeddings, enabling fast, CI-runnable tests
//! without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use recall_core::traits::AiProvider;
use recall_core::types::UrlCandidate;
use recall_core::RecallError;

/// Dimension of the deterministic test embeddings. Small on purpose.
pub const MOCK_EMBEDDING_DIM: usize = 8;

/// A mock AI provider with deterministic behavior.
///
/// Ranking answers are popped from a FIFO queue; when the queue is empty
/// the first `target` candidate URLs are returned in order. Embeddings
/// are seeded from a hash of the input text, so equal texts always embed
/// identically and different texts almost never collide.
pub struct MockAiProvider {
    rank_responses: Arc<Mutex<VecDeque<Vec<String>>>>,
    summary_prefix: String,
    fail_ranking: bool,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self {
            rank_responses: Arc::new(Mutex::new(VecDeque::new())),
            summary_prefix: "Summary:".to_string(),
            fail_ranking: false,
        }
    }

    /// Pre-load ranking answers, consumed FIFO.
    pub fn with_rank_responses(responses: Vec<Vec<String>>) -> Self {
        Self {
            rank_responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            summary_prefix: "Summary:".to_string(),
            fail_ranking: false,
        }
    }

    /// A provider whose ranking calls always fail.
    pub fn failing() -> Self {
        Self {
            rank_responses: Arc::new(Mutex::new(VecDeque::new())),
            summary_prefix: "Summary:".to_string(),
            fail_ranking: true,
        }
    }

    /// Queue another ranking answer.
    pub async fn add_rank_response(&self, urls: Vec<String>) {
        self.rank_responses.lock().await.push_back(urls);
    }

    /// Deterministic embedding for `text`, usable from non-async test code.
    pub fn embedding_for(text: &str) -> Vec<f32> {
        // FNV-1a over the text seeds a tiny xorshift generator.
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in text.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x100000001b3);
        }
        let mut state = hash | 1;
        (0..MOCK_EMBEDDING_DIM)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                // Map to [-1, 1).
                (state as f64 / u64::MAX as f64 * 2.0 - 1.0) as f32
            })
            .collect()
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn summarize(&self, text: &str) -> Result<String, RecallError> {
        let head: String = text.chars().take(60).collect();
        Ok(format!("{} {}", self.summary_prefix, head))
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RecallError> {
        Ok(Self::embedding_for(text))
    }

    async fn rank_top_urls(
        &self,
        candidates: &[UrlCandidate],
        target: usize,
    ) -> Result<Vec<String>, RecallError> {
        if self.fail_ranking {
            return Err(RecallError::Provider {
                message: "mock ranking failure".to_string(),
                source: None,
            });
        }
        if let Some(queued) = self.rank_responses.lock().await.pop_front() {
            return Ok(queued);
        }
        Ok(candidates
            .iter()
            .take(target)
            .map(|c| c.url.clone())
            .collect())
    }
}
