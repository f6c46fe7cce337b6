// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the recall workspace.

use serde::{Deserialize, Serialize};

/// Sentinel snapshot token for a user with no stored memories.
pub const EPOCH_ISO: &str = "1970-01-01T00:00:00.000Z";

/// A raw browsing-history entry as supplied by the history source.
///
/// Immutable once read; the ingestion pipeline only filters and copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub url: String,
    #[serde(default)]
    pub title: String,
    /// Number of recorded visits; used to break dedup ties.
    #[serde(default)]
    pub visit_count: u32,
    /// ISO 8601 timestamp of the most recent visit.
    #[serde(default)]
    pub visit_time: String,
}

/// A candidate submitted to the external curation capability.
#[derive(Debug, Clone, Serialize)]
pub struct UrlCandidate {
    pub url: String,
    pub title: String,
    pub visit_count: u32,
}

/// Readable article content extracted from a fetched page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub text: String,
    pub word_count: usize,
    /// Leading snippet of the article text (up to 300 chars).
    pub excerpt: String,
    pub byline: Option<String>,
    /// Estimated reading time in minutes (200 wpm).
    pub reading_time: u32,
}

/// Outcome of one fetch task. Produced exactly once per submitted URL.
///
/// `index` correlates back to submission order for progress accounting.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub index: usize,
    pub url: String,
    pub article: Option<Article>,
    pub error: Option<String>,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        self.article.is_some()
    }
}

/// Running counters for one ingestion run. Mutated monotonically,
/// discarded at run end.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub total_input: usize,
    pub after_blocklist: usize,
    pub sent_to_curation: usize,
    pub curated_count: usize,
    pub successfully_fetched: usize,
    pub final_count: usize,
}

/// Stage of an ingestion run, reported through the progress channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStage {
    Filtering,
    Curation,
    Fetching,
    Complete,
    Error,
}

/// One progress event emitted by the ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub stage: ProgressStage,
    pub message: String,
    /// Overall progress, 0-100.
    pub percent: u8,
    pub current_url: Option<String>,
    pub stats: ProcessingStats,
}

/// A persisted memory row. Created once, never mutated; deletion by id is
/// the only destructive operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: i64,
    pub user_id: String,
    pub url: String,
    pub canonical_url: String,
    pub title: String,
    pub content: String,
    pub summary: String,
    /// Embedding of the summary, not the raw content.
    #[serde(skip)]
    pub embedding: Vec<f32>,
    /// ISO 8601 creation timestamp; MAX over a user's rows is the corpus
    /// snapshot token.
    pub created_at: String,
    pub source_type: String,
}

/// A memory prepared for insertion (no id yet).
#[derive(Debug, Clone)]
pub struct NewMemory {
    pub user_id: String,
    pub url: String,
    pub canonical_url: String,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub embedding: Vec<f32>,
    pub source_type: String,
}

/// A ranked memory returned by the vector ranker. Embeddings are stripped:
/// callers never need them and they dominate row size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedMemory {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub created_at: String,
    pub source_type: String,
    pub similarity: f32,
    pub recency_score: f32,
    pub final_score: f32,
}

/// The response returned by semantic search, cached verbatim as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<RankedMemory>,
    pub top_similarity: f32,
    pub used_ai: bool,
}

/// A recent cached search, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedSearch {
    pub query: String,
    pub date: String,
}

/// Corpus/usage statistics for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub total_memories: i64,
    pub total_cached_searches: i64,
    pub last_memory_at: Option<String>,
}

/// Current UTC time as an ISO 8601 string with millisecond precision,
/// matching the format SQLite's `strftime('%Y-%m-%dT%H:%M:%fZ','now')`
/// produces. Lexicographic order equals chronological order.
pub fn utc_now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Convert an f32 vector to bytes for SQLite BLOB storage.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert a SQLite BLOB back to an f32 vector.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_to_blob_roundtrip() {
        let original = vec![0.1_f32, 0.2, -0.3, 1.0, 0.0];
        let blob = vec_to_blob(&original);
        assert_eq!(blob.len(), original.len() * 4);
        let recovered = blob_to_vec(&blob);
        assert_eq!(original.len(), recovered.len());
        for (a, b) in original.iter().zip(recovered.iter()) {
            assert!((a - b).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn blob_to_vec_ignores_trailing_partial_chunk() {
        let mut blob = vec_to_blob(&[1.0_f32, 2.0]);
        blob.push(0xff);
        assert_eq!(blob_to_vec(&blob).len(), 2);
    }

    #[test]
    fn fetch_result_success_requires_article() {
        let ok = FetchResult {
            index: 0,
            url: "https://example.com".into(),
            article: Some(Article {
                title: "t".into(),
                text: "body".into(),
                word_count: 1,
                excerpt: "body".into(),
                byline: None,
                reading_time: 1,
            }),
            error: None,
        };
        let failed = FetchResult {
            index: 1,
            url: "https://example.com/404".into(),
            article: None,
            error: Some("HTTP 404".into()),
        };
        assert!(ok.is_success());
        assert!(!failed.is_success());
    }

    #[test]
    fn utc_now_iso_sorts_after_epoch_sentinel() {
        let now = utc_now_iso();
        assert!(now.as_str() > EPOCH_ISO);
        assert!(now.ends_with('Z'));
    }

    #[test]
    fn search_response_roundtrips_through_json() {
        let response = SearchResponse {
            query: "machine learning".into(),
            results: vec![],
            top_similarity: 0.0,
            used_ai: false,
        };
        let json = serde_json::to_string(&response).unwrap();
        let parsed: SearchResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.query, "machine learning");
        assert!(!parsed.used_ai);
    }
}
