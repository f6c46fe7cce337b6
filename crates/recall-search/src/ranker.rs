// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector ranking: cosine similarity blended with recency decay.
//!
//! Score = similarity * similarity_weight + recency * recency_weight,
//! where recency = exp(-age_days / recency_decay_days). Memories below
//! the similarity threshold are discarded before blending; the returned
//! ranking strips embeddings.

use chrono::{DateTime, Utc};
use recall_config::RankingConfig;
use recall_core::types::{Memory, RankedMemory};

/// Cosine similarity between two vectors of equal dimension.
///
/// Returns 0.0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f64;
    let mut mag_a = 0.0f64;
    let mut mag_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        mag_a += f64::from(*x) * f64::from(*x);
        mag_b += f64::from(*y) * f64::from(*y);
    }
    let mag_a = mag_a.sqrt();
    let mag_b = mag_b.sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        0.0
    } else {
        (dot / (mag_a * mag_b)) as f32
    }
}

/// Rank `memories` against `query_embedding` as of now.
pub fn rank(
    memories: &[Memory],
    query_embedding: &[f32],
    config: &RankingConfig,
) -> Vec<RankedMemory> {
    rank_at(memories, query_embedding, config, Utc::now())
}

/// Rank with an explicit clock, so recency behavior is testable.
pub fn rank_at(
    memories: &[Memory],
    query_embedding: &[f32],
    config: &RankingConfig,
    now: DateTime<Utc>,
) -> Vec<RankedMemory> {
    let mut ranked: Vec<RankedMemory> = memories
        .iter()
        .filter_map(|memory| score_one(memory, query_embedding, config, now))
        .collect();

    // Stable sort: equal scores keep storage order.
    ranked.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(config.top_k);
    ranked
}

fn score_one(
    memory: &Memory,
    query_embedding: &[f32],
    config: &RankingConfig,
    now: DateTime<Utc>,
) -> Option<RankedMemory> {
    // Rows without a usable embedding never rank.
    if memory.embedding.is_empty() || memory.embedding.len() != query_embedding.len() {
        return None;
    }

    let similarity = cosine_similarity(query_embedding, &memory.embedding);
    if similarity < config.min_similarity {
        return None;
    }

    let recency_score = recency_of(&memory.created_at, config.recency_decay_days, now);
    let final_score =
        similarity * config.similarity_weight + recency_score * config.recency_weight;

    Some(RankedMemory {
        id: memory.id,
        url: memory.url.clone(),
        title: memory.title.clone(),
        content: memory.content.clone(),
        summary: memory.summary.clone(),
        created_at: memory.created_at.clone(),
        source_type: memory.source_type.clone(),
        similarity,
        recency_score,
        final_score,
    })
}

/// exp(-age_days / decay_days), clamped so future timestamps score 1.0.
/// An unparseable timestamp counts as infinitely old.
fn recency_of(created_at: &str, decay_days: f64, now: DateTime<Utc>) -> f32 {
    let Ok(created) = DateTime::parse_from_rfc3339(created_at) else {
        return 0.0;
    };
    let age_secs = (now - created.with_timezone(&Utc)).num_seconds().max(0) as f64;
    let age_days = age_secs / 86_400.0;
    (-age_days / decay_days).exp() as f32
}
