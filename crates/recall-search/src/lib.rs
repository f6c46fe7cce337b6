// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic search over stored memories.
//!
//! [`ranker`] does the in-process vector math; [`cache`] wraps it with
//! snapshot-validated response caching; [`SearchService`] is the handle
//! the binary and bridge hold.

pub mod cache;
pub mod ranker;
pub mod service;

pub use cache::normalize_query;
pub use ranker::{cosine_similarity, rank};
pub use service::SearchService;
