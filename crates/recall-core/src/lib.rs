// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the recall browsing-memory engine.
//!
//! Provides the error type, shared domain types, and the AI capability
//! trait used throughout the recall workspace.

pub mod error;
pub mod traits;
pub mod types;

pub use error::RecallError;
pub use traits::AiProvider;
pub use types::{
    Article, CachedSearch, FetchResult, HistoryEntry, Memory, NewMemory, ProcessingStats,
    ProgressEvent, ProgressStage, RankedMemory, SearchResponse, UrlCandidate, UserStats,
};
