// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Browsing-history ingestion.
//!
//! The pipeline turns raw history entries into persisted memories:
//! blocklist filtering, dedup, AI curation, bounded fetching, and the
//! clean/summarize/embed write path. [`canonical::canonicalize`] defines
//! the canonical URL form the uniqueness invariant is built on.

pub mod blocklist;
pub mod canonical;
pub mod curator;
pub mod dedupe;
pub mod pipeline;
pub mod writer;

pub use blocklist::Blocklist;
pub use canonical::canonicalize;
pub use dedupe::deduplicate;
pub use pipeline::{IngestPipeline, IngestReport};
pub use writer::{clean_content, save_memory, SaveOutcome, SaveRequest};
