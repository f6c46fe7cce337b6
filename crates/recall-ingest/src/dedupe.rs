// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! History deduplication.
//!
//! Entries are keyed by their lowercased URL with a single trailing slash
//! removed. This key is deliberately narrower than full canonicalization:
//! two entries differing only in query-parameter order survive dedup as
//! separate candidates and collapse later at the persistence uniqueness
//! check.

use std::collections::HashMap;

use recall_core::types::HistoryEntry;

/// Deduplicate history entries, keeping the highest-visit-count entry per
/// key. On a visit-count tie the first-seen entry wins.
pub fn deduplicate(entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    let mut seen: HashMap<String, HistoryEntry> = HashMap::with_capacity(entries.len());
    for entry in entries {
        let key = dedup_key(&entry.url);
        match seen.get(&key) {
            Some(existing) if entry.visit_count <= existing.visit_count => {}
            _ => {
                seen.insert(key, entry);
            }
        }
    }
    seen.into_values().collect()
}

fn dedup_key(url: &str) -> String {
    let lowered = url.to_lowercase();
    lowered
        .strip_suffix('/')
        .map(str::to_string)
        .unwrap_or(lowered)
}
