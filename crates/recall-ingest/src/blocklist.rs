// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! History admission filtering.
//!
//! An entry is rejected if its lowercased URL contains any blocked domain
//! substring, or its raw URL matches any blocked pattern. Match-any,
//! reject-on-match; surviving entries keep their relative order.

use recall_config::BlocklistConfig;
use recall_core::types::HistoryEntry;
use recall_core::RecallError;
use regex::Regex;
use tracing::debug;

/// Compiled admission filter.
#[derive(Debug)]
pub struct Blocklist {
    domains: Vec<String>,
    patterns: Vec<Regex>,
}

impl Blocklist {
    /// Compile the configured blocklist. Invalid patterns are a config
    /// error, not a silent skip.
    pub fn new(config: &BlocklistConfig) -> Result<Self, RecallError> {
        let patterns = config
            .patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    RecallError::Config(format!("invalid blocklist pattern {p:?}: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            domains: config.domains.iter().map(|d| d.to_lowercase()).collect(),
            patterns,
        })
    }

    /// Whether a single URL is admitted.
    pub fn admits(&self, url: &str) -> bool {
        let lowered = url.to_lowercase();
        if self.domains.iter().any(|d| lowered.contains(d.as_str())) {
            return false;
        }
        !self.patterns.iter().any(|p| p.is_match(url))
    }

    /// Filter a batch of history entries, preserving order.
    pub fn filter(&self, entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
        let before = entries.len();
        let kept: Vec<HistoryEntry> = entries
            .into_iter()
            .filter(|entry| self.admits(&entry.url))
            .collect();
        debug!(before, after = kept.len(), "applied blocklist");
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str) -> HistoryEntry {
        HistoryEntry {
            url: url.to_string(),
            title: String::new(),
            visit_count: 1,
            visit_time: String::new(),
        }
    }

    fn default_blocklist() -> Blocklist {
        Blocklist::new(&BlocklistConfig::default()).unwrap()
    }

    #[test]
    fn blocks_domains_case_insensitively() {
        let blocklist = default_blocklist();
        assert!(!blocklist.admits("https://www.YouTube.com/watch?v=abc"));
        assert!(!blocklist.admits("https://github.com/rust-lang/rust"));
        assert!(blocklist.admits("https://example.com/article"));
    }

    #[test]
    fn blocks_auth_and_api_paths() {
        let blocklist = default_blocklist();
        assert!(!blocklist.admits("https://example.com/login"));
        assert!(!blocklist.admits("https://example.com/api/v2/items"));
        assert!(!blocklist.admits("https://example.com/oauth/callback"));
    }

    #[test]
    fn blocks_media_and_download_extensions() {
        let blocklist = default_blocklist();
        assert!(!blocklist.admits("https://example.com/report.pdf"));
        assert!(!blocklist.admits("https://example.com/photo.JPG"));
        assert!(blocklist.admits("https://example.com/pdf-tools-review"));
    }

    #[test]
    fn blocks_local_addresses() {
        let blocklist = default_blocklist();
        assert!(!blocklist.admits("http://localhost:3000/app"));
        assert!(!blocklist.admits("http://192.168.1.4/admin"));
        assert!(!blocklist.admits("file:///home/user/notes.html"));
    }

    #[test]
    fn filter_preserves_order_of_survivors() {
        let blocklist = default_blocklist();
        let kept = blocklist.filter(vec![
            entry("https://example.com/first"),
            entry("https://youtube.com/watch?v=1"),
            entry("https://example.com/second"),
        ]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].url, "https://example.com/first");
        assert_eq!(kept[1].url, "https://example.com/second");
    }

    #[test]
    fn invalid_pattern_is_a_config_error() {
        let config = BlocklistConfig {
            domains: vec![],
            patterns: vec!["[unclosed".to_string()],
        };
        assert!(Blocklist::new(&config).is_err());
    }

    #[test]
    fn empty_blocklist_admits_everything() {
        let blocklist = Blocklist::new(&BlocklistConfig {
            domains: vec![],
            patterns: vec![],
        })
        .unwrap();
        assert!(blocklist.admits("https://youtube.com/watch?v=abc"));
    }
}
