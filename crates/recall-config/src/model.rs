// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the recall engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. Blocklists, concurrency limits, timeouts, and
//! scoring weights are configuration data, not hardcoded per-call values.

use serde::{Deserialize, Serialize};

/// Top-level recall configuration.
///
/// Loaded from TOML files with environment variable overrides. All
/// sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecallConfig {
    /// Application-wide settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Fetch pool settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Curation boundary settings.
    #[serde(default)]
    pub curation: CurationConfig,

    /// Vector ranking settings.
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Ingestion pipeline settings.
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Capture-agent bridge settings.
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// History admission blocklists.
    #[serde(default)]
    pub blocklist: BlocklistConfig,

    /// OpenAI provider settings.
    #[serde(default)]
    pub openai: OpenAiConfig,
}

/// Application-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("recall").join("recall.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "recall.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Bounded fetch pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    /// Maximum number of concurrently executing fetch tasks.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Overall wall-clock timeout for the single-URL path, in seconds.
    #[serde(default = "default_single_timeout_secs")]
    pub single_timeout_secs: u64,

    /// Minimum extracted text length for a page to count as an article.
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,

    /// User-Agent header sent with page fetches.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            request_timeout_secs: default_request_timeout_secs(),
            single_timeout_secs: default_single_timeout_secs(),
            min_content_length: default_min_content_length(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_concurrency() -> usize {
    5
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_single_timeout_secs() -> u64 {
    30
}

fn default_min_content_length() -> usize {
    400
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

/// Curation boundary configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CurationConfig {
    /// Maximum number of candidates submitted to the ranking capability.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    /// Desired size of the curated subset.
    #[serde(default = "default_target_count")]
    pub target_count: usize,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            max_candidates: default_max_candidates(),
            target_count: default_target_count(),
        }
    }
}

fn default_max_candidates() -> usize {
    500
}

fn default_target_count() -> usize {
    20
}

/// Vector ranking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RankingConfig {
    /// Items scoring below this cosine similarity are discarded.
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,

    /// Half-life style decay constant for the recency score, in days.
    #[serde(default = "default_recency_decay_days")]
    pub recency_decay_days: f64,

    /// Weight of cosine similarity in the final score.
    #[serde(default = "default_similarity_weight")]
    pub similarity_weight: f32,

    /// Weight of the recency score in the final score.
    #[serde(default = "default_recency_weight")]
    pub recency_weight: f32,

    /// Number of top results returned.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            min_similarity: default_min_similarity(),
            recency_decay_days: default_recency_decay_days(),
            similarity_weight: default_similarity_weight(),
            recency_weight: default_recency_weight(),
            top_k: default_top_k(),
        }
    }
}

fn default_min_similarity() -> f32 {
    0.3
}

fn default_recency_decay_days() -> f64 {
    30.0
}

fn default_similarity_weight() -> f32 {
    0.7
}

fn default_recency_weight() -> f32 {
    0.3
}

fn default_top_k() -> usize {
    10
}

/// Ingestion pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    /// Maximum characters of cleaned content passed to summarization.
    #[serde(default = "default_max_process_chars")]
    pub max_process_chars: usize,

    /// URL used for the connectivity preflight check.
    #[serde(default = "default_connectivity_url")]
    pub connectivity_url: String,

    /// Connectivity preflight timeout in seconds.
    #[serde(default = "default_connectivity_timeout_secs")]
    pub connectivity_timeout_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_process_chars: default_max_process_chars(),
            connectivity_url: default_connectivity_url(),
            connectivity_timeout_secs: default_connectivity_timeout_secs(),
        }
    }
}

fn default_max_process_chars() -> usize {
    20_000
}

fn default_connectivity_url() -> String {
    "https://www.google.com".to_string()
}

fn default_connectivity_timeout_secs() -> u64 {
    5
}

/// Capture-agent bridge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Host address to bind. Loopback only by design.
    #[serde(default = "default_bridge_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_bridge_port")]
    pub port: u16,

    /// Maximum buffered request size in bytes before the connection is closed.
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: default_bridge_host(),
            port: default_bridge_port(),
            max_request_bytes: default_max_request_bytes(),
        }
    }
}

fn default_bridge_host() -> String {
    "127.0.0.1".to_string()
}

fn default_bridge_port() -> u16 {
    12346
}

fn default_max_request_bytes() -> usize {
    12 * 1024 * 1024
}

/// History admission blocklists.
///
/// Filter semantics (substring-contains on domains, regex-match on
/// patterns, reject-if-any-match) live in recall-ingest; these lists are
/// data.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BlocklistConfig {
    /// An entry whose lowercased URL contains any of these substrings is rejected.
    #[serde(default = "default_blocked_domains")]
    pub domains: Vec<String>,

    /// An entry whose raw URL matches any of these regexes is rejected.
    #[serde(default = "default_blocked_patterns")]
    pub patterns: Vec<String>,
}

impl Default for BlocklistConfig {
    fn default() -> Self {
        Self {
            domains: default_blocked_domains(),
            patterns: default_blocked_patterns(),
        }
    }
}

fn default_blocked_domains() -> Vec<String> {
    [
        // Social media
        "twitter.com",
        "x.com",
        "facebook.com",
        "instagram.com",
        "linkedin.com",
        "reddit.com",
        "tiktok.com",
        "snapchat.com",
        "pinterest.com",
        // Video platforms
        "youtube.com",
        "youtu.be",
        "twitch.tv",
        "vimeo.com",
        // Email and communication
        "mail.google.com",
        "outlook.live.com",
        "outlook.office.com",
        "yahoo.com/mail",
        "slack.com",
        "discord.com",
        "teams.microsoft.com",
        "zoom.us",
        // Cloud storage
        "drive.google.com",
        "dropbox.com",
        "onedrive.live.com",
        "docs.google.com",
        // Package registries
        "npmjs.com",
        "npm.io",
        "cdnjs.com",
        "unpkg.com",
        "jsdelivr.net",
        // Icon libraries
        "lucide.dev",
        "fontawesome.com",
        "heroicons.com",
        "flaticon.com",
        // Search result pages
        "google.com/search",
        "bing.com/search",
        "duckduckgo.com/",
        // Analytics
        "analytics.google.com",
        // Version control hosts
        "github.com",
        "gitlab.com",
        "bitbucket.org",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_blocked_patterns() -> Vec<String> {
    [
        // Auth flows
        r"(?i)/(login|signin|sign-in|signup|sign-up|register|auth|oauth|sso|callback|logout)",
        // API endpoints
        r"(?i)/api/",
        r"(?i)/graphql",
        // Documentation
        r"(?i)/docs?/",
        r"(?i)/documentation/",
        r"(?i)/guide",
        r"(?i)/guides/",
        r"(?i)/reference",
        r"(?i)/getting-started",
        r"(?i)/quickstart",
        r"(?i)readthedocs\.io",
        // File downloads
        r"(?i)\.(pdf|zip|rar|tar|gz|exe|dmg|pkg|deb|rpm)$",
        // Media files
        r"(?i)\.(jpg|jpeg|png|gif|svg|webp|mp4|mp3|wav|avi|mov)$",
        // Local and loopback
        r"(?i)localhost",
        r"127\.0\.0\.1",
        r"192\.168\.",
        r"(?i)\.local",
        r"(?i)^file://",
        // Query params indicating redirects
        r"(?i)[?&](redirect|return|returnUrl|next|continue|callback)=",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// OpenAI provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. `None` requires the environment variable override.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Chat model used for summarization and URL ranking.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Embedding model.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
        }
    }
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}
