// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingestion pipeline orchestration.
//!
//! Runs the full history path: connectivity preflight, blocklist,
//! dedup, curation, bounded fetch, persist. Progress is reported through
//! an mpsc channel as [`ProgressEvent`]s; every run ends with exactly one
//! terminal event, `Complete` or `Error`.
//!
//! Failure severity is tiered: a single fetch or persist failure is
//! absorbed into the statistics, while connectivity and curation failures
//! abort the run.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use recall_config::RecallConfig;
use recall_core::traits::AiProvider;
use recall_core::types::{
    FetchResult, HistoryEntry, ProcessingStats, ProgressEvent, ProgressStage,
};
use recall_core::RecallError;
use recall_fetch::{check_connectivity, FetchPool};
use recall_storage::Database;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::blocklist::Blocklist;
use crate::curator::curate;
use crate::dedupe::deduplicate;
use crate::writer::{save_memory, SaveOutcome, SaveRequest};

/// Source type recorded for memories created from browsing history.
const HISTORY_SOURCE: &str = "browser-history";

/// Outcome of a completed ingestion run.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub stats: ProcessingStats,
    pub message: String,
}

/// The history ingestion pipeline. Cheap to clone per run.
#[derive(Clone)]
pub struct IngestPipeline {
    db: Database,
    provider: Arc<dyn AiProvider>,
    pool: FetchPool,
    blocklist: Arc<Blocklist>,
    config: Arc<RecallConfig>,
}

impl IngestPipeline {
    pub fn new(
        db: Database,
        provider: Arc<dyn AiProvider>,
        config: Arc<RecallConfig>,
    ) -> Result<Self, RecallError> {
        Ok(Self {
            db,
            pool: FetchPool::new(&config.fetch)?,
            blocklist: Arc::new(Blocklist::new(&config.blocklist)?),
            provider,
            config,
        })
    }

    /// Run the pipeline over `entries` for `user_id`, reporting progress
    /// through `events`.
    pub async fn run(
        &self,
        user_id: &str,
        entries: Vec<HistoryEntry>,
        events: mpsc::Sender<ProgressEvent>,
    ) -> Result<IngestReport, RecallError> {
        match self.run_inner(user_id, entries, &events).await {
            Ok(report) => Ok(report),
            Err(e) => {
                emit(
                    &events,
                    ProgressStage::Error,
                    e.to_string(),
                    0,
                    None,
                    ProcessingStats::default(),
                )
                .await;
                Err(e)
            }
        }
    }

    async fn run_inner(
        &self,
        user_id: &str,
        entries: Vec<HistoryEntry>,
        events: &mpsc::Sender<ProgressEvent>,
    ) -> Result<IngestReport, RecallError> {
        let mut stats = ProcessingStats {
            total_input: entries.len(),
            ..Default::default()
        };

        emit(
            events,
            ProgressStage::Filtering,
            "Filtering browsing history...",
            10,
            None,
            stats,
        )
        .await;

        emit(
            events,
            ProgressStage::Filtering,
            "Checking internet connection...",
            15,
            None,
            stats,
        )
        .await;
        let connected = check_connectivity(
            &self.config.ingest.connectivity_url,
            Duration::from_secs(self.config.ingest.connectivity_timeout_secs),
        )
        .await;
        if !connected {
            return Err(RecallError::NoConnectivity);
        }

        emit(
            events,
            ProgressStage::Filtering,
            "Applying filters...",
            20,
            None,
            stats,
        )
        .await;
        let filtered = self.blocklist.filter(entries);
        stats.after_blocklist = filtered.len();

        if filtered.is_empty() {
            let message = "No processable browsing history found.".to_string();
            emit(events, ProgressStage::Complete, &message, 100, None, stats).await;
            return Ok(IngestReport { stats, message });
        }

        let deduped = deduplicate(filtered);
        stats.sent_to_curation = deduped.len().min(self.config.curation.max_candidates);

        emit(
            events,
            ProgressStage::Curation,
            format!("Analyzing {} URLs...", stats.sent_to_curation),
            30,
            None,
            stats,
        )
        .await;
        let selected = curate(self.provider.as_ref(), &self.config.curation, &deduped).await?;
        stats.curated_count = selected.len();

        if selected.is_empty() {
            let message = "No quality content found in browsing history.".to_string();
            emit(events, ProgressStage::Complete, &message, 100, None, stats).await;
            return Ok(IngestReport { stats, message });
        }

        emit(
            events,
            ProgressStage::Curation,
            format!("Selected {} quality URLs", selected.len()),
            40,
            None,
            stats,
        )
        .await;

        emit(
            events,
            ProgressStage::Fetching,
            "Fetching content from selected URLs...",
            50,
            None,
            stats,
        )
        .await;
        let results = self
            .fetch_with_progress(selected.clone(), events.clone(), stats)
            .await;
        stats.successfully_fetched = results.iter().filter(|r| r.is_success()).count();

        let entry_map = entry_lookup(&deduped);
        let mut saved = 0usize;
        for result in results {
            let Some(article) = result.article else {
                continue;
            };
            let original = entry_map.get(&lookup_key(&result.url));
            let title = if article.title.is_empty() {
                original.map(|e| e.title.clone()).unwrap_or_default()
            } else {
                article.title.clone()
            };

            let request = SaveRequest {
                user_id: user_id.to_string(),
                url: result.url.clone(),
                title,
                content: article.text,
                source_type: HISTORY_SOURCE.to_string(),
            };
            match save_memory(
                &self.db,
                self.provider.as_ref(),
                request,
                self.config.ingest.max_process_chars,
            )
            .await
            {
                Ok(SaveOutcome::Saved { .. }) => saved += 1,
                Ok(SaveOutcome::Duplicate { canonical_url }) => {
                    info!(canonical_url = %canonical_url, "already remembered, skipping");
                }
                Err(e) => {
                    warn!(url = %result.url, error = %e, "failed to persist memory");
                }
            }
        }
        stats.final_count = saved;

        let message = completion_message(&stats, self.config.curation.target_count);
        emit(events, ProgressStage::Complete, &message, 100, None, stats).await;
        info!(
            total_input = stats.total_input,
            after_blocklist = stats.after_blocklist,
            curated = stats.curated_count,
            fetched = stats.successfully_fetched,
            saved = stats.final_count,
            "ingestion run complete"
        );
        Ok(IngestReport { stats, message })
    }

    /// Run the fetch pool, mapping its (completed, total) counts onto the
    /// 50-95% span of the overall run.
    async fn fetch_with_progress(
        &self,
        urls: Vec<String>,
        events: mpsc::Sender<ProgressEvent>,
        stats: ProcessingStats,
    ) -> Vec<FetchResult> {
        let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<(usize, usize)>();
        let urls_for_events = urls.clone();
        let forwarder = tokio::spawn(async move {
            while let Some((current, total)) = fetch_rx.recv().await {
                let percent = 50 + ((current as f64 / total as f64) * 45.0) as u8;
                emit(
                    &events,
                    ProgressStage::Fetching,
                    format!("Fetching content ({current}/{total})..."),
                    percent,
                    urls_for_events.get(current - 1).cloned(),
                    stats,
                )
                .await;
            }
        });

        let results = self.pool.fetch_all(urls, Some(fetch_tx)).await;
        let _ = forwarder.await;
        results
    }
}

fn completion_message(stats: &ProcessingStats, target: usize) -> String {
    if stats.successfully_fetched == 0 {
        "Could not extract content from selected URLs.".to_string()
    } else if stats.successfully_fetched < target {
        format!("Successfully processed {} articles.", stats.successfully_fetched)
    } else {
        format!(
            "Successfully processed {} high-quality articles.",
            stats.successfully_fetched
        )
    }
}

/// Key used to correlate fetched URLs back to their history entries.
/// Matches the dedup key on purpose.
fn lookup_key(url: &str) -> String {
    let lowered = url.to_lowercase();
    lowered
        .strip_suffix('/')
        .map(str::to_string)
        .unwrap_or(lowered)
}

fn entry_lookup(entries: &[HistoryEntry]) -> HashMap<String, &HistoryEntry> {
    entries
        .iter()
        .map(|entry| (lookup_key(&entry.url), entry))
        .collect()
}

async fn emit(
    events: &mpsc::Sender<ProgressEvent>,
    stage: ProgressStage,
    message: impl Into<String>,
    percent: u8,
    current_url: Option<String>,
    stats: ProcessingStats,
) {
    // A dropped receiver must not abort the run.
    let _ = events
        .send(ProgressEvent {
            stage,
            message: message.into(),
            percent,
            current_url,
            stats,
        })
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_storage::queries::memories;
    use recall_test_utils::MockAiProvider;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn entry(url: &str, title: &str, visit_count: u32) -> HistoryEntry {
        HistoryEntry {
            url: url.to_string(),
            title: title.to_string(),
            visit_count,
            visit_time: "2026-08-01T00:00:00.000Z".to_string(),
        }
    }

    fn article_body(marker: &str) -> String {
        format!(
            "<html><head><title>{marker}</title></head><body><article><p>{}</p></article></body></html>",
            format!("{marker} article sentence. ").repeat(40)
        )
    }

    async fn test_config(server: &MockServer) -> Arc<RecallConfig> {
        let mut config = RecallConfig::default();
        config.ingest.connectivity_url = server.uri();
        config.ingest.connectivity_timeout_secs = 2;
        config.fetch.min_content_length = 100;
        config.fetch.request_timeout_secs = 5;
        Arc::new(config)
    }

    async fn mount_connectivity(server: &MockServer) {
        Mock::given(method("HEAD"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
    }

    fn drain(mut rx: mpsc::Receiver<ProgressEvent>) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn full_run_persists_curated_articles() {
        let server = MockServer::start().await;
        mount_connectivity(&server).await;
        Mock::given(method("GET"))
            .and(path("/rust-post"))
            .respond_with(ResponseTemplate::new(200).set_body_string(article_body("rust-post")))
            .mount(&server)
            .await;

        let db = Database::open_in_memory().await.unwrap();
        let article_url = format!("{}/rust-post", server.uri());
        let provider = Arc::new(MockAiProvider::with_rank_responses(vec![vec![
            article_url.clone(),
        ]]));
        let pipeline =
            IngestPipeline::new(db.clone(), provider, test_config(&server).await).unwrap();

        let (tx, rx) = mpsc::channel(64);
        let report = pipeline
            .run(
                "u1",
                vec![
                    entry(&article_url, "Rust Post", 3),
                    entry("https://youtube.com/watch?v=abc", "Video", 9),
                ],
                tx,
            )
            .await
            .unwrap();

        assert_eq!(report.stats.total_input, 2);
        assert_eq!(report.stats.after_blocklist, 1);
        assert_eq!(report.stats.curated_count, 1);
        assert_eq!(report.stats.successfully_fetched, 1);
        assert_eq!(report.stats.final_count, 1);

        let rows = memories::list_for_user(&db, "u1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source_type, "browser-history");
        assert!(!rows[0].summary.is_empty());

        let events = drain(rx);
        let last = events.last().unwrap();
        assert_eq!(last.stage, ProgressStage::Complete);
        assert_eq!(last.percent, 100);
        let terminal = events
            .iter()
            .filter(|e| matches!(e.stage, ProgressStage::Complete | ProgressStage::Error))
            .count();
        assert_eq!(terminal, 1);
    }

    #[tokio::test]
    async fn no_connectivity_aborts_before_any_fetch() {
        let server = MockServer::start().await;
        // No HEAD mock: wiremock answers 404, which still counts as
        // connectivity, so point the probe at a closed port instead.
        let db = Database::open_in_memory().await.unwrap();
        let mut config = RecallConfig::default();
        config.ingest.connectivity_url = "http://127.0.0.1:9".to_string();
        config.ingest.connectivity_timeout_secs = 1;
        let provider = Arc::new(MockAiProvider::new());
        let pipeline = IngestPipeline::new(db, provider, Arc::new(config)).unwrap();
        drop(server);

        let (tx, rx) = mpsc::channel(64);
        let err = pipeline
            .run("u1", vec![entry("https://example.com/a", "A", 1)], tx)
            .await
            .unwrap_err();
        assert!(matches!(err, RecallError::NoConnectivity));

        let events = drain(rx);
        let last = events.last().unwrap();
        assert_eq!(last.stage, ProgressStage::Error);
    }

    #[tokio::test]
    async fn curation_failure_is_terminal() {
        let server = MockServer::start().await;
        mount_connectivity(&server).await;

        let db = Database::open_in_memory().await.unwrap();
        let provider = Arc::new(MockAiProvider::failing());
        let pipeline = IngestPipeline::new(db, provider, test_config(&server).await).unwrap();

        let (tx, rx) = mpsc::channel(64);
        let err = pipeline
            .run("u1", vec![entry("https://example.com/a", "A", 1)], tx)
            .await
            .unwrap_err();
        assert!(matches!(err, RecallError::CurationUnavailable { .. }));

        let events = drain(rx);
        assert_eq!(events.last().unwrap().stage, ProgressStage::Error);
    }

    #[tokio::test]
    async fn fully_blocked_history_completes_with_empty_result() {
        let server = MockServer::start().await;
        mount_connectivity(&server).await;

        let db = Database::open_in_memory().await.unwrap();
        let provider = Arc::new(MockAiProvider::new());
        let pipeline =
            IngestPipeline::new(db.clone(), provider, test_config(&server).await).unwrap();

        let (tx, rx) = mpsc::channel(64);
        let report = pipeline
            .run(
                "u1",
                vec![
                    entry("https://youtube.com/watch?v=1", "V1", 1),
                    entry("https://github.com/some/repo", "Repo", 1),
                ],
                tx,
            )
            .await
            .unwrap();

        assert_eq!(report.stats.after_blocklist, 0);
        assert_eq!(report.stats.final_count, 0);
        assert!(memories::list_for_user(&db, "u1").await.unwrap().is_empty());
        assert_eq!(drain(rx).last().unwrap().stage, ProgressStage::Complete);
    }

    #[tokio::test]
    async fn failed_fetches_are_absorbed_into_stats() {
        let server = MockServer::start().await;
        mount_connectivity(&server).await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string(article_body("ok")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let db = Database::open_in_memory().await.unwrap();
        let ok_url = format!("{}/ok", server.uri());
        let broken_url = format!("{}/broken", server.uri());
        let provider = Arc::new(MockAiProvider::with_rank_responses(vec![vec![
            ok_url.clone(),
            broken_url.clone(),
        ]]));
        let pipeline =
            IngestPipeline::new(db.clone(), provider, test_config(&server).await).unwrap();

        let (tx, _rx) = mpsc::channel(64);
        let report = pipeline
            .run(
                "u1",
                vec![entry(&ok_url, "Ok", 1), entry(&broken_url, "Broken", 1)],
                tx,
            )
            .await
            .unwrap();

        assert_eq!(report.stats.curated_count, 2);
        assert_eq!(report.stats.successfully_fetched, 1);
        assert_eq!(report.stats.final_count, 1);
    }

    #[tokio::test]
    async fn fetch_progress_is_mapped_into_the_50_to_95_band() {
        let server = MockServer::start().await;
        mount_connectivity(&server).await;
        for i in 0..3 {
            Mock::given(method("GET"))
                .and(path(format!("/p{i}")))
                .respond_with(
                    ResponseTemplate::new(200).set_body_string(article_body(&format!("p{i}"))),
                )
                .mount(&server)
                .await;
        }

        let db = Database::open_in_memory().await.unwrap();
        let urls: Vec<String> = (0..3).map(|i| format!("{}/p{i}", server.uri())).collect();
        let provider = Arc::new(MockAiProvider::with_rank_responses(vec![urls.clone()]));
        let pipeline = IngestPipeline::new(db, provider, test_config(&server).await).unwrap();

        let (tx, rx) = mpsc::channel(64);
        let history: Vec<HistoryEntry> = urls.iter().map(|u| entry(u, "t", 1)).collect();
        pipeline.run("u1", history, tx).await.unwrap();

        let fetch_events: Vec<ProgressEvent> = drain(rx)
            .into_iter()
            .filter(|e| e.stage == ProgressStage::Fetching && e.current_url.is_some())
            .collect();
        assert_eq!(fetch_events.len(), 3);
        assert!(fetch_events.iter().all(|e| e.percent >= 50 && e.percent <= 95));
        assert_eq!(fetch_events.last().unwrap().percent, 95);
    }
}
