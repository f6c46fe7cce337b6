// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded-concurrency fetch pool.
//!
//! At most `concurrency` requests are in flight at once; each worker pulls
//! the next URL off a shared queue, so a slow page never stalls the others.
//! One failed fetch never fails the batch: every submitted URL yields
//! exactly one [`FetchResult`], success or not.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use recall_config::FetchConfig;
use recall_core::types::FetchResult;
use recall_core::RecallError;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::extract::extract_article;

/// Progress notification: (completed, total) fetches so far.
pub type FetchProgress = (usize, usize);

/// Bounded pool for fetching and extracting a batch of pages.
#[derive(Debug, Clone)]
pub struct FetchPool {
    client: reqwest::Client,
    concurrency: usize,
    min_content_length: usize,
}

impl FetchPool {
    pub fn new(config: &FetchConfig) -> Result<Self, RecallError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| RecallError::Network {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            concurrency: config.concurrency.max(1),
            min_content_length: config.min_content_length,
        })
    }

    /// Fetch every URL in the batch, reporting completion counts through
    /// `progress` as each fetch finishes.
    ///
    /// Returns one result per submitted URL, in submission order. Progress
    /// counts are strictly increasing and end at `urls.len()`. The channel
    /// is unbounded so a lagging receiver never stalls fetching and never
    /// loses the final count.
    pub async fn fetch_all(
        &self,
        urls: Vec<String>,
        progress: Option<mpsc::UnboundedSender<FetchProgress>>,
    ) -> Vec<FetchResult> {
        let total = urls.len();
        if total == 0 {
            return Vec::new();
        }

        let urls = Arc::new(urls);
        let next = Arc::new(AtomicUsize::new(0));
        let (result_tx, mut result_rx) = mpsc::channel::<FetchResult>(total);

        let mut workers = JoinSet::new();
        for _ in 0..self.concurrency.min(total) {
            let pool = self.clone();
            let urls = Arc::clone(&urls);
            let next = Arc::clone(&next);
            let result_tx = result_tx.clone();

            workers.spawn(async move {
                loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    if index >= urls.len() {
                        break;
                    }
                    let url = urls[index].clone();
                    let result = pool.fetch_one(index, &url).await;
                    if result_tx.send(result).await.is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        // Completion counting happens here, not in the workers, so progress
        // events arrive strictly ordered.
        let mut results = Vec::with_capacity(total);
        while let Some(result) = result_rx.recv().await {
            results.push(result);
            if let Some(tx) = &progress {
                // Err means the receiver is gone; fetching continues anyway.
                let _ = tx.send((results.len(), total));
            }
        }
        while workers.join_next().await.is_some() {}

        results.sort_by_key(|r| r.index);
        results
    }

    /// Fetch one page and extract its article content.
    pub async fn fetch_one(&self, index: usize, url: &str) -> FetchResult {
        match self.fetch_page(url).await {
            Ok(html) => match extract_article(&html, self.min_content_length) {
                Ok(article) => {
                    debug!(url, words = article.word_count, "extracted article");
                    FetchResult {
                        index,
                        url: url.to_string(),
                        article: Some(article),
                        error: None,
                    }
                }
                Err(e) => {
                    debug!(url, error = %e, "page yielded no article");
                    FetchResult {
                        index,
                        url: url.to_string(),
                        article: None,
                        error: Some(e.to_string()),
                    }
                }
            },
            Err(message) => {
                warn!(url, error = %message, "fetch failed");
                FetchResult {
                    index,
                    url: url.to_string(),
                    article: None,
                    error: Some(message),
                }
            }
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {status}"));
        }
        response
            .text()
            .await
            .map_err(|e| format!("failed to read body: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn article_html(marker: &str) -> String {
        format!(
            "<html><head><title>{marker}</title></head><body><article><p>{}</p></article></body></html>",
            format!("{marker} content sentence. ").repeat(40)
        )
    }

    fn test_config() -> FetchConfig {
        FetchConfig {
            concurrency: 5,
            request_timeout_secs: 5,
            single_timeout_secs: 10,
            min_content_length: 100,
            user_agent: "recall-test".to_string(),
        }
    }

    #[tokio::test]
    async fn fetch_all_returns_one_result_per_url_in_order() {
        let server = MockServer::start().await;
        for i in 0..4 {
            Mock::given(method("GET"))
                .and(path(format!("/page{i}")))
                .respond_with(
                    ResponseTemplate::new(200).set_body_string(article_html(&format!("page{i}"))),
                )
                .mount(&server)
                .await;
        }

        let pool = FetchPool::new(&test_config()).unwrap();
        let urls: Vec<String> = (0..4).map(|i| format!("{}/page{i}", server.uri())).collect();
        let results = pool.fetch_all(urls.clone(), None).await;

        assert_eq!(results.len(), 4);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.index, i);
            assert_eq!(result.url, urls[i]);
            assert!(result.is_success());
        }
    }

    #[tokio::test]
    async fn one_failure_does_not_fail_the_batch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/good"))
            .respond_with(ResponseTemplate::new(200).set_body_string(article_html("good")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bad"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let pool = FetchPool::new(&test_config()).unwrap();
        let results = pool
            .fetch_all(
                vec![
                    format!("{}/good", server.uri()),
                    format!("{}/bad", server.uri()),
                ],
                None,
            )
            .await;

        assert_eq!(results.len(), 2);
        assert!(results[0].is_success());
        assert!(!results[1].is_success());
        assert!(results[1].error.as_deref().unwrap().contains("HTTP 500"));
    }

    #[tokio::test]
    async fn thin_pages_are_reported_as_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/thin"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><p>tiny</p></body></html>"),
            )
            .mount(&server)
            .await;

        let pool = FetchPool::new(&test_config()).unwrap();
        let results = pool
            .fetch_all(vec![format!("{}/thin", server.uri())], None)
            .await;

        assert!(!results[0].is_success());
        assert!(results[0].error.as_deref().unwrap().contains("too short"));
    }

    #[tokio::test]
    async fn progress_counts_are_increasing_and_complete() {
        let server = MockServer::start().await;
        for i in 0..6 {
            Mock::given(method("GET"))
                .and(path(format!("/p{i}")))
                .respond_with(
                    ResponseTemplate::new(200).set_body_string(article_html(&format!("p{i}"))),
                )
                .mount(&server)
                .await;
        }

        let pool = FetchPool::new(&test_config()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let urls: Vec<String> = (0..6).map(|i| format!("{}/p{i}", server.uri())).collect();
        pool.fetch_all(urls, Some(tx)).await;

        let mut seen = Vec::new();
        while let Some(p) = rx.recv().await {
            seen.push(p);
        }
        assert_eq!(seen.len(), 6);
        assert!(seen.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(*seen.last().unwrap(), (6, 6));
    }

    #[tokio::test]
    async fn progress_survives_a_receiver_that_never_keeps_up() {
        let server = MockServer::start().await;
        for i in 0..4 {
            Mock::given(method("GET"))
                .and(path(format!("/lag{i}")))
                .respond_with(
                    ResponseTemplate::new(200).set_body_string(article_html(&format!("lag{i}"))),
                )
                .mount(&server)
                .await;
        }

        let pool = FetchPool::new(&test_config()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let urls: Vec<String> = (0..4).map(|i| format!("{}/lag{i}", server.uri())).collect();

        // Do not read a single event until the whole batch is done.
        let results = pool.fetch_all(urls, Some(tx)).await;
        assert_eq!(results.len(), 4);

        let mut seen = Vec::new();
        while let Ok(p) = rx.try_recv() {
            seen.push(p);
        }
        assert_eq!(seen.len(), 4);
        assert_eq!(*seen.last().unwrap(), (4, 4));
    }

    #[tokio::test]
    async fn concurrency_never_exceeds_the_configured_cap() {
        let server = MockServer::start().await;
        for i in 0..8 {
            Mock::given(method("GET"))
                .and(path(format!("/slow{i}")))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_string(article_html("slow"))
                        .set_delay(Duration::from_millis(150)),
                )
                .mount(&server)
                .await;
        }

        let mut config = test_config();
        config.concurrency = 2;
        let pool = FetchPool::new(&config).unwrap();
        let urls: Vec<String> = (0..8).map(|i| format!("{}/slow{i}", server.uri())).collect();

        // 8 URLs at 150ms each with concurrency 2 needs at least 4 rounds.
        let started = std::time::Instant::now();
        let results = pool.fetch_all(urls, None).await;
        let elapsed = started.elapsed();

        assert_eq!(results.len(), 8);
        assert!(results.iter().all(FetchResult::is_success));
        assert!(
            elapsed >= Duration::from_millis(550),
            "finished too fast for concurrency 2: {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn empty_batch_is_a_noop() {
        let pool = FetchPool::new(&test_config()).unwrap();
        let results = pool.fetch_all(Vec::new(), None).await;
        assert!(results.is_empty());
    }
}
