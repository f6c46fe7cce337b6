// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connectivity preflight for the ingestion pipeline.

use std::time::Duration;

use tracing::debug;

/// Probe `url` with a HEAD request and report whether the network is
/// reachable. Any response, including an HTTP error status, counts as
/// connectivity; only transport-level failure or timeout does not.
pub async fn check_connectivity(url: &str, timeout: Duration) -> bool {
    let client = match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(_) => return false,
    };
    match client.head(url).send().await {
        Ok(response) => {
            debug!(url, status = %response.status(), "connectivity probe succeeded");
            true
        }
        Err(e) => {
            debug!(url, error = %e, "connectivity probe failed");
            false
        }
    }
}
