// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `recall serve` command implementation.
//!
//! Runs the capture-agent bridge until interrupted.

use std::sync::Arc;

use recall_bridge::{BridgeProcessor, BridgeServer};
use recall_config::RecallConfig;
use recall_core::traits::AiProvider;
use recall_core::RecallError;
use recall_storage::Database;
use tracing::info;

pub async fn run_serve(
    db: Database,
    provider: Arc<dyn AiProvider>,
    config: Arc<RecallConfig>,
) -> Result<(), RecallError> {
    let processor = BridgeProcessor::new(db.clone(), provider, Arc::clone(&config));
    let server = BridgeServer::bind(&config.bridge, processor).await?;
    let addr = server.local_addr()?;
    info!(addr = %addr, "bridge ready for capture agents");

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            db.close().await?;
            Ok(())
        }
    }
}
