// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the capture-agent bridge.
//!
//! Newline-delimited JSON, camelCase field names. Every request line gets
//! exactly one response line; protocol-level rejections use the reserved
//! reasons `invalid_request`, `message_too_large`, and `internal_error`.

use serde::{Deserialize, Serialize};

/// An incoming capture request from a browser agent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeRequest {
    pub id: String,
    pub url: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub html: Option<String>,
    pub word_count: Option<usize>,
    /// The agent sent a user text selection rather than the whole page;
    /// duplicate detection is skipped.
    pub selected_only: bool,
}

/// The response sent back for one request line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeResponse {
    pub id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed: Option<Processed>,
}

impl BridgeResponse {
    pub fn rejection(id: impl Into<String>, reason: &str) -> Self {
        Self {
            id: id.into(),
            ok: false,
            reason: Some(reason.to_string()),
            processed: None,
        }
    }
}

/// Extracted and persisted page data echoed back to the agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Processed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_id: Option<i64>,
}
