// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI binding for the recall engine's AI capabilities.
//!
//! [`OpenAiClient`] implements `AiProvider`: summarization and URL
//! ranking over chat completions, embeddings over the embeddings
//! endpoint.

pub mod client;
pub mod types;

pub use client::OpenAiClient;
