// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loopback NDJSON bridge for browser capture agents.
//!
//! [`BridgeServer`] owns the TCP listener and protocol framing;
//! [`BridgeProcessor`] owns the capture semantics (extract, duplicate
//! check, persist). The wire format lives in [`protocol`].

pub mod processor;
pub mod protocol;
pub mod server;

pub use processor::BridgeProcessor;
pub use protocol::{BridgeRequest, BridgeResponse, Processed};
pub use server::BridgeServer;
