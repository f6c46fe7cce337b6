// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits implemented by external providers.

pub mod ai;

pub use ai::AiProvider;
