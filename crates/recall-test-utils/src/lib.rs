// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for recall integration tests.

pub mod mock_provider;

pub use mock_provider::MockAiProvider;
