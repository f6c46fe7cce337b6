// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Page fetching and article extraction.
//!
//! [`FetchPool`] runs batch fetches under a hard concurrency cap with a
//! per-request timeout; [`fetch_single`] serves the explicit one-page save
//! path under a wall-clock budget. Extraction lives in [`extract`] and is
//! shared by both paths.

pub mod connectivity;
pub mod extract;
pub mod pool;
pub mod single;

pub use connectivity::check_connectivity;
pub use extract::{extract_article, ExtractError};
pub use pool::{FetchPool, FetchProgress};
pub use single::fetch_single;
