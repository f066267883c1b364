// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! threatscan-engine: the paginated indicator stream, bounded event counter,
//! mapping migrator, and scan orchestrator that tie the backend adapter to
//! the query/schema logic in `threatscan-core`.

pub mod counter;
pub mod cursor;
pub mod error;
pub mod migrator;
pub mod orchestrator;

pub use counter::count_matching_events;
pub use cursor::IndicatorCursor;
pub use error::ScanError;
pub use migrator::ensure_detection_mapping;
pub use orchestrator::{ScanConfig, ScanLog, ScanOrchestrator, ScanReport, TracingScanLog};
