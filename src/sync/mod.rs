// SPDX-License-Identifier: GPL-3.0-only
pub mod cursor;
pub mod orchestrator;
pub mod traits;

pub use cursor::{advance_cursor, CursorTracker};
pub use orchestrator::SyncOrchestrator;
pub use traits::{OrderSyncOutcome, OrderSyncReport, StockSyncOutcome, SyncService};
