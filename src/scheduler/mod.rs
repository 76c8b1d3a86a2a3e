// SPDX-License-Identifier: GPL-3.0-only
pub mod interval;
pub mod schedule;
pub mod traits;

pub use interval::IntervalScheduler;
pub use schedule::SyncSchedule;
pub use traits::{JobFn, JobHandle, JobScheduler, ScheduledJob};
