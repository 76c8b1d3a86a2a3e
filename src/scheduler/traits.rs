// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use futures_util::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::scheduler::schedule::SyncSchedule;

/// Body of a job, invoked once per tick.
pub type JobFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

pub struct ScheduledJob {
    pub name: String,
    pub schedule: SyncSchedule,
    pub run: JobFn,
}

impl fmt::Debug for ScheduledJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledJob")
            .field("name", &self.name)
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobHandle(Uuid);

impl JobHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[async_trait]
pub trait JobScheduler: Send + Sync {
    /// Start running `job` on its schedule
    async fn schedule(&self, job: ScheduledJob) -> anyhow::Result<JobHandle>;

    /// Stop a job. Returns `false` if the handle is unknown
    async fn cancel(&self, handle: JobHandle) -> bool;
}
