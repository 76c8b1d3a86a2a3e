// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::scheduler::traits::{JobHandle, JobScheduler, ScheduledJob};

/// Runs each job in its own tokio task on a fixed period.
///
/// The first run happens one period after scheduling. A run that outlasts
/// its period swallows the missed ticks, so a job never overlaps itself.
#[derive(Default)]
pub struct IntervalScheduler {
    jobs: Mutex<HashMap<JobHandle, JoinHandle<()>>>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn job_count(&self) -> usize {
        self.jobs.lock().await.len()
    }

    /// Cancel every job
    pub async fn shutdown(&self) {
        let mut jobs = self.jobs.lock().await;
        for (_, task) in jobs.drain() {
            task.abort();
        }
    }
}

#[async_trait]
impl JobScheduler for IntervalScheduler {
    async fn schedule(&self, job: ScheduledJob) -> anyhow::Result<JobHandle> {
        let handle = JobHandle::new();
        let period = job.schedule.period();

        info!(
            job = %job.name,
            handle = %handle,
            cron = %job.schedule.cron_expression(),
            period_secs = period.as_secs(),
            "Scheduled job"
        );

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                debug!(job = %job.name, "Running scheduled job");
                (job.run)().await;
            }
        });

        self.jobs.lock().await.insert(handle, task);
        Ok(handle)
    }

    async fn cancel(&self, handle: JobHandle) -> bool {
        match self.jobs.lock().await.remove(&handle) {
            Some(task) => {
                task.abort();
                info!(handle = %handle, "Cancelled job");
                true
            }
            None => false,
        }
    }
}
