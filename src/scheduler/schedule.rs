// SPDX-License-Identifier: GPL-3.0-only
use std::time::Duration;

use crate::config::settings::{StoreSettings, SyncFrequency};

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// When a sync flow runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncSchedule {
    EveryMinutes(u32),
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl SyncSchedule {
    pub fn for_stock(settings: &StoreSettings) -> Self {
        SyncSchedule::EveryMinutes(settings.stock_sync_interval)
    }

    pub fn for_orders(settings: &StoreSettings) -> Self {
        match settings.order_sync_frequency {
            SyncFrequency::Minutes => SyncSchedule::EveryMinutes(settings.order_sync_interval),
            SyncFrequency::Hourly => SyncSchedule::Hourly,
            SyncFrequency::Daily => SyncSchedule::Daily,
            SyncFrequency::Weekly => SyncSchedule::Weekly,
            SyncFrequency::Monthly => SyncSchedule::Monthly,
        }
    }

    /// Cron form for minute intervals, the frequency name otherwise.
    pub fn cron_expression(&self) -> String {
        match self {
            SyncSchedule::EveryMinutes(n) => format!("0/{} * * * *", n),
            SyncSchedule::Hourly => "hourly".to_string(),
            SyncSchedule::Daily => "daily".to_string(),
            SyncSchedule::Weekly => "weekly".to_string(),
            SyncSchedule::Monthly => "monthly".to_string(),
        }
    }

    /// Time between two runs. A month is 30 days.
    pub fn period(&self) -> Duration {
        let secs = match self {
            SyncSchedule::EveryMinutes(n) => u64::from((*n).max(1)) * MINUTE,
            SyncSchedule::Hourly => HOUR,
            SyncSchedule::Daily => DAY,
            SyncSchedule::Weekly => 7 * DAY,
            SyncSchedule::Monthly => 30 * DAY,
        };
        Duration::from_secs(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_schedule_uses_minutes() {
        let settings = StoreSettings {
            stock_sync_interval: 15,
            ..StoreSettings::default()
        };
        let schedule = SyncSchedule::for_stock(&settings);
        assert_eq!(schedule, SyncSchedule::EveryMinutes(15));
        assert_eq!(schedule.cron_expression(), "0/15 * * * *");
        assert_eq!(schedule.period(), Duration::from_secs(900));
    }

    #[test]
    fn test_order_schedule_follows_frequency() {
        let minutes = StoreSettings {
            order_sync_interval: 5,
            ..StoreSettings::default()
        };
        assert_eq!(SyncSchedule::for_orders(&minutes).cron_expression(), "0/5 * * * *");

        let daily = StoreSettings {
            order_sync_frequency: SyncFrequency::Daily,
            order_sync_interval: 5,
            ..StoreSettings::default()
        };
        let schedule = SyncSchedule::for_orders(&daily);
        assert_eq!(schedule, SyncSchedule::Daily);
        assert_eq!(schedule.cron_expression(), "daily");
        assert_eq!(schedule.period(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_named_periods() {
        assert_eq!(SyncSchedule::Hourly.period(), Duration::from_secs(3_600));
        assert_eq!(SyncSchedule::Weekly.period(), Duration::from_secs(604_800));
        assert_eq!(SyncSchedule::Monthly.period(), Duration::from_secs(2_592_000));
    }
}
