// SPDX-License-Identifier: GPL-3.0-only
use chrono::{DateTime, Duration, Utc};

/// Tracks how far an order pull may move its cursor.
///
/// Only the contiguous run of successes from the start of the batch counts.
/// Once an order fails, later successes are ignored so the failed order is
/// fetched again on the next run.
#[derive(Debug, Default)]
pub struct CursorTracker {
    last_success: Option<DateTime<Utc>>,
    first_failure: Option<DateTime<Utc>>,
    blocked: bool,
}

impl CursorTracker {
    pub fn succeeded(&mut self, modified: Option<DateTime<Utc>>) {
        if self.blocked {
            return;
        }
        if let Some(ts) = modified {
            self.last_success = Some(ts);
        }
    }

    pub fn failed(&mut self, modified: Option<DateTime<Utc>>) {
        if self.blocked {
            return;
        }
        self.blocked = true;
        self.first_failure = modified;
    }

    /// Proposed cursor; `None` when nothing may be committed.
    pub fn cursor(&self) -> Option<DateTime<Utc>> {
        let last = self.last_success?;
        match self.first_failure {
            // `modified_after` is exclusive, so step back below the failure
            Some(failure) if last >= failure => Some(failure - Duration::seconds(1)),
            _ => Some(last),
        }
    }
}

/// The value to store for a cursor, or `None` when it would not move forward.
pub fn advance_cursor(
    previous: Option<DateTime<Utc>>,
    candidate: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    let candidate = candidate?;
    match previous {
        Some(prev) if candidate <= prev => None,
        _ => Some(candidate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, secs).unwrap())
    }

    #[test]
    fn test_all_successes_take_last_timestamp() {
        let mut tracker = CursorTracker::default();
        tracker.succeeded(at(1));
        tracker.succeeded(at(2));
        tracker.succeeded(at(3));
        assert_eq!(tracker.cursor(), at(3));
    }

    #[test]
    fn test_empty_batch_proposes_nothing() {
        assert_eq!(CursorTracker::default().cursor(), None);
    }

    #[test]
    fn test_failure_of_first_order_proposes_nothing() {
        let mut tracker = CursorTracker::default();
        tracker.failed(at(1));
        tracker.succeeded(at(2));
        assert_eq!(tracker.cursor(), None);
    }

    #[test]
    fn test_successes_after_failure_ignored() {
        let mut tracker = CursorTracker::default();
        tracker.succeeded(at(1));
        tracker.failed(at(2));
        tracker.succeeded(at(3));
        assert_eq!(tracker.cursor(), at(1));
    }

    #[test]
    fn test_failure_sharing_timestamp_steps_back() {
        let mut tracker = CursorTracker::default();
        tracker.succeeded(at(5));
        tracker.failed(at(5));
        assert_eq!(tracker.cursor(), at(4));
    }

    #[test]
    fn test_missing_timestamps_do_not_move_cursor() {
        let mut tracker = CursorTracker::default();
        tracker.succeeded(at(1));
        tracker.succeeded(None);
        assert_eq!(tracker.cursor(), at(1));
    }

    #[test]
    fn test_advance_cursor_is_monotonic() {
        assert_eq!(advance_cursor(None, at(1)), at(1));
        assert_eq!(advance_cursor(at(1), at(2)), at(2));
        assert_eq!(advance_cursor(at(2), at(1)), None);
        assert_eq!(advance_cursor(at(2), at(2)), None);
        assert_eq!(advance_cursor(at(2), None), None);
    }
}
