//! Software calendar over the hardware RTC
//!
//! The hardware calendar owns the passage of time; this module owns the
//! fixed epoch it was seeded with and derives elapsed seconds on demand.
//! Nothing here is stored beyond the epoch; every reading goes back to
//! the hardware.

mod civil;

pub mod backup;

pub use civil::is_leap_year;

use kairos_hal::rtc::{DateTime, Rtc};

/// Fixed reference date written to the hardware calendar at startup
pub const EPOCH: DateTime = DateTime::new(2020, 12, 12, 12, 0, 0);

/// Software calendar handle
pub struct Calendar<R: Rtc> {
    rtc: R,
    epoch: DateTime,
}

impl<R: Rtc> Calendar<R> {
    /// Seed the hardware calendar with the epoch and return the handle.
    ///
    /// The epoch is immutable afterwards; elapsed time is always measured
    /// against it.
    pub fn new(mut rtc: R) -> Self {
        rtc.set(EPOCH);
        Self { rtc, epoch: EPOCH }
    }

    /// The epoch this calendar measures from
    pub fn epoch(&self) -> DateTime {
        self.epoch
    }

    /// Whole seconds elapsed between the epoch and the current calendar
    /// reading, with a milliseconds fraction (always 0; the hardware
    /// calendar has no sub-second field).
    ///
    /// Blocks until the hardware seconds field rolls over, so the result
    /// reflects a just-started second rather than a stale mid-second
    /// reading. Worst case is one full second of busy-waiting; callers
    /// on scheduling-sensitive paths must budget for it.
    pub fn elapsed_seconds(&self) -> (i32, u16) {
        let first = self.rtc.now();
        let mut current = self.rtc.now();
        while current.second == first.second {
            current = self.rtc.now();
        }

        let elapsed = civil::seconds_from_civil(&current) - civil::seconds_from_civil(&self.epoch);
        (elapsed as i32, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::SimRtc;

    fn fresh_calendar() -> (SimRtc, Calendar<SimRtc>) {
        let rtc = SimRtc::new();
        let calendar = Calendar::new(rtc.clone());
        (rtc, calendar)
    }

    #[test]
    fn test_construction_seeds_the_hardware_with_the_epoch() {
        let (rtc, calendar) = fresh_calendar();
        assert_eq!(calendar.epoch(), EPOCH);
        assert_eq!(rtc.peek(), EPOCH);
    }

    #[test]
    fn test_elapsed_right_after_startup() {
        let (_rtc, calendar) = fresh_calendar();

        // the sim advances one second per reading, so the just-started
        // second observed after the boundary wait is epoch + 1
        let (seconds, millis) = calendar.elapsed_seconds();
        assert_eq!(seconds, 1);
        assert_eq!(millis, 0);
    }

    #[test]
    fn test_elapsed_across_a_plain_day() {
        let (rtc, calendar) = fresh_calendar();

        rtc.set_now(DateTime::new(2020, 12, 13, 12, 0, 0));
        let (seconds, _) = calendar.elapsed_seconds();
        assert_eq!(seconds, 86400 + 1);
    }

    #[test]
    fn test_elapsed_across_the_year_boundary() {
        let (rtc, calendar) = fresh_calendar();

        // 2020-12-12 12:00:00 -> 2021-03-01 12:00:00:
        // 19 days left of December, 31 of January, 28 of February
        // (2021 is no leap year), 1 of March
        rtc.set_now(DateTime::new(2021, 3, 1, 12, 0, 0));
        let (seconds, _) = calendar.elapsed_seconds();
        assert_eq!(seconds, 79 * 86400 + 1);
    }

    #[test]
    fn test_elapsed_across_a_leap_february() {
        let (rtc, calendar) = fresh_calendar();

        // 19 + 365*3 days to 2023-12-31, then 31 + 29 + 1 across the
        // leap February of 2024
        rtc.set_now(DateTime::new(2024, 3, 1, 12, 0, 0));
        let (seconds, _) = calendar.elapsed_seconds();
        assert_eq!(seconds, (19 + 3 * 365 + 31 + 29 + 1) * 86400 + 1);
    }

    #[test]
    fn test_waits_for_the_second_boundary() {
        let (rtc, calendar) = fresh_calendar();

        calendar.elapsed_seconds();
        // one stale reading plus at least one boundary probe
        assert!(rtc.reads() >= 2);
    }
}
