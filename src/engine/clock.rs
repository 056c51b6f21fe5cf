//! Now providers
//!
//! The engine never reads the wall clock directly. [`SystemClock`] shifts
//! UTC by one fixed offset so period boundaries follow the team's local
//! calendar day; [`FixedClock`] pins time for tests.

use std::cell::Cell;

use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};

/// Source of the current moment
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Wall clock, shifted by a fixed UTC offset
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Clock for a local calendar `minutes` east of UTC
    ///
    /// Returns `None` if the offset is a day or more.
    pub fn with_offset_minutes(minutes: i32) -> Option<Self> {
        let offset = FixedOffset::east_opt(minutes.checked_mul(60)?)?;
        Some(Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::utc()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(i64::from(self.offset.local_minus_utc()))
    }
}

/// Manually driven clock
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_moves_only_when_told() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::days(2));
        assert_eq!(clock.now(), start + Duration::days(2));

        clock.set(start);
        assert_eq!((&clock).now(), start);
    }

    #[test]
    fn offset_must_be_under_a_day() {
        assert!(SystemClock::with_offset_minutes(330).is_some());
        assert!(SystemClock::with_offset_minutes(-600).is_some());
        assert!(SystemClock::with_offset_minutes(24 * 60).is_none());
    }

    #[test]
    fn system_clock_applies_offset() {
        let clock = SystemClock::with_offset_minutes(120).unwrap();
        let shifted = clock.now();
        let diff = shifted - Utc::now();
        // Two hours ahead, give or take the time between the two reads
        assert!((diff - Duration::hours(2)).num_seconds().abs() <= 1);
        assert_eq!(SystemClock::utc().offset().local_minus_utc(), 0);
    }
}
