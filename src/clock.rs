use std::cell::Cell;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate};

/// Supplies the current instant to the tracker.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock in the local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to. Used by tests and simulations.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Local>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        ManualClock { now: Cell::new(start) }
    }

    pub fn set(&self, now: DateTime<Local>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Local> {
        (**self).now()
    }
}

/// Local calendar day of an instant. Recurrence stamps and weekday checks both
/// go through this so they can never disagree at midnight.
pub fn local_day(now: DateTime<Local>) -> NaiveDate {
    now.date_naive()
}

/// Weekday index of a calendar day, 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(day: NaiveDate) -> u8 {
    day.weekday().num_days_from_sunday() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn weekday_index_starts_on_sunday() {
        // 2024-06-02 was a Sunday.
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        assert_eq!(weekday_index(sunday), 0);
        assert_eq!(weekday_index(sunday + Duration::days(1)), 1);
        assert_eq!(weekday_index(sunday + Duration::days(6)), 6);
    }

    #[test]
    fn manual_clock_advances() {
        let start = Local.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(Duration::seconds(61));
        assert_eq!(clock.now(), start + Duration::seconds(61));
        assert_eq!(local_day(clock.now()), start.date_naive());
    }
}
