//! Calendar clock used for age checks.

use chrono::NaiveDate;

/// Source of "today" for calendar-based rules.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the local time zone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}
