//! Nullable clock: a calendar that only moves when told to.

use chrono::{Days, NaiveDate};
use std::sync::Mutex;

use idgate_types::Clock;

/// A deterministic calendar clock for testing.
pub struct NullClock {
    today: Mutex<NaiveDate>,
}

impl NullClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    /// Clock fixed at the given calendar date.
    ///
    /// # Panics
    ///
    /// Panics on an impossible date.
    pub fn on(year: i32, month: u32, day: u32) -> Self {
        Self::new(NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date"))
    }

    /// Advance the calendar by a number of days.
    pub fn advance_days(&self, days: u64) {
        let mut today = self.today.lock().unwrap();
        *today = *today + Days::new(days);
    }

    /// Set the calendar to a specific date.
    pub fn set(&self, date: NaiveDate) {
        *self.today.lock().unwrap() = date;
    }
}

impl Clock for NullClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap()
    }
}
