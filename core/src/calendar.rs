//! Calendar arithmetic: calendar quarters and week offsets.
//!
//! Weeks are calendar-additive (7 days each); nothing here is
//! business-day aware.

use crate::types::Weeks;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar quarter, e.g. 2024 Q3 = July 1 .. September 30.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quarter {
    pub year:   i32,
    /// 1..=4
    pub number: u32,
}

impl Quarter {
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year:   date.year(),
            number: (date.month0() / 3) + 1,
        }
    }

    pub fn start(&self) -> NaiveDate {
        first_of_month(self.year, (self.number - 1) * 3 + 1)
    }

    /// Last day of the quarter (inclusive).
    pub fn end(&self) -> NaiveDate {
        let next = self.next().start();
        next.pred_opt().unwrap_or(next)
    }

    pub fn next(&self) -> Self {
        self.offset(1)
    }

    pub fn offset(&self, quarters: u32) -> Self {
        let zero_based = self.year as i64 * 4 + (self.number as i64 - 1) + quarters as i64;
        Self {
            year:   zero_based.div_euclid(4) as i32,
            number: zero_based.rem_euclid(4) as u32 + 1,
        }
    }

    /// Inclusive day count.
    pub fn days(&self) -> i64 {
        (self.end() - self.start()).num_days() + 1
    }

    /// Whole weeks spanned by the quarter, rounded up (13 or 14).
    pub fn weeks(&self) -> Weeks {
        (self.days() as f64 / 7.0).ceil()
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Q{}", self.year, self.number)
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

/// `date + weeks`, rounded to whole days. Saturates at the calendar limits.
pub fn add_weeks(date: NaiveDate, weeks: Weeks) -> NaiveDate {
    let days = (weeks * 7.0).round() as i64;
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Signed distance from `from` to `to` in fractional weeks.
pub fn weeks_between(from: NaiveDate, to: NaiveDate) -> Weeks {
    (to - from).num_days() as f64 / 7.0
}
