//! Month-key handling.
//!
//! Every timeline in the engine is keyed by a calendar month. [`MonthKey`]
//! parses and serializes as a `YYYY-MM` string; its derived ordering is
//! chronological, which matches lexicographic order on the zero-padded
//! string form.

use crate::error::{EngineError, Result};
use chrono::{Datelike, Days, NaiveDate};
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::InvalidMonthNumber(month));
        }
        Ok(Self { year, month })
    }

    /// Parses a `YYYY-MM` string. This is the engine's one hard failure
    /// mode: a malformed key is a caller contract violation, not a
    /// data-quality issue, so it errors rather than coercing.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || EngineError::InvalidMonthKey(raw.to_string());

        let (year_part, month_part) = raw.split_once('-').ok_or_else(invalid)?;
        if year_part.len() != 4 || month_part.len() != 2 {
            return Err(invalid());
        }
        if !year_part.bytes().all(|b| b.is_ascii_digit())
            || !month_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year: i32 = year_part.parse().map_err(|_| invalid())?;
        let month: u32 = month_part.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("validated month number is a valid calendar month")
    }

    pub fn last_day(&self) -> NaiveDate {
        let next = self.next();
        next.first_day()
            .checked_sub_days(Days::new(1))
            .expect("first day of a month always has a predecessor")
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// Clamps a nominal day-of-month to a real calendar day in this month
    /// (day 31 in April becomes April 30; day 0 becomes day 1).
    pub fn clamp_day(&self, day: u32) -> u32 {
        day.max(1).min(self.days_in_month())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// December of this key's year.
    pub fn year_end(&self) -> Self {
        Self {
            year: self.year,
            month: 12,
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

impl JsonSchema for MonthKey {
    fn schema_name() -> String {
        "MonthKey".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        String::json_schema(gen)
    }
}

/// Inclusive ascending range of months.
pub fn month_range(start: MonthKey, end: MonthKey) -> Vec<MonthKey> {
    let mut months = Vec::new();
    let mut current = start;
    while current <= end {
        months.push(current);
        current = current.next();
    }
    months
}
