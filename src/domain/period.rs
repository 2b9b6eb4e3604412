//! Calendar quarters.
//!
//! A [`Period`] can only be built by normalizing a date down to the first day of
//! its quarter, so every value in circulation satisfies the quarter-start
//! invariant (day 1, month Jan/Apr/Jul/Oct).

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A calendar quarter, identified by its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "NaiveDate", into = "NaiveDate")]
pub struct Period(NaiveDate);

impl Period {
    /// The quarter containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let month = (date.month0() / 3) * 3 + 1;
        // Day 1 of month 1/4/7/10 exists in every year chrono can represent.
        match NaiveDate::from_ymd_opt(date.year(), month, 1) {
            Some(start) => Self(start),
            None => Self(date),
        }
    }

    /// Build from a year and a 1-based quarter number.
    pub fn from_year_quarter(year: i32, quarter: u32) -> Option<Self> {
        if !(1..=4).contains(&quarter) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, (quarter - 1) * 3 + 1, 1).map(Self)
    }

    pub fn start(self) -> NaiveDate {
        self.0
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// 1-based quarter number.
    pub fn quarter(self) -> u32 {
        self.0.month0() / 3 + 1
    }

    /// Label in the form `2022 Q1`.
    pub fn label(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Q{}", self.year(), self.quarter())
    }
}

impl TryFrom<NaiveDate> for Period {
    type Error = String;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        let period = Period::containing(date);
        if period.start() == date {
            Ok(period)
        } else {
            Err(format!("{date} is not the first day of a quarter"))
        }
    }
}

impl From<Period> for NaiveDate {
    fn from(period: Period) -> Self {
        period.0
    }
}

impl FromStr for Period {
    type Err = String;

    /// Accepts `2022 Q1`, `2022Q1`, `2022-Q1` (case-insensitive), or any ISO
    /// date inside the quarter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Ok(Period::containing(date));
        }

        let upper = trimmed.to_ascii_uppercase();
        let invalid = || format!("Invalid quarter '{s}'. Expected e.g. '2022 Q1' or '2022-02-15'.");
        let (year, quarter) = upper.split_once('Q').ok_or_else(invalid)?;
        let year = year.trim().trim_end_matches('-').trim();
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let quarter: u32 = quarter.trim().parse().map_err(|_| invalid())?;
        Period::from_year_quarter(year, quarter).ok_or_else(invalid)
    }
}
