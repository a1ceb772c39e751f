//! Aggregation periods
//!
//! Day, week (Monday through the anchor date) and calendar month windows.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Aggregation window kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Some(Period::Day),
            "week" | "weekly" => Some(Period::Week),
            "month" | "monthly" => Some(Period::Month),
            _ => None,
        }
    }

    /// Inclusive (start, end) dates of the window around `anchor`
    pub fn bounds(&self, anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Period::Day => (anchor, anchor),
            Period::Week => {
                let offset = u64::from(anchor.weekday().num_days_from_monday());
                let monday = anchor.checked_sub_days(Days::new(offset)).unwrap_or(anchor);
                (monday, anchor)
            }
            Period::Month => (first_of_month(anchor), last_of_month(anchor)),
        }
    }

    /// Whether `date` falls inside the window around `anchor`
    pub fn contains(&self, anchor: NaiveDate, date: NaiveDate) -> bool {
        let (start, end) = self.bounds(anchor);
        start <= date && date <= end
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Day before the first of the following month
fn last_of_month(date: NaiveDate) -> NaiveDate {
    let next_month = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    next_month.and_then(|d| d.pred_opt()).unwrap_or(date)
}
