//! Consecutive-day streaks over the set of active dates.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streaks {
    /// Run ending today, or yesterday when today has no activity yet.
    pub current: u32,
    /// Longest run anywhere in the history.
    pub longest: u32,
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The day a streak must have touched for `date` to extend it.
fn previous(date: NaiveDate, skip_weekends: bool) -> Option<NaiveDate> {
    let mut day = date.checked_sub_days(Days::new(1))?;
    while skip_weekends && is_weekend(day) {
        day = day.checked_sub_days(Days::new(1))?;
    }
    Some(day)
}

/// Compute streaks from the dates with at least one completed session.
///
/// With `skip_weekends`, Saturday and Sunday are removed before counting and
/// Friday is followed directly by Monday. A missing weekday still breaks the run.
pub fn compute(active: &BTreeSet<NaiveDate>, today: NaiveDate, skip_weekends: bool) -> Streaks {
    let dates: BTreeSet<NaiveDate> = active
        .iter()
        .copied()
        .filter(|d| !(skip_weekends && is_weekend(*d)))
        .collect();

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut last: Option<NaiveDate> = None;
    for &date in &dates {
        run = match last {
            Some(prev) if previous(date, skip_weekends) == Some(prev) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        last = Some(date);
    }

    let anchor = if dates.contains(&today) {
        Some(today)
    } else {
        previous(today, skip_weekends)
    };
    let mut current = 0u32;
    let mut cursor = anchor;
    while let Some(day) = cursor.filter(|d| dates.contains(d)) {
        current += 1;
        cursor = previous(day, skip_weekends);
    }

    Streaks { current, longest }
}
