//! When sessions happen: day-of-week and hour-of-day histograms.
//!
//! Buckets are keyed off each session's local start time. Day buckets use
//! Sunday = 0 through Saturday = 6.

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::session::Session;

pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    /// Completed sessions per weekday, Sunday first.
    pub by_day_of_week: [u32; 7],
    /// Completed sessions per local hour.
    pub by_hour: [u32; 24],
    pub most_productive_day: Option<String>,
    pub peak_day_count: u32,
    pub most_productive_hour: Option<u32>,
    pub peak_hour_count: u32,
}

/// Index and count of the fullest bucket. Lowest index wins ties.
fn peak(buckets: &[u32]) -> Option<(usize, u32)> {
    let mut best: Option<(usize, u32)> = None;
    for (i, &count) in buckets.iter().enumerate() {
        if count > 0 && best.map_or(true, |(_, c)| count > c) {
            best = Some((i, count));
        }
    }
    best
}

pub fn compute<'a, Tz, I>(completed: I, tz: &Tz) -> Insights
where
    Tz: TimeZone,
    I: IntoIterator<Item = &'a Session>,
{
    let mut by_day_of_week = [0u32; 7];
    let mut by_hour = [0u32; 24];
    for session in completed {
        let local: DateTime<Tz> = session.started_at.with_timezone(tz);
        by_day_of_week[local.weekday().num_days_from_sunday() as usize] += 1;
        by_hour[local.hour() as usize] += 1;
    }

    let day = peak(&by_day_of_week);
    let hour = peak(&by_hour);
    Insights {
        by_day_of_week,
        by_hour,
        most_productive_day: day.map(|(i, _)| DAY_NAMES[i].to_string()),
        peak_day_count: day.map_or(0, |(_, c)| c),
        most_productive_hour: hour.map(|(i, _)| i as u32),
        peak_hour_count: hour.map_or(0, |(_, c)| c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn started(rfc3339: &str) -> Session {
        let at = DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc);
        Session {
            id: rfc3339.into(),
            task_id: None,
            duration_minutes: 25,
            started_at: at,
            completed_at: at,
            interrupted: false,
        }
    }

    #[test]
    fn no_data_has_no_peaks() {
        let insights = compute(std::iter::empty(), &Utc);
        assert!(insights.most_productive_day.is_none());
        assert!(insights.most_productive_hour.is_none());
        assert_eq!(insights.peak_day_count, 0);
    }

    #[test]
    fn monday_twice_beats_tuesday_once() {
        let sessions = [
            started("2024-01-01T09:00:00Z"),
            started("2024-01-01T14:00:00Z"),
            started("2024-01-02T09:00:00Z"),
        ];
        let insights = compute(&sessions, &Utc);
        assert_eq!(insights.most_productive_day.as_deref(), Some("Monday"));
        assert_eq!(insights.peak_day_count, 2);
        assert_eq!(insights.by_day_of_week[1], 2);
        assert_eq!(insights.most_productive_hour, Some(9));
        assert_eq!(insights.peak_hour_count, 2);
    }

    #[test]
    fn ties_go_to_the_lowest_bucket() {
        // Saturday then Sunday, one each.
        let sessions = [
            started("2024-01-06T18:00:00Z"),
            started("2024-01-07T07:00:00Z"),
        ];
        let insights = compute(&sessions, &Utc);
        assert_eq!(insights.most_productive_day.as_deref(), Some("Sunday"));
        assert_eq!(insights.most_productive_hour, Some(7));
    }

    #[test]
    fn buckets_use_local_time() {
        let tokyo = chrono::FixedOffset::east_opt(9 * 3600).unwrap();
        // Sunday 20:00 UTC is Monday 05:00 in UTC+9.
        let insights = compute(&[started("2024-01-07T20:00:00Z")], &tokyo);
        assert_eq!(insights.most_productive_day.as_deref(), Some("Monday"));
        assert_eq!(insights.most_productive_hour, Some(5));
    }
}
