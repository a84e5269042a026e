//! Statistics over recorded sessions.
//!
//! Everything here is a pure function of a session snapshot, the task and
//! project lists, and "now" in the caller's time zone. Nothing is cached or
//! persisted; callers recompute on demand.
//!
//! Calendar days are local to the time zone of `now`. A session belongs to
//! the day it completed on; the hour and weekday histograms use its start.

mod format;
mod insights;
mod projects;
mod streak;

use std::collections::BTreeSet;

use chrono::{DateTime, Days, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

pub use format::format_duration;
pub use insights::{Insights, DAY_NAMES};
pub use projects::{ProjectStats, NO_PROJECT};
pub use streak::{is_weekend, Streaks};

use crate::session::Session;
use crate::task::{Project, Task};

/// Estimate accuracy reported when there is nothing to measure.
pub const ACCURACY_SENTINEL: u32 = 100;

/// Options for [`compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsOptions {
    /// Skip Saturday and Sunday when counting streaks.
    pub exclude_weekends_from_streak: bool,
    /// Completed pomodoros per day counted as "goal reached".
    pub daily_goal: u32,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            exclude_weekends_from_streak: false,
            daily_goal: 8,
        }
    }
}

/// Totals for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStats {
    pub date: NaiveDate,
    /// Non-interrupted sessions completed that day.
    pub completed: u32,
    pub interrupted: u32,
    /// Minutes of the completed sessions.
    pub total_minutes: u32,
}

impl DayStats {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            completed: 0,
            interrupted: 0,
            total_minutes: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub current: u32,
    pub goal: u32,
    /// Capped at 100.
    pub percentage: u32,
    pub goal_reached: bool,
}

impl DailyProgress {
    pub fn new(current: u32, goal: u32) -> Self {
        let percentage = if goal == 0 {
            100
        } else {
            percent(current, goal).min(100)
        };
        Self {
            current,
            goal,
            percentage,
            goal_reached: current >= goal,
        }
    }
}

/// Display-ready statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_pomodoros: u32,
    pub total_interrupted: u32,
    /// Actual minutes of completed sessions.
    pub total_minutes: u32,
    /// Percent of sessions not interrupted; 100 with no sessions.
    pub completion_rate: u32,
    pub today: DayStats,
    /// Seven days, oldest first, ending today.
    pub this_week: Vec<DayStats>,
    pub by_project: Vec<ProjectStats>,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Estimated over actual pomodoros of completed tasks, in percent.
    pub estimate_accuracy: u32,
    pub avg_pomodoro_length: u32,
    /// Average over the last seven days including today.
    pub avg_pomodoro_length_7d: u32,
    pub insights: Insights,
    pub daily_progress: DailyProgress,
}

fn percent(numerator: u32, denominator: u32) -> u32 {
    (100.0 * f64::from(numerator) / f64::from(denominator)).round() as u32
}

fn mean_minutes<'a>(sessions: impl IntoIterator<Item = &'a Session>) -> u32 {
    let (count, sum) = sessions
        .into_iter()
        .fold((0u32, 0u64), |(n, s), x| (n + 1, s + u64::from(x.duration_minutes)));
    if count == 0 {
        return 0;
    }
    (sum as f64 / f64::from(count)).round() as u32
}

/// Estimated over actual pomodoros across completed tasks.
pub fn estimate_accuracy(tasks: &[Task]) -> u32 {
    let (estimated, actual) = tasks
        .iter()
        .filter(|t| t.completed)
        .fold((0u32, 0u32), |(e, a), t| {
            (
                e.saturating_add(t.estimated_pomodoros),
                a.saturating_add(t.actual_pomodoros),
            )
        });
    if actual == 0 {
        return ACCURACY_SENTINEL;
    }
    percent(estimated, actual)
}

/// Compute every statistic for `now`'s calendar day and time zone.
pub fn compute<Tz: TimeZone>(
    sessions: &[Session],
    tasks: &[Task],
    projects: &[Project],
    options: &StatsOptions,
    now: &DateTime<Tz>,
) -> StatsSnapshot {
    let tz = now.timezone();
    let today = now.date_naive();
    let local_date = |s: &Session| s.completed_at.with_timezone(&tz).date_naive();

    let completed: Vec<&Session> = sessions.iter().filter(|s| !s.interrupted).collect();
    let total_pomodoros = completed.len() as u32;
    let total_interrupted = sessions.len() as u32 - total_pomodoros;
    let total_minutes = completed
        .iter()
        .fold(0u32, |acc, s| acc.saturating_add(s.duration_minutes));
    let completion_rate = match total_pomodoros + total_interrupted {
        0 => 100,
        all => percent(total_pomodoros, all),
    };

    let day = |date: NaiveDate| {
        sessions
            .iter()
            .filter(|s| local_date(*s) == date)
            .fold(DayStats::empty(date), |mut acc, s| {
                if s.interrupted {
                    acc.interrupted += 1;
                } else {
                    acc.completed += 1;
                    acc.total_minutes = acc.total_minutes.saturating_add(s.duration_minutes);
                }
                acc
            })
    };
    let this_week: Vec<DayStats> = (0..7u64)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(day)
        .collect();
    let today_stats = day(today);

    let active: BTreeSet<NaiveDate> = completed.iter().map(|s| local_date(*s)).collect();
    let streaks = streak::compute(&active, today, options.exclude_weekends_from_streak);

    let week_start = today.checked_sub_days(Days::new(6)).unwrap_or(today);
    let avg_pomodoro_length_7d = mean_minutes(completed.iter().copied().filter(|s| {
        let date = local_date(*s);
        date >= week_start && date <= today
    }));

    StatsSnapshot {
        total_pomodoros,
        total_interrupted,
        total_minutes,
        completion_rate,
        daily_progress: DailyProgress::new(today_stats.completed, options.daily_goal),
        today: today_stats,
        this_week,
        by_project: projects::compute(completed.iter().copied(), tasks, projects),
        current_streak: streaks.current,
        longest_streak: streaks.longest,
        estimate_accuracy: estimate_accuracy(tasks),
        avg_pomodoro_length: mean_minutes(completed.iter().copied()),
        avg_pomodoro_length_7d,
        insights: insights::compute(completed.iter().copied(), &tz),
    }
}

/// [`compute`] against the system clock and local time zone.
pub fn compute_now(
    sessions: &[Session],
    tasks: &[Task],
    projects: &[Project],
    options: &StatsOptions,
) -> StatsSnapshot {
    compute(sessions, tasks, projects, options, &Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn now() -> DateTime<Utc> {
        // Wednesday.
        DateTime::parse_from_rfc3339("2024-01-10T15:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn session_at(completed_at: DateTime<Utc>, minutes: u32, interrupted: bool) -> Session {
        Session {
            id: uuid::Uuid::new_v4().to_string(),
            task_id: None,
            duration_minutes: minutes,
            started_at: completed_at - Duration::minutes(minutes.into()),
            completed_at,
            interrupted,
        }
    }

    #[test]
    fn empty_input() {
        let stats = compute(&[], &[], &[], &StatsOptions::default(), &now());
        assert_eq!(stats.total_pomodoros, 0);
        assert_eq!(stats.total_minutes, 0);
        assert_eq!(stats.completion_rate, 100);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 0);
        assert_eq!(stats.this_week.len(), 7);
        assert_eq!(stats.estimate_accuracy, ACCURACY_SENTINEL);
        assert_eq!(stats.avg_pomodoro_length, 0);
        assert!(stats.insights.most_productive_day.is_none());
        assert!(stats.by_project.is_empty());
    }

    #[test]
    fn totals_and_completion_rate() {
        let at = now() - Duration::hours(1);
        let sessions = [
            session_at(at, 25, false),
            session_at(at, 25, false),
            session_at(at, 25, true),
        ];
        let stats = compute(&sessions, &[], &[], &StatsOptions::default(), &now());
        assert_eq!(stats.total_pomodoros, 2);
        assert_eq!(stats.total_interrupted, 1);
        assert_eq!(stats.total_minutes, 50);
        assert_eq!(stats.completion_rate, 67);
        assert_eq!(stats.today.completed, 2);
        assert_eq!(stats.today.interrupted, 1);
        assert_eq!(stats.today.total_minutes, 50);
    }

    #[test]
    fn variable_length_sessions_average() {
        let at = now() - Duration::hours(1);
        let sessions = [
            session_at(at, 60, false),
            session_at(at, 90, false),
            session_at(at, 45, false),
        ];
        let stats = compute(&sessions, &[], &[], &StatsOptions::default(), &now());
        assert_eq!(stats.avg_pomodoro_length, 65);
        assert_eq!(stats.total_minutes, 195);
    }

    #[test]
    fn seven_day_average_ignores_older_sessions() {
        let sessions = [
            session_at(now() - Duration::days(6), 30, false),
            session_at(now() - Duration::days(7), 90, false),
            session_at(now(), 50, false),
        ];
        let stats = compute(&sessions, &[], &[], &StatsOptions::default(), &now());
        assert_eq!(stats.avg_pomodoro_length_7d, 40);
        assert_eq!(stats.avg_pomodoro_length, 57);
    }

    #[test]
    fn this_week_runs_oldest_to_today() {
        let sessions = [session_at(now() - Duration::days(2), 25, false)];
        let stats = compute(&sessions, &[], &[], &StatsOptions::default(), &now());
        let dates: Vec<_> = stats.this_week.iter().map(|d| d.date).collect();
        assert_eq!(dates.first().copied(), now().date_naive().checked_sub_days(Days::new(6)));
        assert_eq!(dates.last().copied(), Some(now().date_naive()));
        assert_eq!(stats.this_week[4].completed, 1);
    }

    #[test]
    fn three_day_streak_ending_today() {
        let sessions = [
            session_at(now(), 25, false),
            session_at(now() - Duration::days(1), 25, false),
            session_at(now() - Duration::days(2), 25, false),
        ];
        let stats = compute(&sessions, &[], &[], &StatsOptions::default(), &now());
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.longest_streak, 3);
    }

    #[test]
    fn interrupted_sessions_do_not_extend_streaks() {
        let sessions = [session_at(now(), 25, true)];
        let stats = compute(&sessions, &[], &[], &StatsOptions::default(), &now());
        assert_eq!(stats.current_streak, 0);
    }

    #[test]
    fn estimate_accuracy_over_completed_tasks() {
        let mut under = Task::new("Task 1", 2);
        under.completed = true;
        under.actual_pomodoros = 4;
        let mut over = Task::new("Task 2", 4);
        over.completed = true;
        over.actual_pomodoros = 2;
        let mut open = Task::new("Task 3", 10);
        open.actual_pomodoros = 1;
        assert_eq!(estimate_accuracy(&[under, over, open]), 100);

        let mut slow = Task::new("Slow", 1);
        slow.completed = true;
        slow.actual_pomodoros = 3;
        assert_eq!(estimate_accuracy(&[slow]), 33);
    }

    #[test]
    fn daily_progress_caps_at_hundred() {
        let p = DailyProgress::new(10, 8);
        assert_eq!(p.percentage, 100);
        assert!(p.goal_reached);
        let p = DailyProgress::new(3, 8);
        assert_eq!(p.percentage, 38);
        assert!(!p.goal_reached);
    }

    #[test]
    fn days_follow_the_callers_time_zone() {
        // 23:30 UTC on the 9th is already the 10th in UTC+2.
        let late = DateTime::parse_from_rfc3339("2024-01-09T23:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let sessions = [session_at(late, 25, false)];
        let plus_two = chrono::FixedOffset::east_opt(2 * 3600).unwrap();
        let local_now = now().with_timezone(&plus_two);

        let stats = compute(&sessions, &[], &[], &StatsOptions::default(), &local_now);
        assert_eq!(stats.today.completed, 1);
        let stats = compute(&sessions, &[], &[], &StatsOptions::default(), &now());
        assert_eq!(stats.today.completed, 0);
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        let mut big = Task::new("Big", u32::MAX);
        big.completed = true;
        big.actual_pomodoros = u32::MAX;
        let twin = big.clone();
        assert_eq!(estimate_accuracy(&[big, twin]), 100);

        let long = Session {
            id: "long".into(),
            task_id: None,
            duration_minutes: u32::MAX,
            started_at: now() - Duration::hours(1),
            completed_at: now(),
            interrupted: false,
        };
        let sessions = [long.clone(), Session { id: "again".into(), ..long }];
        let stats = compute(&sessions, &[], &[], &StatsOptions::default(), &now());
        assert_eq!(stats.total_minutes, u32::MAX);
        assert_eq!(stats.today.total_minutes, u32::MAX);
        assert_eq!(stats.by_project[0].minutes, u32::MAX);
    }
}
