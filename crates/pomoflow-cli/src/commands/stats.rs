use clap::Subcommand;
use pomoflow_core::stats::{self, format_duration, StatsSnapshot};
use pomoflow_core::storage::Database;
use pomoflow_core::{Config, SessionStore};
use serde_json::json;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's stats and daily goal progress
    Today,
    /// Full statistics snapshot
    All,
    /// Human-readable summary
    Summary,
}

fn snapshot() -> Result<StatsSnapshot, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    Ok(stats::compute_now(
        &db.list()?,
        &db.tasks()?,
        &db.projects()?,
        &config.stats_options(),
    ))
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let stats = snapshot()?;

    match action {
        StatsAction::Today => {
            let today = json!({
                "today": stats.today,
                "daily_progress": stats.daily_progress,
            });
            println!("{}", serde_json::to_string_pretty(&today)?);
        }
        StatsAction::All => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Summary => {
            println!(
                "Today: {}/{} pomodoros ({})",
                stats.daily_progress.current,
                stats.daily_progress.goal,
                format_duration(stats.today.total_minutes)
            );
            println!(
                "Total: {} pomodoros, {} focused, {}% completed",
                stats.total_pomodoros,
                format_duration(stats.total_minutes),
                stats.completion_rate
            );
            println!(
                "Streak: {} days (longest {})",
                stats.current_streak, stats.longest_streak
            );
            for project in &stats.by_project {
                println!(
                    "  {}: {} ({})",
                    project.project_name,
                    project.pomodoros,
                    format_duration(project.minutes)
                );
            }
            if let Some(day) = &stats.insights.most_productive_day {
                println!("Most productive day: {day} ({})", stats.insights.peak_day_count);
            }
            if let Some(hour) = stats.insights.most_productive_hour {
                println!(
                    "Most productive hour: {hour:02}:00 ({})",
                    stats.insights.peak_hour_count
                );
            }
        }
    }
    Ok(())
}
