//! Tasks and projects that pomodoro sessions can be attributed to.
//!
//! Both are plain records owned by the session store. The core only reads
//! them for statistics and bumps `actual_pomodoros` when a session finishes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unit of work that sessions are counted against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "default_estimate")]
    pub estimated_pomodoros: u32,
    #[serde(default)]
    pub actual_pomodoros: u32,
    pub created_at: DateTime<Utc>,
}

fn default_estimate() -> u32 {
    1
}

impl Task {
    pub fn new(title: impl Into<String>, estimated_pomodoros: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            project_id: None,
            completed: false,
            estimated_pomodoros,
            actual_pomodoros: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }
}

/// Grouping key for tasks. Has no behavior of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

fn default_color() -> String {
    "#ef4444".into()
}

impl Project {
    pub fn new(name: impl Into<String>, color: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            color: color.unwrap_or_else(default_color),
            completed: false,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_starts_uncounted() {
        let task = Task::new("Write report", 3).with_project("p1");
        assert_eq!(task.actual_pomodoros, 0);
        assert_eq!(task.estimated_pomodoros, 3);
        assert_eq!(task.project_id.as_deref(), Some("p1"));
        assert!(!task.completed);
    }

    #[test]
    fn project_defaults_color() {
        let project = Project::new("Home", None);
        assert_eq!(project.color, "#ef4444");
        let json = serde_json::to_value(&project).unwrap();
        assert!(json.get("createdAt").is_some());
    }
}
