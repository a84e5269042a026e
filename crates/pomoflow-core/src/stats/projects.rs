use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::session::Session;
use crate::task::{Project, Task};

/// Bucket name for sessions that cannot be tied to a known project.
pub const NO_PROJECT: &str = "No Project";

/// Completed work attributed to one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStats {
    /// `None` for the "No Project" bucket.
    pub project_id: Option<String>,
    pub project_name: String,
    pub color: Option<String>,
    pub pomodoros: u32,
    /// Sum of actual session lengths.
    pub minutes: u32,
}

/// Group completed sessions by their task's project.
///
/// Projects come out in list order, followed by the "No Project" bucket.
/// Only groups with at least one session are returned. A session whose task
/// or project is missing from the lists lands in "No Project".
pub fn compute<'a, I>(completed: I, tasks: &[Task], projects: &[Project]) -> Vec<ProjectStats>
where
    I: IntoIterator<Item = &'a Session>,
{
    let project_index: HashMap<&str, usize> = projects
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id.as_str(), i))
        .collect();
    let task_project: HashMap<&str, usize> = tasks
        .iter()
        .filter_map(|t| {
            let idx = project_index.get(t.project_id.as_deref()?)?;
            Some((t.id.as_str(), *idx))
        })
        .collect();

    let mut totals = vec![(0u32, 0u32); projects.len()];
    let mut unassigned = (0u32, 0u32);
    for session in completed {
        let project = session
            .task_id
            .as_deref()
            .and_then(|id| task_project.get(id).copied());
        let slot = match project {
            Some(i) => &mut totals[i],
            None => &mut unassigned,
        };
        slot.0 += 1;
        slot.1 = slot.1.saturating_add(session.duration_minutes);
    }

    let mut out: Vec<ProjectStats> = projects
        .iter()
        .zip(totals)
        .filter(|(_, (count, _))| *count > 0)
        .map(|(project, (pomodoros, minutes))| ProjectStats {
            project_id: Some(project.id.clone()),
            project_name: project.name.clone(),
            color: Some(project.color.clone()),
            pomodoros,
            minutes,
        })
        .collect();
    if unassigned.0 > 0 {
        out.push(ProjectStats {
            project_id: None,
            project_name: NO_PROJECT.to_string(),
            color: None,
            pomodoros: unassigned.0,
            minutes: unassigned.1,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(task_id: Option<&str>, minutes: u32) -> Session {
        let now = Utc::now();
        Session {
            id: uuid::Uuid::new_v4().to_string(),
            task_id: task_id.map(String::from),
            duration_minutes: minutes,
            started_at: now,
            completed_at: now,
            interrupted: false,
        }
    }

    fn fixture() -> (Vec<Task>, Vec<Project>) {
        let mut work = Project::new("Work", Some("#ff0000".into()));
        work.id = "p1".into();
        let mut personal = Project::new("Personal", Some("#00ff00".into()));
        personal.id = "p2".into();

        let mut t1 = Task::new("Task 1", 2).with_project("p1");
        t1.id = "t1".into();
        let mut t2 = Task::new("Task 2", 4).with_project("p2");
        t2.id = "t2".into();
        let mut loose = Task::new("Loose", 1);
        loose.id = "t3".into();
        (vec![t1, t2, loose], vec![work, personal])
    }

    #[test]
    fn follows_project_list_order_not_volume() {
        let (tasks, projects) = fixture();
        let sessions = [
            session(Some("t2"), 25),
            session(Some("t2"), 25),
            session(Some("t2"), 25),
            session(Some("t1"), 50),
        ];
        let rollup = compute(&sessions, &tasks, &projects);
        assert_eq!(rollup.len(), 2);
        assert_eq!(rollup[0].project_name, "Work");
        assert_eq!(rollup[0].minutes, 50);
        assert_eq!(rollup[1].project_name, "Personal");
        assert_eq!(rollup[1].pomodoros, 3);
    }

    #[test]
    fn unattributed_sessions_go_last() {
        let (tasks, projects) = fixture();
        let sessions = [
            session(None, 30),
            session(Some("t3"), 45),
            session(Some("missing"), 10),
            session(Some("t1"), 25),
        ];
        let rollup = compute(&sessions, &tasks, &projects);
        assert_eq!(rollup.len(), 2);
        assert_eq!(rollup[0].project_id.as_deref(), Some("p1"));
        let last = &rollup[1];
        assert_eq!(last.project_name, NO_PROJECT);
        assert_eq!(last.pomodoros, 3);
        assert_eq!(last.minutes, 85);
    }

    #[test]
    fn task_with_unknown_project_is_unassigned() {
        let (mut tasks, projects) = fixture();
        tasks[0].project_id = Some("gone".into());
        let rollup = compute(&[session(Some("t1"), 25)], &tasks, &projects);
        assert_eq!(rollup[0].project_name, NO_PROJECT);
    }
}
