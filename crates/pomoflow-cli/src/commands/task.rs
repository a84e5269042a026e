//! Task management commands for CLI.

use clap::Subcommand;
use pomoflow_core::storage::Database;
use pomoflow_core::{SessionStore, Task};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Create {
        /// Task title
        title: String,
        /// Project ID to associate with
        #[arg(long)]
        project_id: Option<String>,
        /// Estimated pomodoros (default: 1)
        #[arg(long, default_value = "1")]
        estimated_pomodoros: u32,
    },
    /// List tasks
    List {
        /// Filter by project ID
        #[arg(long)]
        project_id: Option<String>,
        /// Only tasks not yet completed
        #[arg(long)]
        open: bool,
    },
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Mark a task as completed
    Complete {
        /// Task ID
        id: String,
    },
    /// Mark a completed task as open again
    Reopen {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        TaskAction::Create {
            title,
            project_id,
            estimated_pomodoros,
        } => {
            let mut task = Task::new(title, estimated_pomodoros);
            task.project_id = project_id;
            db.create_task(&task)?;
            eprintln!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { project_id, open } => {
            let tasks: Vec<_> = db
                .tasks()?
                .into_iter()
                .filter(|task| project_id.is_none() || task.project_id == project_id)
                .filter(|task| !(open && task.completed))
                .collect();
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        TaskAction::Get { id } => {
            let task = db.get_task(&id)?.ok_or(format!("Task not found: {id}"))?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Complete { id } => {
            db.set_task_completed(&id, true)?;
            println!("Task completed: {id}");
        }
        TaskAction::Reopen { id } => {
            db.set_task_completed(&id, false)?;
            println!("Task reopened: {id}");
        }
    }
    Ok(())
}
