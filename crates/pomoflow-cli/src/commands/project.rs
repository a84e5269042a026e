//! Project management commands for CLI.

use clap::Subcommand;
use pomoflow_core::storage::Database;
use pomoflow_core::{Project, SessionStore};

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a new project
    Create {
        /// Project name
        name: String,
        /// Display color, e.g. "#3b82f6"
        #[arg(long)]
        color: Option<String>,
    },
    /// List all projects
    List,
}

pub fn run(action: ProjectAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        ProjectAction::Create { name, color } => {
            let project = Project::new(name, color);
            db.create_project(&project)?;
            eprintln!("Project created: {}", project.id);
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        ProjectAction::List => {
            let projects = db.projects()?;
            println!("{}", serde_json::to_string_pretty(&projects)?);
        }
    }
    Ok(())
}
