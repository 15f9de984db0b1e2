//! Task backlog commands.

use autoplan_core::{Task, TaskStatus};
use clap::Subcommand;

use super::{parse_instant, print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a pending task
    Add {
        /// Task title
        title: String,
        /// Due date (RFC 3339)
        #[arg(long)]
        due: String,
        /// Priority, higher is scheduled first
        #[arg(long, default_value = "0")]
        priority: i32,
        /// Estimated duration in minutes
        #[arg(long)]
        minutes: Option<i64>,
        /// Task description
        #[arg(long)]
        description: Option<String>,
    },
    /// List tasks
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a task's status
    Status {
        /// Task ID
        id: String,
        /// pending, in_progress or done
        status: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

pub fn run(ctx: &Context, action: TaskAction) -> CliResult {
    let db = ctx.open_db()?;

    match action {
        TaskAction::Add {
            title,
            due,
            priority,
            minutes,
            description,
        } => {
            let mut task =
                Task::new(&ctx.user, title, parse_instant(&due)?).with_priority(priority);
            task.estimated_minutes = minutes;
            if let Some(description) = description {
                task = task.with_description(description);
            }
            db.create_task(&task)?;
            println!("Task created: {}", task.id);
        }
        TaskAction::List { json } => {
            let tasks = db.list_tasks(&ctx.user)?;
            if json {
                return print_json(&tasks);
            }
            if tasks.is_empty() {
                println!("No tasks.");
            }
            for task in &tasks {
                let minutes = task
                    .estimated_minutes
                    .map(|m| format!("{m}m"))
                    .unwrap_or_else(|| "-".into());
                println!(
                    "{}  [{}] p{} {:>5}  due {}  {}",
                    task.id,
                    task.status,
                    task.priority,
                    minutes,
                    task.due_at.format("%Y-%m-%d %H:%M"),
                    task.title
                );
            }
        }
        TaskAction::Status { id, status } => {
            let status: TaskStatus = status.parse()?;
            if !db.set_task_status(&id, status)? {
                return Err(format!("task not found: {id}").into());
            }
            println!("ok");
        }
        TaskAction::Delete { id } => {
            if !db.delete_task(&id)? {
                return Err(format!("task not found: {id}").into());
            }
            println!("Task deleted: {id}");
        }
    }
    Ok(())
}
