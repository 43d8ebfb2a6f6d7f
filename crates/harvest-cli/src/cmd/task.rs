use crate::output::{or_dash, print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use harvest_core::config::Config;
use harvest_core::tasks::{self, Task, TaskPatch};
use harvest_core::types::TaskStatus;

#[derive(Subcommand)]
pub enum TaskSubcommand {
    /// Add a task
    Add {
        #[arg(required = true)]
        title: Vec<String>,
        /// Worker responsible
        #[arg(long)]
        assignee: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// List tasks, undated last
    List {
        /// pending, doing or done
        #[arg(long)]
        status: Option<String>,
    },
    /// Show one task
    Get { id: i64 },
    /// Edit task fields; pass an empty string to clear assignee or due date
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Set a task's status
    Status { id: i64, status: String },
    /// Delete a task
    Delete { id: i64 },
}

pub fn run(cfg: &Config, subcmd: TaskSubcommand, json: bool) -> anyhow::Result<()> {
    let store = cfg.open_store().context("failed to open database")?;
    match subcmd {
        TaskSubcommand::Add {
            title,
            assignee,
            due,
        } => {
            let task = tasks::add(&store, &title.join(" "), assignee.as_deref(), due.as_deref())?;
            if json {
                print_json(&task)?;
            } else {
                println!("Added task [{}]: {}", task.id, task.title);
            }
        }
        TaskSubcommand::List { status } => {
            let status = status.map(|s| s.parse::<TaskStatus>()).transpose()?;
            let list = tasks::list(&store, status)?;
            if json {
                print_json(&list)?;
            } else if list.is_empty() {
                println!("No tasks.");
            } else {
                print_table(
                    &["ID", "STATUS", "DUE", "ASSIGNEE", "TITLE"],
                    list.iter().map(row).collect(),
                );
                println!("\n{}", tasks::summarize(&list));
            }
        }
        TaskSubcommand::Get { id } => {
            let task = tasks::get(&store, id)?;
            if json {
                print_json(&task)?;
            } else {
                print_table(&["ID", "STATUS", "DUE", "ASSIGNEE", "TITLE"], vec![row(&task)]);
            }
        }
        TaskSubcommand::Edit {
            id,
            title,
            assignee,
            due,
            status,
        } => {
            let patch = TaskPatch {
                title,
                assignee,
                due_date: due,
                status,
            };
            let task = tasks::update(&store, id, &patch)?;
            if json {
                print_json(&task)?;
            } else {
                println!("Updated task [{id}]");
            }
        }
        TaskSubcommand::Status { id, status } => {
            let patch = TaskPatch {
                status: Some(status),
                ..Default::default()
            };
            let task = tasks::update(&store, id, &patch)?;
            if json {
                print_json(&task)?;
            } else {
                println!("Task [{id}] is now {}", task.status);
            }
        }
        TaskSubcommand::Delete { id } => {
            tasks::delete(&store, id)?;
            if json {
                print_json(&serde_json::json!({ "deleted": id }))?;
            } else {
                println!("Deleted task [{id}]");
            }
        }
    }
    Ok(())
}

fn row(t: &Task) -> Vec<String> {
    vec![
        t.id.to_string(),
        t.status.to_string(),
        or_dash(t.due_date.as_deref()),
        or_dash(t.assignee.as_deref()),
        t.title.clone(),
    ]
}
