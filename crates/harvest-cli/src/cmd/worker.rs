use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use harvest_core::config::Config;
use harvest_core::workers::{self, Assignment};

#[derive(Subcommand)]
pub enum WorkerSubcommand {
    /// Add a worker
    Add {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// List workers and the rooms they cover
    List,
    /// Assign a worker to a room (replaces the current one)
    Assign { room: String, worker: String },
    /// Remove the worker assigned to a room
    Unassign { room: String },
}

pub fn run(cfg: &Config, subcmd: WorkerSubcommand, json: bool) -> anyhow::Result<()> {
    let store = cfg.open_store().context("failed to open database")?;
    match subcmd {
        WorkerSubcommand::Add { name } => {
            let name = name.join(" ");
            let created = workers::add_worker(&store, &name)?;
            if json {
                print_json(&serde_json::json!({ "name": name.trim(), "created": created }))?;
            } else if created {
                println!("Added worker '{}'", name.trim());
            } else {
                println!("Worker '{}' already exists", name.trim());
            }
        }
        WorkerSubcommand::List => {
            let names = workers::list_workers(&store)?;
            let map = workers::assignments(&store)?;
            if json {
                print_json(&serde_json::json!({ "workers": names, "assignments": map }))?;
            } else if names.is_empty() {
                println!("No workers.");
            } else {
                let rows = names
                    .iter()
                    .map(|w| {
                        let rooms: Vec<&str> = map
                            .iter()
                            .filter(|(_, assigned)| *assigned == w)
                            .map(|(room, _)| room.as_str())
                            .collect();
                        vec![w.clone(), rooms.join(", ")]
                    })
                    .collect();
                print_table(&["WORKER", "ROOMS"], rows);
            }
        }
        WorkerSubcommand::Assign { room, worker } => {
            let outcome = workers::assign(&store, &room, &worker)?;
            report(&outcome, json)?;
        }
        WorkerSubcommand::Unassign { room } => {
            let outcome = workers::unassign(&store, &room)?;
            report(&outcome, json)?;
        }
    }
    Ok(())
}

fn report(outcome: &Assignment, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(outcome);
    }
    match outcome {
        Assignment::Assigned { room, worker } => println!("Assigned {worker} to {room}"),
        Assignment::Unassigned { room } => println!("Unassigned {room}"),
    }
    Ok(())
}
