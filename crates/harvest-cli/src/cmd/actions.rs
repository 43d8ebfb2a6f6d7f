use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use harvest_core::actions::{self, ActionFilter};
use harvest_core::config::Config;

#[derive(Subcommand)]
pub enum ActionsSubcommand {
    /// Show the action log, newest first
    List {
        #[arg(long)]
        worker: Option<String>,
        /// Exact action name, e.g. "Run Advisor"
        #[arg(long)]
        action: Option<String>,
        #[arg(long, default_value_t = actions::DEFAULT_LIMIT)]
        limit: u32,
    },
    /// Delete every logged action
    Clear,
}

pub fn run(cfg: &Config, subcmd: ActionsSubcommand, json: bool) -> anyhow::Result<()> {
    let store = cfg.open_store().context("failed to open database")?;
    match subcmd {
        ActionsSubcommand::List {
            worker,
            action,
            limit,
        } => {
            let rows = actions::list(
                &store,
                &ActionFilter {
                    worker,
                    action,
                    limit: Some(limit),
                },
            )?;
            if json {
                print_json(&rows)?;
            } else if rows.is_empty() {
                println!("No actions logged.");
            } else {
                print_table(
                    &["TIME", "WORKER", "ACTION", "ROOM", "DETAILS"],
                    rows.into_iter()
                        .map(|a| vec![a.ts, a.worker, a.action, a.room, a.details])
                        .collect(),
                );
            }
        }
        ActionsSubcommand::Clear => {
            let removed = actions::clear(&store)?;
            if json {
                print_json(&serde_json::json!({ "removed": removed }))?;
            } else {
                println!("Cleared {removed} logged actions");
            }
        }
    }
    Ok(())
}
