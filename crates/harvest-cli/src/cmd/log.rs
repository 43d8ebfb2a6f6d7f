use crate::cmd::today;
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use harvest_core::config::Config;
use harvest_core::daily_log::{self, LogFilter};

#[derive(Subcommand)]
pub enum LogSubcommand {
    /// Append an entry, e.g. `harvest log add F2 Water --note "2 gal each"`
    Add {
        room: String,
        /// Activity: Water, Feed, IPM, Defoliate...
        kind: String,
        #[arg(long, default_value = "")]
        note: String,
        /// Entry date (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List entries, newest first
    List {
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        room: Option<String>,
    },
}

pub fn run(cfg: &Config, subcmd: LogSubcommand, json: bool) -> anyhow::Result<()> {
    let store = cfg.open_store().context("failed to open database")?;
    match subcmd {
        LogSubcommand::Add {
            room,
            kind,
            note,
            date,
        } => {
            let entry = daily_log::append(&store, date.as_deref(), &room, &kind, &note, today())?;
            if json {
                print_json(&entry)?;
            } else {
                println!("Logged {} in {} on {}", entry.kind, entry.room, entry.date);
            }
        }
        LogSubcommand::List { date, room } => {
            let entries = daily_log::list(&store, &LogFilter { date, room })?;
            if json {
                print_json(&entries)?;
            } else if entries.is_empty() {
                println!("No log entries.");
            } else {
                print_table(
                    &["DATE", "ROOM", "ACTIVITY", "NOTE"],
                    entries
                        .into_iter()
                        .map(|e| vec![e.date, e.room, e.kind, e.note])
                        .collect(),
                );
            }
        }
    }
    Ok(())
}
