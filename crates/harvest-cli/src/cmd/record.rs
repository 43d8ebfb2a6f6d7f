use crate::cmd::today;
use crate::output::{or_dash, print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use harvest_core::config::Config;
use harvest_core::records::{self, NewRecord, RecordView};

#[derive(Subcommand)]
pub enum RecordSubcommand {
    /// Add a flowering batch
    Add {
        room: String,
        plants: i64,
        strain: String,
        /// Flowering start date (YYYY-MM-DD)
        flower_date: String,
    },
    /// List records with week, harvest date and days remaining
    List {
        /// Only rooms assigned to this worker
        #[arg(long)]
        worker: Option<String>,
    },
    /// Show one record
    Get { id: i64 },
    /// Overwrite a record; omitted fields keep their value
    Edit {
        id: i64,
        #[arg(long)]
        room: Option<String>,
        #[arg(long)]
        plants: Option<i64>,
        #[arg(long)]
        strain: Option<String>,
        #[arg(long)]
        flower_date: Option<String>,
    },
    /// Delete a record
    Delete { id: i64 },
}

pub fn run(cfg: &Config, subcmd: RecordSubcommand, json: bool) -> anyhow::Result<()> {
    let store = cfg.open_store().context("failed to open database")?;
    match subcmd {
        RecordSubcommand::Add {
            room,
            plants,
            strain,
            flower_date,
        } => {
            let record = records::add(
                &store,
                &NewRecord {
                    room,
                    plants,
                    strain,
                    flower_date,
                },
            )?;
            let view = record.view(today());
            if json {
                print_json(&view)?;
            } else {
                println!(
                    "Added record [{}]: {} plants of {} in {} (week {}, harvest {})",
                    record.id,
                    record.plants,
                    record.strain,
                    record.room,
                    view.projection.week,
                    or_dash(view.projection.harvest_date)
                );
            }
        }
        RecordSubcommand::List { worker } => {
            let recs = match worker.as_deref() {
                Some(w) => records::list_for_worker(&store, w)?,
                None => records::list(&store)?,
            };
            let t = today();
            let views: Vec<RecordView> = recs.iter().map(|r| r.view(t)).collect();
            if json {
                print_json(&views)?;
            } else if views.is_empty() {
                println!("No records.");
            } else {
                print_table(
                    &["ID", "ROOM", "PLANTS", "STRAIN", "FLOWER", "WEEK", "HARVEST", "DAYS LEFT"],
                    views.iter().map(row).collect(),
                );
                println!("\nTotal plants: {}", records::total_plants(&store)?);
            }
        }
        RecordSubcommand::Get { id } => {
            let view = records::get(&store, id)?.view(today());
            if json {
                print_json(&view)?;
            } else {
                print_table(
                    &["ID", "ROOM", "PLANTS", "STRAIN", "FLOWER", "WEEK", "HARVEST", "DAYS LEFT"],
                    vec![row(&view)],
                );
            }
        }
        RecordSubcommand::Edit {
            id,
            room,
            plants,
            strain,
            flower_date,
        } => {
            let current = records::get(&store, id)?;
            let updated = records::update(
                &store,
                id,
                &NewRecord {
                    room: room.unwrap_or(current.room),
                    plants: plants.unwrap_or(current.plants),
                    strain: strain.unwrap_or(current.strain),
                    flower_date: flower_date.unwrap_or(current.flower_date),
                },
            )?;
            if json {
                print_json(&updated.view(today()))?;
            } else {
                println!("Updated record [{id}]");
            }
        }
        RecordSubcommand::Delete { id } => {
            records::delete(&store, id)?;
            if json {
                print_json(&serde_json::json!({ "deleted": id }))?;
            } else {
                println!("Deleted record [{id}]");
            }
        }
    }
    Ok(())
}

fn row(v: &RecordView) -> Vec<String> {
    vec![
        v.record.id.to_string(),
        v.record.room.clone(),
        v.record.plants.to_string(),
        v.record.strain.clone(),
        v.record.flower_date.clone(),
        v.projection.week.to_string(),
        or_dash(v.projection.harvest_date),
        or_dash(v.projection.days_remaining),
    ]
}
