use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use harvest_core::config::Config;
use harvest_core::{io, store};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum DbSubcommand {
    /// Show database location, tables, record columns and row counts
    Diag,
    /// Copy the database file somewhere safe
    Backup {
        /// Destination file
        out: PathBuf,
    },
    /// Replace the database with a previously backed-up copy
    Restore {
        /// SQLite file to restore from
        file: PathBuf,
    },
}

pub fn run(cfg: &Config, subcmd: DbSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        DbSubcommand::Diag => diag(cfg, json),
        DbSubcommand::Backup { out } => {
            // Opening first guarantees there is a schema'd file to copy.
            cfg.open_store().context("failed to open database")?;
            let bytes = store::read_db_bytes(&cfg.db_path)?;
            io::atomic_write(&out, &bytes)
                .with_context(|| format!("failed to write {}", out.display()))?;
            if json {
                print_json(&serde_json::json!({ "path": out, "bytes": bytes.len() }))?;
            } else {
                println!("Backed up {} bytes to {}", bytes.len(), out.display());
            }
            Ok(())
        }
        DbSubcommand::Restore { file } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            store::replace_db(&cfg.db_path, &bytes)?;
            if json {
                print_json(&serde_json::json!({ "replaced": true, "bytes": bytes.len() }))?;
            } else {
                println!(
                    "Restored {} from {} ({} bytes)",
                    cfg.db_path.display(),
                    file.display(),
                    bytes.len()
                );
            }
            Ok(())
        }
    }
}

fn diag(cfg: &Config, json: bool) -> anyhow::Result<()> {
    let store = cfg.open_store().context("failed to open database")?;
    let diag = store.diag()?;
    let masked = cfg.masked_key();

    if json {
        return print_json(&serde_json::json!({
            "data_dir": cfg.data_dir,
            "db_path": cfg.db_path,
            "diag": diag,
            "api_key_found": masked.is_some(),
            "model": cfg.model,
        }));
    }

    println!("Data dir:  {}", cfg.data_dir.display());
    println!("Database:  {}", cfg.db_path.display());
    println!("Tables:    {}", diag.tables.join(", "));
    println!(
        "Rows:      records={} workers={} tasks={}",
        diag.records_count, diag.workers_count, diag.tasks_count
    );
    match masked {
        Some(sample) => println!("Advice:    {} (key {sample})", cfg.model),
        None => println!("Advice:    rule table only (no API key)"),
    }
    println!();
    print_table(
        &["CID", "COLUMN", "TYPE"],
        diag.records_columns
            .iter()
            .map(|c| vec![c.cid.to_string(), c.name.clone(), c.kind.clone()])
            .collect(),
    );
    Ok(())
}
