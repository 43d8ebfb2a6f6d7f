use crate::cmd::today;
use anyhow::Context;
use clap::Subcommand;
use harvest_core::config::Config;
use harvest_core::forecast::{self, Cutoff};
use harvest_core::{export, io, records};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum ExportSubcommand {
    /// room,worker,plants,strain,days_remaining from each room's latest record
    Assignments {
        /// Write to a file instead of stdout
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },
    /// clone_week,harvest_week,plants,p5,p10,p15,p20
    Forecast {
        #[arg(long)]
        lookback_weeks: Option<u32>,
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },
}

pub fn run(cfg: &Config, subcmd: ExportSubcommand) -> anyhow::Result<()> {
    let store = cfg.open_store().context("failed to open database")?;
    let (csv, out) = match subcmd {
        ExportSubcommand::Assignments { out } => (export::assignments_csv(&store, today())?, out),
        ExportSubcommand::Forecast {
            lookback_weeks,
            out,
        } => {
            let weeks = lookback_weeks.unwrap_or(cfg.settings.forecast.lookback_weeks);
            let rows = forecast::summarize(&records::list(&store)?, Cutoff::new(today(), weeks));
            (export::forecast_csv(&rows), out)
        }
    };
    match out {
        Some(path) => {
            io::atomic_write(&path, csv.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}
