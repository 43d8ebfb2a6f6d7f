mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::{
    actions::ActionsSubcommand, checklist::ChecklistSubcommand, db::DbSubcommand,
    export::ExportSubcommand, log::LogSubcommand, record::RecordSubcommand,
    task::TaskSubcommand, worker::WorkerSubcommand,
};
use harvest_core::config::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "harvest",
    about = "Grow-room operations: flowering records, crews, tasks, clone forecast and nutrient advice",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory holding harvest.db, harvest.yaml and checklist.json
    #[arg(long, global = true, env = "DB_DIR")]
    data_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP dashboard API
    Serve {
        /// Port to listen on (default: PORT or 5000; 0 = OS-assigned)
        #[arg(long)]
        port: Option<u16>,

        /// Open a browser once listening
        #[arg(long)]
        open: bool,
    },

    /// Manage flowering records
    Record {
        #[command(subcommand)]
        subcommand: RecordSubcommand,
    },

    /// Manage workers and room assignments
    Worker {
        #[command(subcommand)]
        subcommand: WorkerSubcommand,
    },

    /// Manage tasks
    Task {
        #[command(subcommand)]
        subcommand: TaskSubcommand,
    },

    /// Daily activity log
    Log {
        #[command(subcommand)]
        subcommand: LogSubcommand,
    },

    /// Plant totals and days remaining per room
    Stats {
        /// Only rooms assigned to this worker
        #[arg(long)]
        worker: Option<String>,
    },

    /// Clone-demand forecast by week
    Forecast {
        /// Weeks before the current one to include (default from harvest.yaml)
        #[arg(long)]
        lookback_weeks: Option<u32>,

        /// List the records behind each week
        #[arg(long)]
        detail: bool,
    },

    /// Write CSV exports
    Export {
        #[command(subcommand)]
        subcommand: ExportSubcommand,
    },

    /// Nutrient advice for a record
    Advise {
        /// Record id
        record_id: i64,

        /// Nutrient program: athena or raw_npk (default from harvest.yaml)
        #[arg(long)]
        program: Option<String>,

        /// Advise for this table week (1-10) instead of the projected one
        #[arg(long, allow_negative_numbers = true)]
        week: Option<i64>,

        /// Tank size in gallons
        #[arg(long)]
        tank: Option<String>,

        /// Light setup, e.g. "LED 1000W"
        #[arg(long)]
        lights: Option<String>,

        /// Observations; mentions of burn, pale/yellow or lockout add remedies
        #[arg(long)]
        notes: Option<String>,
    },

    /// Worker action log
    Actions {
        #[command(subcommand)]
        subcommand: ActionsSubcommand,
    },

    /// Database diagnostics, backup and restore
    Db {
        #[command(subcommand)]
        subcommand: DbSubcommand,
    },

    /// Licensing document checklist
    Checklist {
        #[command(subcommand)]
        subcommand: ChecklistSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = Config::from_env(cli.data_dir.clone())
        .map_err(anyhow::Error::from)
        .and_then(|cfg| dispatch(&cfg, cli.command, cli.json));

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn dispatch(cfg: &Config, command: Commands, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Serve { port, open } => cmd::serve::run(cfg, port, open),
        Commands::Record { subcommand } => cmd::record::run(cfg, subcommand, json),
        Commands::Worker { subcommand } => cmd::worker::run(cfg, subcommand, json),
        Commands::Task { subcommand } => cmd::task::run(cfg, subcommand, json),
        Commands::Log { subcommand } => cmd::log::run(cfg, subcommand, json),
        Commands::Stats { worker } => cmd::stats::run(cfg, worker.as_deref(), json),
        Commands::Forecast {
            lookback_weeks,
            detail,
        } => cmd::forecast::run(cfg, lookback_weeks, detail, json),
        Commands::Export { subcommand } => cmd::export::run(cfg, subcommand),
        Commands::Advise {
            record_id,
            program,
            week,
            tank,
            lights,
            notes,
        } => cmd::advise::run(
            cfg,
            harvest_core::advice::RunAdvice {
                record_id,
                program,
                week,
                tank,
                lights,
                notes,
            },
            json,
        ),
        Commands::Actions { subcommand } => cmd::actions::run(cfg, subcommand, json),
        Commands::Db { subcommand } => cmd::db::run(cfg, subcommand, json),
        Commands::Checklist { subcommand } => cmd::checklist::run(cfg, subcommand, json),
    }
}
