use crate::cmd::today;
use crate::output::{or_dash, print_json, print_table};
use anyhow::Context;
use harvest_core::config::Config;
use harvest_core::stats;

pub fn run(cfg: &Config, worker: Option<&str>, json: bool) -> anyhow::Result<()> {
    let store = cfg.open_store().context("failed to open database")?;
    let s = stats::compute(&store, worker, today())?;
    if json {
        return print_json(&s);
    }

    println!("Total plants: {}", s.total_plants);
    if let Some(w) = &s.worker {
        println!("Rooms for {w}:");
    }
    println!();
    print_table(
        &["ROOM", "DAYS LEFT", "WORKER"],
        s.series
            .iter()
            .map(|p| {
                vec![
                    p.room.clone(),
                    or_dash(p.days_remaining),
                    s.assignments.get(&p.room).cloned().unwrap_or_default(),
                ]
            })
            .collect(),
    );
    Ok(())
}
