use crate::cmd::today;
use crate::output::{print_json, print_table};
use anyhow::Context;
use harvest_core::config::Config;
use harvest_core::forecast::{self, Cutoff, ForecastRow};
use harvest_core::records;

const HEADERS: [&str; 7] = ["CLONE WEEK", "HARVEST WEEK", "PLANTS", "+5%", "+10%", "+15%", "+20%"];

pub fn run(cfg: &Config, lookback_weeks: Option<u32>, detail: bool, json: bool) -> anyhow::Result<()> {
    let store = cfg.open_store().context("failed to open database")?;
    let weeks = lookback_weeks.unwrap_or(cfg.settings.forecast.lookback_weeks);
    let cutoff = Cutoff::new(today(), weeks);
    let recs = records::list(&store)?;

    if detail {
        let buckets = forecast::detail(&recs, cutoff);
        if json {
            return print_json(&buckets);
        }
        if buckets.is_empty() {
            println!("No clone demand from {} on.", cutoff.date());
            return Ok(());
        }
        for b in &buckets {
            print_table(&HEADERS, vec![row(&b.row)]);
            for r in &b.records {
                println!(
                    "    [{}] {} {} x{} (flower {})",
                    r.id, r.room, r.strain, r.plants, r.flower_date
                );
            }
            println!();
        }
        return Ok(());
    }

    let rows = forecast::summarize(&recs, cutoff);
    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No clone demand from {} on.", cutoff.date());
    } else {
        print_table(&HEADERS, rows.iter().map(row).collect());
    }
    Ok(())
}

fn row(r: &ForecastRow) -> Vec<String> {
    r.csv_fields().to_vec()
}
