use crate::cmd::today;
use crate::output::print_json;
use anyhow::Context;
use harvest_core::advice::{self, AdviceSource, RunAdvice};
use harvest_core::config::Config;

pub fn run(cfg: &Config, input: RunAdvice, json: bool) -> anyhow::Result<()> {
    let store = cfg.open_store().context("failed to open database")?;
    let model = cfg.advice_model();
    let report = advice::run_for_record(
        &store,
        &input,
        cfg.settings.advice.default_program,
        model.as_deref(),
        today(),
    )?;

    if json {
        return print_json(&report);
    }

    println!(
        "{} · {} · week {} · {} · grower: {}",
        report.room,
        report.strain,
        report.week,
        report.program.label(),
        report.grower.as_deref().unwrap_or("Unassigned")
    );
    println!();
    println!("{}", report.advice.text);
    if report.advice.source == AdviceSource::Table {
        if let Some(err) = &report.advice.model_error {
            eprintln!("\nnote: model unavailable ({err}); showing rule-table advice");
        }
    }
    Ok(())
}
