use crate::output::print_json;
use clap::Subcommand;
use harvest_core::checklist::{self, ChecklistState, ITEMS};
use harvest_core::config::Config;

#[derive(Subcommand)]
pub enum ChecklistSubcommand {
    /// Show every item with its state
    Show,
    /// Mark items done, by number (see `show`)
    Check {
        #[arg(required = true)]
        items: Vec<usize>,
    },
    /// Clear items, by number
    Uncheck {
        #[arg(required = true)]
        items: Vec<usize>,
    },
}

pub fn run(cfg: &Config, subcmd: ChecklistSubcommand, json: bool) -> anyhow::Result<()> {
    let path = cfg.checklist_path();
    let current = checklist::load(&path);

    let state = match subcmd {
        ChecklistSubcommand::Show => current,
        ChecklistSubcommand::Check { items } => {
            let mut checked = current.checked;
            checked.extend(labels(&items)?.into_iter().map(str::to_string));
            checklist::save(&path, &checked)?
        }
        ChecklistSubcommand::Uncheck { items } => {
            let drop = labels(&items)?;
            let checked: Vec<String> = current
                .checked
                .into_iter()
                .filter(|c| !drop.contains(&c.as_str()))
                .collect();
            checklist::save(&path, &checked)?
        }
    };

    if json {
        return print_json(&serde_json::json!({
            "items": state.items(),
            "done": state.done(),
            "total": ITEMS.len(),
        }));
    }
    print_state(&state);
    Ok(())
}

/// 1-based item numbers to labels.
fn labels(numbers: &[usize]) -> anyhow::Result<Vec<&'static str>> {
    numbers
        .iter()
        .map(|&n| {
            n.checked_sub(1)
                .and_then(|i| ITEMS.get(i).copied())
                .ok_or_else(|| anyhow::anyhow!("no checklist item {n} (1-{})", ITEMS.len()))
        })
        .collect()
}

fn print_state(state: &ChecklistState) {
    for (i, item) in state.items().iter().enumerate() {
        let mark = if item.checked { "x" } else { " " };
        println!("{:>2}. [{mark}] {}", i + 1, item.label);
    }
    println!();
    println!("{}/{} done", state.done(), ITEMS.len());
}
