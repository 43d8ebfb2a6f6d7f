//! CSV downloads: room assignments and the clone-demand forecast.

use crate::dates::Projection;
use crate::error::Result;
use crate::forecast::{ForecastRow, CSV_HEADER};
use crate::records;
use crate::store::Store;
use crate::workers;
use chrono::NaiveDate;
use serde::Serialize;

pub const ASSIGNMENTS_HEADER: [&str; 5] = ["room", "worker", "plants", "strain", "days_remaining"];

pub const ASSIGNMENTS_FILENAME: &str = "room_worker_assignments.csv";
pub const FORECAST_FILENAME: &str = "clone_forecast.csv";

fn should_neutralize(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };
    matches!(first, '=' | '+' | '-' | '@') && value.parse::<f64>().is_err()
}

/// Quote a field when needed and defuse spreadsheet formulas. Negative
/// numbers pass through unchanged.
pub fn csv_escape(value: &str) -> String {
    let safe = if should_neutralize(value) {
        format!("'{value}")
    } else {
        value.to_string()
    };
    if safe.contains(',') || safe.contains('"') || safe.contains('\n') || safe.contains('\r') {
        format!("\"{}\"", safe.replace('"', "\"\""))
    } else {
        safe
    }
}

fn push_line<S: AsRef<str>>(out: &mut String, fields: &[S]) {
    let line: Vec<String> = fields.iter().map(|f| csv_escape(f.as_ref())).collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentRow {
    pub room: String,
    pub worker: String,
    pub plants: i64,
    pub strain: String,
    pub days_remaining: Option<i64>,
}

/// One row per room from its latest record, sorted by room. Rooms without a
/// worker get an empty worker column.
pub fn assignment_rows(store: &Store, today: NaiveDate) -> Result<Vec<AssignmentRow>> {
    let map = workers::assignments(store)?;
    let rows = records::latest_per_room(store)?
        .into_iter()
        .map(|r| AssignmentRow {
            worker: map.get(&r.room).cloned().unwrap_or_default(),
            days_remaining: Projection::from_str_date(&r.flower_date, today).days_remaining,
            room: r.room,
            plants: r.plants,
            strain: r.strain,
        })
        .collect();
    Ok(rows)
}

pub fn assignments_csv(store: &Store, today: NaiveDate) -> Result<String> {
    let mut out = String::new();
    push_line(&mut out, &ASSIGNMENTS_HEADER);
    for row in assignment_rows(store, today)? {
        push_line(
            &mut out,
            &[
                row.room,
                row.worker,
                row.plants.to_string(),
                row.strain,
                row.days_remaining.map(|d| d.to_string()).unwrap_or_default(),
            ],
        );
    }
    Ok(out)
}

pub fn forecast_csv(rows: &[ForecastRow]) -> String {
    let mut out = String::new();
    push_line(&mut out, &CSV_HEADER);
    for row in rows {
        push_line(&mut out, &row.csv_fields());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_date;
    use crate::forecast::{self, Cutoff};
    use crate::records::NewRecord;

    #[test]
    fn escape_quotes_and_formulas() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(csv_escape("@cmd"), "'@cmd");
        assert_eq!(csv_escape("-12"), "-12");
        assert_eq!(csv_escape("+1,5"), "\"'+1,5\"");
        assert_eq!(csv_escape(""), "");
    }

    #[test]
    fn assignments_use_latest_record_per_room() {
        let store = Store::open_in_memory().unwrap();
        let add = |room: &str, plants: i64, strain: &str, flower: &str| {
            records::add(
                &store,
                &NewRecord {
                    room: room.into(),
                    plants,
                    strain: strain.into(),
                    flower_date: flower.into(),
                },
            )
            .unwrap();
        };
        add("F2", 10, "Old", "2024-01-01");
        add("F1", 20, "Runtz", "2024-03-01");
        add("F2", 30, "Gelato, #41", "2024-03-04");
        workers::add_worker(&store, "Ana").unwrap();
        workers::assign(&store, "F2", "Ana").unwrap();

        let csv = assignments_csv(&store, parse_date("2024-03-11").unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "room,worker,plants,strain,days_remaining");
        assert_eq!(lines[1], "F1,,20,Runtz,53");
        assert_eq!(lines[2], "F2,Ana,30,\"Gelato, #41\",56");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn forecast_export_has_header_and_rows() {
        let recs = vec![
            records::Record {
                id: 1,
                room: "F1".into(),
                plants: 10,
                strain: "A".into(),
                flower_date: "2024-01-01".into(),
            },
            records::Record {
                id: 2,
                room: "F2".into(),
                plants: 5,
                strain: "B".into(),
                flower_date: "2024-01-03".into(),
            },
        ];
        let csv = forecast_csv(&forecast::summarize(&recs, Cutoff::none()));
        assert_eq!(
            csv,
            "clone_week,harvest_week,plants,p5,p10,p15,p20\r\n2024-01-01,2024-03-04,15,16,17,17,18\r\n"
        );
    }
}
