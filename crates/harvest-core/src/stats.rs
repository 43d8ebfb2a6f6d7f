use crate::dates::Projection;
use crate::error::Result;
use crate::records;
use crate::store::Store;
use crate::workers;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// One bar of the days-remaining chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomPoint {
    pub room: String,
    pub days_remaining: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub total_plants: i64,
    pub worker: Option<String>,
    pub series: Vec<RoomPoint>,
    pub workers: Vec<String>,
    pub assignments: BTreeMap<String, String>,
}

/// Plant total across every record, plus a per-record days-remaining series
/// ordered by room. With `worker`, the series covers only that worker's rooms;
/// the total never does.
pub fn compute(store: &Store, worker: Option<&str>, today: NaiveDate) -> Result<Stats> {
    let worker = worker.map(str::trim).filter(|w| !w.is_empty());
    let mut recs = match worker {
        Some(w) => records::list_for_worker(store, w)?,
        None => records::list(store)?,
    };
    recs.sort_by(|a, b| a.room.cmp(&b.room).then(a.id.cmp(&b.id)));

    let series = recs
        .into_iter()
        .map(|r| RoomPoint {
            days_remaining: Projection::from_str_date(&r.flower_date, today).days_remaining,
            room: r.room,
        })
        .collect();

    Ok(Stats {
        total_plants: records::total_plants(store)?,
        worker: worker.map(str::to_string),
        series,
        workers: workers::list_workers(store)?,
        assignments: workers::assignments(store)?,
    })
}
