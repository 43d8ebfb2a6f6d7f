//! Append-only daily activity log (watering, feeding, IPM, defoliation...).

use crate::dates;
use crate::error::{HarvestError, Result};
use crate::store::Store;
use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub id: i64,
    pub date: String,
    pub room: String,
    pub kind: String,
    pub note: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogFilter {
    pub date: Option<String>,
    pub room: Option<String>,
}

impl LogEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            date: row.get(1)?,
            room: row.get(2)?,
            kind: row.get(3)?,
            note: row.get(4)?,
        })
    }
}

/// Append an entry. A missing or blank date means `today`.
pub fn append(
    store: &Store,
    date: Option<&str>,
    room: &str,
    kind: &str,
    note: &str,
    today: NaiveDate,
) -> Result<LogEntry> {
    let date = match date.map(str::trim).filter(|d| !d.is_empty()) {
        None => today,
        Some(d) => dates::parse_date(d).ok_or_else(|| HarvestError::InvalidDate(d.to_string()))?,
    };
    let room = room.trim();
    let kind = kind.trim();
    if room.is_empty() || kind.is_empty() {
        return Err(HarvestError::Validation(
            "room and action kind are required".into(),
        ));
    }
    let date = date.format(dates::DATE_FORMAT).to_string();
    store.conn().execute(
        "INSERT INTO daily_log(date, room, kind, note) VALUES (?1, ?2, ?3, ?4)",
        params![date, room, kind, note.trim()],
    )?;
    Ok(LogEntry {
        id: store.conn().last_insert_rowid(),
        date,
        room: room.to_string(),
        kind: kind.to_string(),
        note: note.trim().to_string(),
    })
}

/// Newest first.
pub fn list(store: &Store, filter: &LogFilter) -> Result<Vec<LogEntry>> {
    let mut sql = String::from("SELECT id, date, room, kind, note FROM daily_log");
    let mut clauses = Vec::new();
    let mut args = Vec::new();
    if let Some(d) = filter.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        clauses.push("date = ?");
        args.push(d.to_string());
    }
    if let Some(r) = filter.room.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        clauses.push("room = ?");
        args.push(r.to_string());
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY date DESC, id DESC");

    let mut stmt = store.conn().prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(args.iter()), LogEntry::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        dates::parse_date("2024-04-20").unwrap()
    }

    #[test]
    fn append_defaults_date_to_today() {
        let store = Store::open_in_memory().unwrap();
        let e = append(&store, None, "F1", "Water", "2 gal/plant", today()).unwrap();
        assert_eq!(e.date, "2024-04-20");
        let e = append(&store, Some(""), "F1", "Feed", "", today()).unwrap();
        assert_eq!(e.date, "2024-04-20");
    }

    #[test]
    fn append_validates_inputs() {
        let store = Store::open_in_memory().unwrap();
        assert!(matches!(
            append(&store, Some("20/04/2024"), "F1", "Water", "", today()),
            Err(HarvestError::InvalidDate(_))
        ));
        assert!(matches!(
            append(&store, None, " ", "Water", "", today()),
            Err(HarvestError::Validation(_))
        ));
    }

    #[test]
    fn list_filters_by_date_and_room() {
        let store = Store::open_in_memory().unwrap();
        append(&store, Some("2024-04-19"), "F1", "Water", "", today()).unwrap();
        append(&store, Some("2024-04-20"), "F1", "IPM", "spinosad", today()).unwrap();
        append(&store, Some("2024-04-20"), "F2", "Defoliate", "", today()).unwrap();

        let all = list(&store, &LogFilter::default()).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].kind, "Defoliate");
        assert_eq!(all[2].date, "2024-04-19");

        let f1_today = list(
            &store,
            &LogFilter {
                date: Some("2024-04-20".into()),
                room: Some("F1".into()),
            },
        )
        .unwrap();
        assert_eq!(f1_today.len(), 1);
        assert_eq!(f1_today[0].note, "spinosad");
    }
}
