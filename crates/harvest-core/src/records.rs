use crate::actions;
use crate::dates::Projection;
use crate::error::{HarvestError, Result};
use crate::store::Store;
use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

/// A flowering batch in one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub room: String,
    pub plants: i64,
    pub strain: String,
    pub flower_date: String,
}

/// Largest plant count a single record may carry.
pub const MAX_PLANTS: i64 = 1_000_000;

/// Fields accepted on create and edit.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRecord {
    pub room: String,
    pub plants: i64,
    pub strain: String,
    pub flower_date: String,
}

impl NewRecord {
    /// Trim text fields and reject empty names or out-of-range counts.
    ///
    /// The flowering date is kept even when it does not parse; projections
    /// then fall back to week 1.
    pub fn normalized(&self) -> Result<NewRecord> {
        let room = self.room.trim();
        let strain = self.strain.trim();
        if room.is_empty() {
            return Err(HarvestError::Validation("room must not be empty".into()));
        }
        if strain.is_empty() {
            return Err(HarvestError::Validation("strain must not be empty".into()));
        }
        if !(0..=MAX_PLANTS).contains(&self.plants) {
            return Err(HarvestError::Validation(format!(
                "plants must be between 0 and {MAX_PLANTS}, got {}",
                self.plants
            )));
        }
        Ok(NewRecord {
            room: room.to_string(),
            plants: self.plants,
            strain: strain.to_string(),
            flower_date: self.flower_date.trim().to_string(),
        })
    }

    fn details(&self) -> serde_json::Value {
        serde_json::json!({
            "plants": self.plants,
            "strain": self.strain,
            "flower_date": self.flower_date,
        })
    }
}

/// A record together with its date projection.
#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    #[serde(flatten)]
    pub record: Record,
    #[serde(flatten)]
    pub projection: Projection,
}

impl Record {
    pub fn view(&self, today: NaiveDate) -> RecordView {
        RecordView {
            record: self.clone(),
            projection: Projection::from_str_date(&self.flower_date, today),
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            room: row.get(1)?,
            plants: row.get(2)?,
            strain: row.get(3)?,
            flower_date: row.get(4)?,
        })
    }
}

const COLUMNS: &str = "id, room, plants, strain, flower_date";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub fn add(store: &Store, input: &NewRecord) -> Result<Record> {
    let input = input.normalized()?;
    store.conn().execute(
        "INSERT INTO records(room, plants, strain, flower_date) VALUES (?1, ?2, ?3, ?4)",
        params![input.room, input.plants, input.strain, input.flower_date],
    )?;
    let id = store.conn().last_insert_rowid();
    actions::log_action(store, "", actions::ADD_RECORD, &input.room, &input.details());
    get(store, id)
}

pub fn update(store: &Store, id: i64, input: &NewRecord) -> Result<Record> {
    let input = input.normalized()?;
    let changed = store.conn().execute(
        "UPDATE records SET room = ?1, plants = ?2, strain = ?3, flower_date = ?4 WHERE id = ?5",
        params![input.room, input.plants, input.strain, input.flower_date, id],
    )?;
    if changed == 0 {
        return Err(HarvestError::RecordNotFound(id));
    }
    let mut details = input.details();
    details["id"] = id.into();
    actions::log_action(store, "", actions::EDIT_RECORD, &input.room, &details);
    get(store, id)
}

pub fn delete(store: &Store, id: i64) -> Result<()> {
    let existing = get(store, id)?;
    store
        .conn()
        .execute("DELETE FROM records WHERE id = ?1", params![id])?;
    actions::log_action(
        store,
        "",
        actions::DELETE_RECORD,
        &existing.room,
        &serde_json::json!({ "id": id }),
    );
    Ok(())
}

pub fn get(store: &Store, id: i64) -> Result<Record> {
    store
        .conn()
        .query_row(
            &format!("SELECT {COLUMNS} FROM records WHERE id = ?1"),
            params![id],
            Record::from_row,
        )
        .optional()?
        .ok_or(HarvestError::RecordNotFound(id))
}

/// All records, newest first.
pub fn list(store: &Store) -> Result<Vec<Record>> {
    let mut stmt = store
        .conn()
        .prepare(&format!("SELECT {COLUMNS} FROM records ORDER BY id DESC"))?;
    let rows = stmt
        .query_map([], Record::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Records in rooms currently assigned to `worker`, ordered by room.
pub fn list_for_worker(store: &Store, worker: &str) -> Result<Vec<Record>> {
    let mut stmt = store.conn().prepare(&format!(
        "SELECT {COLUMNS} FROM records
         WHERE room IN (SELECT room FROM room_workers WHERE worker = ?1)
         ORDER BY room, id"
    ))?;
    let rows = stmt
        .query_map(params![worker], Record::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// The most recent record (highest id) per room, ordered by room.
pub fn latest_per_room(store: &Store) -> Result<Vec<Record>> {
    let mut stmt = store.conn().prepare(
        "SELECT r.id, r.room, r.plants, r.strain, r.flower_date
         FROM records r
         JOIN (SELECT room, MAX(id) AS max_id FROM records GROUP BY room) latest
           ON latest.room = r.room AND latest.max_id = r.id
         ORDER BY r.room",
    )?;
    let rows = stmt
        .query_map([], Record::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn total_plants(store: &Store) -> Result<i64> {
    let total: Option<i64> =
        store
            .conn()
            .query_row("SELECT SUM(plants) FROM records", [], |row| row.get(0))?;
    Ok(total.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ActionFilter, ADD_RECORD, DELETE_RECORD, EDIT_RECORD};
    use crate::dates::parse_date;
    use crate::forecast;

    fn new(room: &str, plants: i64, flower: &str) -> NewRecord {
        NewRecord {
            room: room.to_string(),
            plants,
            strain: "Blue Dream".to_string(),
            flower_date: flower.to_string(),
        }
    }

    #[test]
    fn add_get_list() {
        let store = Store::open_in_memory().unwrap();
        let a = add(&store, &new(" F1 ", 40, "2024-01-01")).unwrap();
        let b = add(&store, &new("F2", 12, "2024-02-01")).unwrap();
        assert_eq!(a.room, "F1");
        assert_eq!(get(&store, b.id).unwrap().plants, 12);
        let ids: Vec<i64> = list(&store).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }

    #[test]
    fn add_rejects_blank_room_and_out_of_range_plants() {
        let store = Store::open_in_memory().unwrap();
        assert!(matches!(
            add(&store, &new("  ", 4, "2024-01-01")),
            Err(HarvestError::Validation(_))
        ));
        assert!(matches!(
            add(&store, &new("F1", -1, "2024-01-01")),
            Err(HarvestError::Validation(_))
        ));
        assert!(matches!(
            add(&store, &new("F1", i64::MAX / 50, "2024-01-01")),
            Err(HarvestError::Validation(_))
        ));
        assert!(add(&store, &new("F1", MAX_PLANTS, "2024-01-01")).is_ok());
        assert!(list(&store).unwrap().iter().all(|r| r.plants <= MAX_PLANTS));
    }

    #[test]
    fn flower_date_at_calendar_end_projects_without_panicking() {
        let store = Store::open_in_memory().unwrap();
        let today = parse_date("2024-05-01").unwrap();
        add(&store, &new("F1", 4, "+262142-12-31")).unwrap();
        let view = list(&store).unwrap()[0].view(today);
        assert_eq!(view.projection.week, 1);
        assert!(view.projection.harvest_date.is_none());
        assert!(view.projection.days_remaining.is_none());
        let rows = forecast::summarize(&list(&store).unwrap(), forecast::Cutoff::none());
        assert!(rows.is_empty());
    }

    #[test]
    fn unparseable_flower_date_is_stored_and_projects_week_one() {
        let store = Store::open_in_memory().unwrap();
        let r = add(&store, &new("F1", 4, "someday")).unwrap();
        let view = r.view(parse_date("2024-05-01").unwrap());
        assert_eq!(view.projection.week, 1);
        assert!(view.projection.harvest_date.is_none());
    }

    #[test]
    fn update_overwrites_in_place() {
        let store = Store::open_in_memory().unwrap();
        let r = add(&store, &new("F1", 40, "2024-01-01")).unwrap();
        let updated = update(&store, r.id, &new("F1", 38, "2024-01-02")).unwrap();
        assert_eq!(updated.plants, 38);
        assert_eq!(updated.flower_date, "2024-01-02");
        assert_eq!(list(&store).unwrap().len(), 1);
    }

    #[test]
    fn update_and_delete_missing_record() {
        let store = Store::open_in_memory().unwrap();
        assert!(matches!(
            update(&store, 99, &new("F1", 1, "2024-01-01")),
            Err(HarvestError::RecordNotFound(99))
        ));
        assert!(matches!(
            delete(&store, 99),
            Err(HarvestError::RecordNotFound(99))
        ));
    }

    #[test]
    fn mutations_append_actions() {
        let store = Store::open_in_memory().unwrap();
        let r = add(&store, &new("F1", 40, "2024-01-01")).unwrap();
        update(&store, r.id, &new("F1", 41, "2024-01-01")).unwrap();
        delete(&store, r.id).unwrap();
        let kinds: Vec<String> = actions::list(&store, &ActionFilter::default())
            .unwrap()
            .into_iter()
            .map(|a| a.action)
            .collect();
        assert_eq!(kinds, vec![DELETE_RECORD, EDIT_RECORD, ADD_RECORD]);
    }

    #[test]
    fn latest_per_room_and_totals() {
        let store = Store::open_in_memory().unwrap();
        add(&store, &new("F2", 10, "2024-01-01")).unwrap();
        add(&store, &new("F1", 20, "2024-01-01")).unwrap();
        add(&store, &new("F2", 30, "2024-02-01")).unwrap();
        let latest = latest_per_room(&store).unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].room, "F1");
        assert_eq!(latest[1].plants, 30);
        assert_eq!(total_plants(&store).unwrap(), 60);
    }

    #[test]
    fn total_plants_of_empty_table_is_zero() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(total_plants(&store).unwrap(), 0);
    }
}
