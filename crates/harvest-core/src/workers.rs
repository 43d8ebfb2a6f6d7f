//! Growers and the room → worker assignment map.

use crate::actions;
use crate::error::{HarvestError, Result};
use crate::store::Store;
use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use std::collections::BTreeMap;

/// Add a worker. Adding an existing name is a no-op; returns whether a row
/// was inserted.
pub fn add_worker(store: &Store, name: &str) -> Result<bool> {
    let name = name.trim();
    if name.is_empty() {
        return Err(HarvestError::Validation("name cannot be empty".into()));
    }
    let inserted = store.conn().execute(
        "INSERT OR IGNORE INTO workers(name) VALUES (?1)",
        params![name],
    )?;
    if inserted > 0 {
        actions::log_action(store, name, actions::ADD_WORKER, "", &serde_json::json!({}));
    }
    Ok(inserted > 0)
}

pub fn list_workers(store: &Store) -> Result<Vec<String>> {
    let mut stmt = store
        .conn()
        .prepare("SELECT name FROM workers ORDER BY name")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}

pub fn worker_exists(store: &Store, name: &str) -> Result<bool> {
    let found = store
        .conn()
        .query_row(
            "SELECT 1 FROM workers WHERE name = ?1",
            params![name],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Assignment {
    Assigned { room: String, worker: String },
    Unassigned { room: String },
}

/// Point `room` at `worker`, replacing any previous assignment. An empty
/// worker name removes the assignment instead.
pub fn assign(store: &Store, room: &str, worker: &str) -> Result<Assignment> {
    let room = room.trim();
    let worker = worker.trim();
    if room.is_empty() {
        return Err(HarvestError::Validation("room must not be empty".into()));
    }
    if worker.is_empty() {
        return unassign(store, room);
    }
    if !worker_exists(store, worker)? {
        return Err(HarvestError::WorkerNotFound(worker.to_string()));
    }
    store.conn().execute(
        "INSERT OR REPLACE INTO room_workers(room, worker) VALUES (?1, ?2)",
        params![room, worker],
    )?;
    actions::log_action(store, worker, actions::ASSIGN_WORKER, room, &serde_json::json!({}));
    Ok(Assignment::Assigned {
        room: room.to_string(),
        worker: worker.to_string(),
    })
}

/// Remove the assignment for `room`. Unassigning an unassigned room succeeds.
pub fn unassign(store: &Store, room: &str) -> Result<Assignment> {
    let room = room.trim();
    store
        .conn()
        .execute("DELETE FROM room_workers WHERE room = ?1", params![room])?;
    actions::log_action(store, "", actions::UNASSIGN_WORKER, room, &serde_json::json!({}));
    Ok(Assignment::Unassigned {
        room: room.to_string(),
    })
}

/// room → worker
pub fn assignments(store: &Store) -> Result<BTreeMap<String, String>> {
    let mut stmt = store
        .conn()
        .prepare("SELECT room, worker FROM room_workers ORDER BY room")?;
    let map = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;
    Ok(map)
}

pub fn assigned_worker(store: &Store, room: &str) -> Result<Option<String>> {
    let worker = store
        .conn()
        .query_row(
            "SELECT worker FROM room_workers WHERE room = ?1",
            params![room],
            |row| row.get(0),
        )
        .optional()?;
    Ok(worker)
}
