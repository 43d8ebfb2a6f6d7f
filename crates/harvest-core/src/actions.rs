//! Append-only worker action log.
//!
//! Purely observational: nothing reads these rows back into a decision.

use crate::error::Result;
use crate::store::Store;
use rusqlite::{params, params_from_iter};
use serde::Serialize;

/// Rows returned by [`list`] when no explicit limit is given.
pub const DEFAULT_LIMIT: u32 = 500;

pub const ADD_RECORD: &str = "Add Record";
pub const EDIT_RECORD: &str = "Edit Record";
pub const DELETE_RECORD: &str = "Delete Record";
pub const ADD_WORKER: &str = "Add Worker";
pub const ASSIGN_WORKER: &str = "Assign Worker";
pub const UNASSIGN_WORKER: &str = "Unassign Worker";
pub const RUN_ADVISOR: &str = "Run Advisor";

#[derive(Debug, Clone, Serialize)]
pub struct WorkerAction {
    pub id: i64,
    pub ts: String,
    pub worker: String,
    pub action: String,
    pub room: String,
    pub details: String,
}

#[derive(Debug, Clone, Default)]
pub struct ActionFilter {
    pub worker: Option<String>,
    pub action: Option<String>,
    pub limit: Option<u32>,
}

fn insert(store: &Store, worker: &str, action: &str, room: &str, details: &str) -> Result<()> {
    store.conn().execute(
        "INSERT INTO worker_actions(worker, action, room, details) VALUES (?1, ?2, ?3, ?4)",
        params![worker, action, room, details],
    )?;
    Ok(())
}

/// Record an action. Failures are logged and swallowed; the operation that
/// triggered the log entry has already succeeded.
pub fn log_action(store: &Store, worker: &str, action: &str, room: &str, details: &serde_json::Value) {
    let details = if details.is_null() {
        "{}".to_string()
    } else {
        details.to_string()
    };
    if let Err(e) = insert(store, worker, action, room, &details) {
        tracing::warn!(action, room, "failed to record worker action: {e}");
    }
}

/// Newest first, optionally filtered by exact worker and/or action.
pub fn list(store: &Store, filter: &ActionFilter) -> Result<Vec<WorkerAction>> {
    let mut sql = String::from("SELECT id, ts, worker, action, room, details FROM worker_actions");
    let mut clauses = Vec::new();
    let mut args: Vec<String> = Vec::new();
    if let Some(w) = filter.worker.as_deref().filter(|w| !w.is_empty()) {
        clauses.push("worker = ?");
        args.push(w.to_string());
    }
    if let Some(a) = filter.action.as_deref().filter(|a| !a.is_empty()) {
        clauses.push("action = ?");
        args.push(a.to_string());
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    let limit = filter.limit.unwrap_or(DEFAULT_LIMIT);
    sql.push_str(&format!(" ORDER BY id DESC LIMIT {limit}"));

    let mut stmt = store.conn().prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(args.iter()), |row| {
            Ok(WorkerAction {
                id: row.get(0)?,
                ts: row.get(1)?,
                worker: row.get(2)?,
                action: row.get(3)?,
                room: row.get(4)?,
                details: row.get(5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn distinct(store: &Store, column: &str) -> Result<Vec<String>> {
    let sql = format!(
        "SELECT DISTINCT {column} FROM worker_actions WHERE {column} <> '' ORDER BY {column}"
    );
    let mut stmt = store.conn().prepare(&sql)?;
    let values = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(values)
}

/// Workers that appear in the log, for filter drop-downs.
pub fn distinct_workers(store: &Store) -> Result<Vec<String>> {
    distinct(store, "worker")
}

pub fn distinct_actions(store: &Store) -> Result<Vec<String>> {
    distinct(store, "action")
}

/// Delete every log row. Returns the number removed.
pub fn clear(store: &Store) -> Result<usize> {
    Ok(store.conn().execute("DELETE FROM worker_actions", [])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_is_newest_first_and_filterable() {
        let store = Store::open_in_memory().unwrap();
        log_action(&store, "Mei", ASSIGN_WORKER, "F1", &json!({}));
        log_action(&store, "", ADD_RECORD, "F2", &json!({"plants": 40}));
        log_action(&store, "Mei", RUN_ADVISOR, "F1", &json!({"program": "athena"}));

        let all = list(&store, &ActionFilter::default()).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].action, RUN_ADVISOR);

        let mei = list(
            &store,
            &ActionFilter {
                worker: Some("Mei".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(mei.len(), 2);

        let assigns = list(
            &store,
            &ActionFilter {
                worker: Some("Mei".into()),
                action: Some(ASSIGN_WORKER.into()),
                limit: None,
            },
        )
        .unwrap();
        assert_eq!(assigns.len(), 1);
        assert_eq!(assigns[0].room, "F1");
    }

    #[test]
    fn details_are_stored_as_json_text() {
        let store = Store::open_in_memory().unwrap();
        log_action(&store, "", ADD_RECORD, "F2", &json!({"plants": 40}));
        log_action(&store, "", ADD_WORKER, "", &serde_json::Value::Null);
        let rows = list(&store, &ActionFilter::default()).unwrap();
        assert_eq!(rows[0].details, "{}");
        assert_eq!(rows[1].details, r#"{"plants":40}"#);
        assert!(!rows[0].ts.is_empty());
    }

    #[test]
    fn distinct_options_skip_blanks() {
        let store = Store::open_in_memory().unwrap();
        log_action(&store, "", ADD_RECORD, "F2", &json!({}));
        log_action(&store, "Zed", ASSIGN_WORKER, "F2", &json!({}));
        log_action(&store, "Ana", ASSIGN_WORKER, "F3", &json!({}));
        assert_eq!(distinct_workers(&store).unwrap(), vec!["Ana", "Zed"]);
        assert_eq!(
            distinct_actions(&store).unwrap(),
            vec![ADD_RECORD.to_string(), ASSIGN_WORKER.to_string()]
        );
    }

    #[test]
    fn limit_caps_rows() {
        let store = Store::open_in_memory().unwrap();
        for i in 0..5 {
            log_action(&store, "", ADD_RECORD, &format!("F{i}"), &json!({}));
        }
        let rows = list(
            &store,
            &ActionFilter {
                limit: Some(2),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].room, "F4");
    }

    #[test]
    fn clear_removes_everything() {
        let store = Store::open_in_memory().unwrap();
        log_action(&store, "", ADD_RECORD, "F1", &json!({}));
        log_action(&store, "", ADD_RECORD, "F2", &json!({}));
        assert_eq!(clear(&store).unwrap(), 2);
        assert!(list(&store, &ActionFilter::default()).unwrap().is_empty());
    }
}
