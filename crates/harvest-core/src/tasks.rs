use crate::dates;
use crate::error::{HarvestError, Result};
use crate::store::Store;
use crate::types::TaskStatus;
use crate::workers;
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
    pub status: TaskStatus,
}

/// Partial update. `Some("")` clears an optional field; `None` leaves it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
}

impl Task {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let id: i64 = row.get(0)?;
        let raw: String = row.get(4)?;
        // Uploaded databases can carry statuses this build does not know.
        let status = match raw.parse() {
            Ok(s) => s,
            Err(_) => {
                tracing::warn!(task = id, status = %raw, "unknown task status, reading as pending");
                TaskStatus::default()
            }
        };
        Ok(Self {
            id,
            title: row.get(1)?,
            assignee: row.get(2)?,
            due_date: row.get(3)?,
            status,
        })
    }
}

const COLUMNS: &str = "id, title, assignee, due_date, status";

fn clean_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(HarvestError::Validation("title must not be empty".into()));
    }
    Ok(title.to_string())
}

fn clean_assignee(store: &Store, assignee: Option<&str>) -> Result<Option<String>> {
    match assignee.map(str::trim).filter(|a| !a.is_empty()) {
        None => Ok(None),
        Some(name) => {
            if !workers::worker_exists(store, name)? {
                return Err(HarvestError::WorkerNotFound(name.to_string()));
            }
            Ok(Some(name.to_string()))
        }
    }
}

fn clean_due(due: Option<&str>) -> Result<Option<String>> {
    match due.map(str::trim).filter(|d| !d.is_empty()) {
        None => Ok(None),
        Some(d) => dates::parse_date(d)
            .map(|date| Some(date.format(dates::DATE_FORMAT).to_string()))
            .ok_or_else(|| HarvestError::InvalidDate(d.to_string())),
    }
}

pub fn add(
    store: &Store,
    title: &str,
    assignee: Option<&str>,
    due_date: Option<&str>,
) -> Result<Task> {
    let title = clean_title(title)?;
    let assignee = clean_assignee(store, assignee)?;
    let due_date = clean_due(due_date)?;
    store.conn().execute(
        "INSERT INTO tasks(title, assignee, due_date, status) VALUES (?1, ?2, ?3, ?4)",
        params![title, assignee, due_date, TaskStatus::Pending.as_str()],
    )?;
    get(store, store.conn().last_insert_rowid())
}

pub fn update(store: &Store, id: i64, patch: &TaskPatch) -> Result<Task> {
    let mut task = get(store, id)?;
    if let Some(t) = &patch.title {
        task.title = clean_title(t)?;
    }
    if let Some(a) = &patch.assignee {
        task.assignee = clean_assignee(store, Some(a))?;
    }
    if let Some(d) = &patch.due_date {
        task.due_date = clean_due(Some(d))?;
    }
    if let Some(s) = &patch.status {
        task.status = s.parse()?;
    }
    store.conn().execute(
        "UPDATE tasks SET title = ?1, assignee = ?2, due_date = ?3, status = ?4 WHERE id = ?5",
        params![
            task.title,
            task.assignee,
            task.due_date,
            task.status.as_str(),
            id
        ],
    )?;
    Ok(task)
}

pub fn delete(store: &Store, id: i64) -> Result<()> {
    let n = store
        .conn()
        .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
    if n == 0 {
        return Err(HarvestError::TaskNotFound(id));
    }
    Ok(())
}

pub fn get(store: &Store, id: i64) -> Result<Task> {
    store
        .conn()
        .query_row(
            &format!("SELECT {COLUMNS} FROM tasks WHERE id = ?1"),
            params![id],
            Task::from_row,
        )
        .optional()?
        .ok_or(HarvestError::TaskNotFound(id))
}

/// Tasks ordered by due date (undated last), then id.
pub fn list(store: &Store, status: Option<TaskStatus>) -> Result<Vec<Task>> {
    let order = "ORDER BY due_date IS NULL, due_date, id";
    let tasks = match status {
        Some(s) => {
            let mut stmt = store.conn().prepare(&format!(
                "SELECT {COLUMNS} FROM tasks WHERE status = ?1 {order}"
            ))?;
            let rows = stmt
                .query_map(params![s.as_str()], Task::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        }
        None => {
            let mut stmt = store
                .conn()
                .prepare(&format!("SELECT {COLUMNS} FROM tasks {order}"))?;
            let rows = stmt
                .query_map([], Task::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        }
    };
    Ok(tasks)
}

/// "2 pending, 1 doing, 4 done"
pub fn summarize(tasks: &[Task]) -> String {
    let count = |s: TaskStatus| tasks.iter().filter(|t| t.status == s).count();
    format!(
        "{} pending, {} doing, {} done",
        count(TaskStatus::Pending),
        count(TaskStatus::Doing),
        count(TaskStatus::Done)
    )
}
