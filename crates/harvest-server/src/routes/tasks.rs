use axum::extract::{Path, Query, State};
use axum::Json;
use harvest_core::tasks::{self, TaskPatch};
use harvest_core::types::TaskStatus;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize, Default)]
pub struct TaskQuery {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct AddTaskBody {
    pub title: String,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// GET /api/tasks — optionally filtered with `?status=`.
pub async fn list_tasks(
    State(app): State<AppState>,
    Query(q): Query<TaskQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let status = match q.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Some(s.parse::<TaskStatus>()?),
            None => None,
        };
        let store = app.store()?;
        let list = tasks::list(&store, status)?;
        Ok::<_, harvest_core::HarvestError>(serde_json::json!({
            "summary": tasks::summarize(&list),
            "tasks": list,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/tasks
pub async fn create_task(
    State(app): State<AppState>,
    Json(body): Json<AddTaskBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        let task = tasks::add(
            &store,
            &body.title,
            body.assignee.as_deref(),
            body.due_date.as_deref(),
        )?;
        Ok::<_, harvest_core::HarvestError>(serde_json::to_value(task)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/tasks/{id}
pub async fn get_task(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        Ok::<_, harvest_core::HarvestError>(serde_json::to_value(tasks::get(&store, id)?)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// PUT /api/tasks/{id} — partial update; an empty string clears a field.
pub async fn update_task(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        let task = tasks::update(&store, id, &patch)?;
        Ok::<_, harvest_core::HarvestError>(serde_json::to_value(task)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        tasks::delete(&store, id)?;
        Ok::<_, harvest_core::HarvestError>(serde_json::json!({ "deleted": id }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
