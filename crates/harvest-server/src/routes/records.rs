use axum::extract::{Path, Query, State};
use axum::Json;
use harvest_core::records::{self, NewRecord};

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize, Default)]
pub struct RecordQuery {
    #[serde(default)]
    pub worker: Option<String>,
}

/// GET /api/records — every record with its projection, newest first.
/// `?worker=` limits to rooms assigned to that worker.
pub async fn list_records(
    State(app): State<AppState>,
    Query(q): Query<RecordQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let today = app.today();
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        let recs = match q.worker.as_deref().map(str::trim).filter(|w| !w.is_empty()) {
            Some(w) => records::list_for_worker(&store, w)?,
            None => records::list(&store)?,
        };
        let views: Vec<_> = recs.iter().map(|r| r.view(today)).collect();
        Ok::<_, harvest_core::HarvestError>(serde_json::json!({
            "total_plants": records::total_plants(&store)?,
            "records": views,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/records — add a flowering batch.
pub async fn create_record(
    State(app): State<AppState>,
    Json(body): Json<NewRecord>,
) -> Result<Json<serde_json::Value>, AppError> {
    let today = app.today();
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        let record = records::add(&store, &body)?;
        tracing::info!(id = record.id, room = %record.room, "record added");
        Ok::<_, harvest_core::HarvestError>(serde_json::to_value(record.view(today))?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/records/{id}
pub async fn get_record(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let today = app.today();
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        let record = records::get(&store, id)?;
        Ok::<_, harvest_core::HarvestError>(serde_json::to_value(record.view(today))?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// PUT /api/records/{id} — overwrite a record in place.
pub async fn update_record(
    State(app): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<NewRecord>,
) -> Result<Json<serde_json::Value>, AppError> {
    let today = app.today();
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        let record = records::update(&store, id, &body)?;
        Ok::<_, harvest_core::HarvestError>(serde_json::to_value(record.view(today))?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// DELETE /api/records/{id}
pub async fn delete_record(
    State(app): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        records::delete(&store, id)?;
        tracing::info!(id, "record deleted");
        Ok::<_, harvest_core::HarvestError>(serde_json::json!({ "deleted": id }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
