use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use harvest_core::{export, workers};

use crate::error::AppError;
use crate::routes::csv_response;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct AssignBody {
    pub room: String,
    /// Empty or missing means unassign.
    #[serde(default)]
    pub worker: String,
}

/// GET /api/assignments — room → worker map.
pub async fn list_assignments(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        Ok::<_, harvest_core::HarvestError>(serde_json::json!(workers::assignments(&store)?))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/assignments — assign a worker to a room, or unassign with an
/// empty worker.
pub async fn assign(
    State(app): State<AppState>,
    Json(body): Json<AssignBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        let outcome = workers::assign(&store, &body.room, &body.worker)?;
        Ok::<_, harvest_core::HarvestError>(serde_json::to_value(outcome)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// DELETE /api/assignments/{room}
pub async fn unassign(
    State(app): State<AppState>,
    Path(room): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        let outcome = workers::unassign(&store, &room)?;
        Ok::<_, harvest_core::HarvestError>(serde_json::to_value(outcome)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/assignments/export — CSV of the latest record per room.
pub async fn export_assignments(State(app): State<AppState>) -> Result<Response, AppError> {
    let today = app.today();
    let csv = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        export::assignments_csv(&store, today)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(csv_response(export::ASSIGNMENTS_FILENAME, csv))
}
