use axum::extract::State;
use axum::Json;
use harvest_core::workers;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct AddWorkerBody {
    pub name: String,
}

/// GET /api/workers — worker names, sorted.
pub async fn list_workers(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        Ok::<_, harvest_core::HarvestError>(serde_json::json!(workers::list_workers(&store)?))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/workers — add a worker; re-adding an existing name is a no-op.
pub async fn add_worker(
    State(app): State<AppState>,
    Json(body): Json<AddWorkerBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        let created = workers::add_worker(&store, &body.name)?;
        Ok::<_, harvest_core::HarvestError>(serde_json::json!({
            "name": body.name.trim(),
            "created": created,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
