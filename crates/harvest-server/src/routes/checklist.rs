use axum::extract::State;
use axum::Json;
use harvest_core::checklist;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct SaveBody {
    #[serde(default)]
    pub checked: Vec<String>,
}

fn body(state: &checklist::ChecklistState) -> serde_json::Value {
    serde_json::json!({
        "items": state.items(),
        "done": state.done(),
        "total": checklist::ITEMS.len(),
    })
}

/// GET /api/checklist
pub async fn get_checklist(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let path = app.config.checklist_path();
    let result = tokio::task::spawn_blocking(move || body(&checklist::load(&path)))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;

    Ok(Json(result))
}

/// PUT /api/checklist — replace the set of checked items.
pub async fn save_checklist(
    State(app): State<AppState>,
    Json(req): Json<SaveBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let path = app.config.checklist_path();
    let result = tokio::task::spawn_blocking(move || {
        let state = checklist::save(&path, &req.checked)?;
        Ok::<_, harvest_core::HarvestError>(body(&state))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
