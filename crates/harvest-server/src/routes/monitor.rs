use axum::extract::{Query, State};
use axum::Json;
use harvest_core::actions::{self, ActionFilter};

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize, Default)]
pub struct MonitorQuery {
    #[serde(default)]
    pub worker: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// GET /api/monitor — worker action log, newest first, with the distinct
/// workers and actions for the filter dropdowns.
pub async fn list_actions(
    State(app): State<AppState>,
    Query(q): Query<MonitorQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        let filter = ActionFilter {
            worker: q.worker,
            action: q.action,
            limit: q.limit,
        };
        Ok::<_, harvest_core::HarvestError>(serde_json::json!({
            "actions": actions::list(&store, &filter)?,
            "workers": actions::distinct_workers(&store)?,
            "action_types": actions::distinct_actions(&store)?,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// DELETE /api/monitor — clear the action log.
pub async fn clear_actions(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        let removed = actions::clear(&store)?;
        tracing::info!(removed, "worker action log cleared");
        Ok::<_, harvest_core::HarvestError>(serde_json::json!({ "removed": removed }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
