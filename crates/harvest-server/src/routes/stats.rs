use axum::extract::{Query, State};
use axum::Json;
use harvest_core::stats;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize, Default)]
pub struct StatsQuery {
    #[serde(default)]
    pub worker: Option<String>,
}

/// GET /api/stats — plant total and the days-remaining series.
pub async fn get_stats(
    State(app): State<AppState>,
    Query(q): Query<StatsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let today = app.today();
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        let s = stats::compute(&store, q.worker.as_deref(), today)?;
        Ok::<_, harvest_core::HarvestError>(serde_json::to_value(s)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
