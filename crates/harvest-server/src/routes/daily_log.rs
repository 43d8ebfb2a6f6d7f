use axum::extract::{Query, State};
use axum::Json;
use harvest_core::daily_log::{self, LogFilter};

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct AppendBody {
    #[serde(default)]
    pub date: Option<String>,
    pub room: String,
    pub kind: String,
    #[serde(default)]
    pub note: String,
}

/// GET /api/daily-log?date=&room=
pub async fn list_entries(
    State(app): State<AppState>,
    Query(filter): Query<LogFilter>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        Ok::<_, harvest_core::HarvestError>(serde_json::json!(daily_log::list(&store, &filter)?))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/daily-log — date defaults to today.
pub async fn append_entry(
    State(app): State<AppState>,
    Json(body): Json<AppendBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let today = app.today();
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        let entry = daily_log::append(
            &store,
            body.date.as_deref(),
            &body.room,
            &body.kind,
            &body.note,
            today,
        )?;
        Ok::<_, harvest_core::HarvestError>(serde_json::to_value(entry)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
