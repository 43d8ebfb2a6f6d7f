use axum::extract::{Query, State};
use axum::Json;
use harvest_core::advice::{self, RunAdvice};
use harvest_core::types::Program;
use harvest_core::{records, workers};

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize, Default)]
pub struct AdvisorQuery {
    #[serde(default)]
    pub worker: Option<String>,
}

/// GET /api/advice — programs, rooms and growers the advisor form offers.
pub async fn options(
    State(app): State<AppState>,
    Query(q): Query<AdvisorQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let today = app.today();
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        let mut recs = match q.worker.as_deref().map(str::trim).filter(|w| !w.is_empty()) {
            Some(w) => records::list_for_worker(&store, w)?,
            None => records::list(&store)?,
        };
        recs.sort_by(|a, b| a.room.cmp(&b.room).then(a.id.cmp(&b.id)));
        let programs: Vec<_> = Program::all()
            .iter()
            .map(|p| serde_json::json!({ "id": p.as_str(), "label": p.label() }))
            .collect();
        Ok::<_, harvest_core::HarvestError>(serde_json::json!({
            "programs": programs,
            "default_program": app.config.settings.advice.default_program,
            "model_configured": app.config.api_key.is_some(),
            "workers": workers::list_workers(&store)?,
            "assignments": workers::assignments(&store)?,
            "records": recs.iter().map(|r| r.view(today)).collect::<Vec<_>>(),
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/advice — run the advisor for one record. A failing model is
/// reported in `model_error` with table advice, never as an HTTP error.
pub async fn run(
    State(app): State<AppState>,
    Json(body): Json<RunAdvice>,
) -> Result<Json<serde_json::Value>, AppError> {
    let today = app.today();
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        let model = app.config.advice_model();
        let report = advice::run_for_record(
            &store,
            &body,
            app.config.settings.advice.default_program,
            model.as_deref(),
            today,
        )?;
        tracing::info!(
            record = report.record_id,
            room = %report.room,
            source = ?report.advice.source,
            "advice generated"
        );
        Ok::<_, harvest_core::HarvestError>(serde_json::to_value(report)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
