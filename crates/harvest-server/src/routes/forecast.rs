use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;
use harvest_core::export;
use harvest_core::forecast::{self, Cutoff};
use harvest_core::records;

use crate::error::AppError;
use crate::routes::csv_response;
use crate::state::AppState;

#[derive(serde::Deserialize, Default, Clone, Copy)]
pub struct ForecastQuery {
    /// Overrides `forecast.lookback_weeks` from harvest.yaml.
    #[serde(default)]
    pub lookback_weeks: Option<u32>,
}

fn cutoff(app: &AppState, q: ForecastQuery) -> Cutoff {
    let weeks = q
        .lookback_weeks
        .unwrap_or(app.config.settings.forecast.lookback_weeks);
    Cutoff::new(app.today(), weeks)
}

/// GET /api/forecast — clone-demand summary by week.
pub async fn summary(
    State(app): State<AppState>,
    Query(q): Query<ForecastQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let cutoff = cutoff(&app, q);
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        let rows = forecast::summarize(&records::list(&store)?, cutoff);
        Ok::<_, harvest_core::HarvestError>(serde_json::json!({
            "cutoff": cutoff.date(),
            "buffers": forecast::BUFFERS,
            "rows": rows,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/forecast/detail — summary rows with their contributing records.
pub async fn detail(
    State(app): State<AppState>,
    Query(q): Query<ForecastQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let cutoff = cutoff(&app, q);
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        let buckets = forecast::detail(&records::list(&store)?, cutoff);
        Ok::<_, harvest_core::HarvestError>(serde_json::json!({
            "cutoff": cutoff.date(),
            "buckets": buckets,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/forecast/export — summary as CSV.
pub async fn export_csv(
    State(app): State<AppState>,
    Query(q): Query<ForecastQuery>,
) -> Result<Response, AppError> {
    let cutoff = cutoff(&app, q);
    let csv = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        let rows = forecast::summarize(&records::list(&store)?, cutoff);
        Ok::<_, harvest_core::HarvestError>(export::forecast_csv(&rows))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(csv_response(export::FORECAST_FILENAME, csv))
}
