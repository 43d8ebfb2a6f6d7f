use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// Interface languages the dashboard ships strings for.
pub const LANGUAGES: [&str; 2] = ["en", "zh"];

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/diag — database location, tables, `records` columns and counts.
pub async fn diag(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store()?;
        let diag = store.diag()?;
        Ok::<_, harvest_core::HarvestError>(serde_json::json!({
            "data_dir": app.config.data_dir,
            "db_path": app.config.db_path,
            "diag": diag,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/envtest — whether an advice credential is configured. The
/// credential itself is never returned, only a masked sample.
pub async fn envtest(State(app): State<AppState>) -> Json<serde_json::Value> {
    let body = match app.config.masked_key() {
        Some(sample) => serde_json::json!({
            "api_key_found": true,
            "sample": sample,
            "model": app.config.model,
        }),
        None => serde_json::json!({
            "api_key_found": false,
            "hint": "Set OPENAI_API_KEY or create OPENAI_API_KEY.txt in the data directory",
        }),
    };
    Json(body)
}

/// GET /setlang/{lang} — remember the interface language and go home.
pub async fn set_lang(Path(lang): Path<String>) -> Result<Response, AppError> {
    let lang = lang.trim().to_ascii_lowercase();
    if !LANGUAGES.contains(&lang.as_str()) {
        return Err(AppError::bad_request(format!(
            "unsupported language '{lang}', expected one of: {}",
            LANGUAGES.join(", ")
        )));
    }
    let cookie = format!("lang={lang}; Path=/; Max-Age=31536000; SameSite=Lax");
    Ok((
        StatusCode::SEE_OTHER,
        [(header::LOCATION, "/".to_string()), (header::SET_COOKIE, cookie)],
    )
        .into_response())
}
