use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use harvest_core::{paths, store};

use crate::error::AppError;
use crate::state::AppState;

/// Largest accepted database upload.
pub const MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

#[derive(serde::Deserialize, Default)]
pub struct KeyQuery {
    #[serde(default)]
    pub key: Option<String>,
}

/// Backups are off unless `DOWNLOAD_KEY` is set; then the query key must
/// match it exactly.
fn check_key(app: &AppState, q: &KeyQuery) -> Result<(), AppError> {
    let Some(expected) = app.config.download_key.as_deref() else {
        return Err(AppError::forbidden(
            "database backup is disabled; set DOWNLOAD_KEY to enable it",
        ));
    };
    if q.key.as_deref() != Some(expected) {
        tracing::warn!("rejected database backup request with a bad key");
        return Err(AppError::unauthorized("invalid key"));
    }
    Ok(())
}

/// GET /download_db?key= — the raw SQLite file.
pub async fn download(
    State(app): State<AppState>,
    Query(q): Query<KeyQuery>,
) -> Result<Response, AppError> {
    check_key(&app, &q)?;
    let path = app.config.db_path.clone();
    let bytes = tokio::task::spawn_blocking(move || {
        // Make sure there is a file to hand out on a fresh install.
        app.store()?;
        store::read_db_bytes(&path)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    tracing::info!(bytes = bytes.len(), "database downloaded");
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", paths::DB_FILE),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// POST /upload_db?key= — replace the database with the request body.
pub async fn upload(
    State(app): State<AppState>,
    Query(q): Query<KeyQuery>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    check_key(&app, &q)?;
    let path = app.config.db_path.clone();
    let size = body.len();
    tokio::task::spawn_blocking(move || store::replace_db(&path, &body))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    tracing::info!(bytes = size, "database replaced from upload");
    Ok(Json(serde_json::json!({ "replaced": true, "bytes": size })))
}
