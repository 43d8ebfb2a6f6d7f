pub mod advice;
pub mod assignments;
pub mod backup;
pub mod checklist;
pub mod daily_log;
pub mod forecast;
pub mod monitor;
pub mod records;
pub mod stats;
pub mod system;
pub mod tasks;
pub mod workers;

use axum::http::header;
use axum::response::{IntoResponse, Response};

/// A `text/csv` attachment.
pub(crate) fn csv_response(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        body,
    )
        .into_response()
}
