pub mod error;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use harvest_core::config::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all routes and middleware.
/// Used by `serve_on()` and by the integration tests.
pub fn build_router(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // System
        .route("/health", get(routes::system::health))
        .route("/api/diag", get(routes::system::diag))
        .route("/api/envtest", get(routes::system::envtest))
        .route("/setlang/{lang}", get(routes::system::set_lang))
        // Records
        .route("/api/records", get(routes::records::list_records))
        .route("/api/records", post(routes::records::create_record))
        .route("/api/records/{id}", get(routes::records::get_record))
        .route("/api/records/{id}", put(routes::records::update_record))
        .route("/api/records/{id}", delete(routes::records::delete_record))
        // Workers & assignments
        .route("/api/workers", get(routes::workers::list_workers))
        .route("/api/workers", post(routes::workers::add_worker))
        .route(
            "/api/assignments",
            get(routes::assignments::list_assignments),
        )
        .route("/api/assignments", post(routes::assignments::assign))
        .route(
            "/api/assignments/export",
            get(routes::assignments::export_assignments),
        )
        .route(
            "/api/assignments/{room}",
            delete(routes::assignments::unassign),
        )
        .route("/api/stats", get(routes::stats::get_stats))
        // Tasks
        .route("/api/tasks", get(routes::tasks::list_tasks))
        .route("/api/tasks", post(routes::tasks::create_task))
        .route("/api/tasks/{id}", get(routes::tasks::get_task))
        .route("/api/tasks/{id}", put(routes::tasks::update_task))
        .route("/api/tasks/{id}", delete(routes::tasks::delete_task))
        // Daily log
        .route("/api/daily-log", get(routes::daily_log::list_entries))
        .route("/api/daily-log", post(routes::daily_log::append_entry))
        // Forecast
        .route("/api/forecast", get(routes::forecast::summary))
        .route("/api/forecast/detail", get(routes::forecast::detail))
        .route("/api/forecast/export", get(routes::forecast::export_csv))
        // Advisor
        .route("/api/advice", get(routes::advice::options))
        .route("/api/advice", post(routes::advice::run))
        // Action monitor
        .route("/api/monitor", get(routes::monitor::list_actions))
        .route("/api/monitor", delete(routes::monitor::clear_actions))
        // Licensing checklist
        .route("/api/checklist", get(routes::checklist::get_checklist))
        .route("/api/checklist", put(routes::checklist::save_checklist))
        // Backup
        .route("/download_db", get(routes::backup::download))
        .route(
            "/upload_db",
            post(routes::backup::upload)
                .layer(DefaultBodyLimit::max(routes::backup::MAX_UPLOAD_BYTES)),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the dashboard server on a pre-bound listener.
///
/// Accepts a listener that was already bound so the caller can read the
/// actual port first (useful with port 0).
pub async fn serve_on(
    config: Config,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    // Create the database up front so a bad data dir fails at startup.
    config.open_store()?;
    tracing::info!(
        db = %config.db_path.display(),
        "harvest dashboard listening on http://localhost:{actual_port}"
    );
    let app = build_router(state::AppState::new(config));

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
