use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use harvest_core::error::HarvestError;

// ---------------------------------------------------------------------------
// Sentinels for statuses HarvestError does not carry
// ---------------------------------------------------------------------------

/// Wrong or missing shared secret.
#[derive(Debug)]
struct UnauthorizedError(String);

impl std::fmt::Display for UnauthorizedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for UnauthorizedError {}

/// Feature switched off by configuration.
#[derive(Debug)]
struct ForbiddenError(String);

impl std::fmt::Display for ForbiddenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ForbiddenError {}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(HarvestError::Validation(msg.into()).into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self(UnauthorizedError(msg.into()).into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self(ForbiddenError(msg.into()).into())
    }

    fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<UnauthorizedError>().is_some() {
            return StatusCode::UNAUTHORIZED;
        }
        if self.0.downcast_ref::<ForbiddenError>().is_some() {
            return StatusCode::FORBIDDEN;
        }
        match self.0.downcast_ref::<HarvestError>() {
            Some(e) => match e {
                HarvestError::RecordNotFound(_)
                | HarvestError::TaskNotFound(_)
                | HarvestError::WorkerNotFound(_) => StatusCode::NOT_FOUND,
                HarvestError::Validation(_)
                | HarvestError::InvalidDate(_)
                | HarvestError::InvalidStatus(_)
                | HarvestError::InvalidProgram(_) => StatusCode::BAD_REQUEST,
                HarvestError::InvalidDatabase(_) => StatusCode::UNPROCESSABLE_ENTITY,
                HarvestError::Advice(_) => StatusCode::BAD_GATEWAY,
                HarvestError::Sqlite(_)
                | HarvestError::Io(_)
                | HarvestError::Yaml(_)
                | HarvestError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {:#}", self.0);
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_not_found_maps_to_404() {
        let err = AppError(HarvestError::RecordNotFound(7).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn worker_not_found_maps_to_404() {
        let err = AppError(HarvestError::WorkerNotFound("Ghost".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_errors_map_to_400() {
        for e in [
            HarvestError::Validation("x".into()),
            HarvestError::InvalidDate("x".into()),
            HarvestError::InvalidStatus("x".into()),
            HarvestError::InvalidProgram("x".into()),
        ] {
            assert_eq!(AppError(e.into()).into_response().status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn invalid_database_maps_to_422() {
        let err = AppError(HarvestError::InvalidDatabase("empty".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn io_error_maps_to_500() {
        let err = AppError(HarvestError::Io(std::io::Error::other("disk full")).into());
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn foreign_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn sentinel_constructors() {
        assert_eq!(AppError::unauthorized("x").into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::forbidden("x").into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::bad_request("x").into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn response_body_is_json() {
        let response = AppError(HarvestError::TaskNotFound(3).into()).into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
