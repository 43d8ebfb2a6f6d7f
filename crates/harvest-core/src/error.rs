use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("record not found: {0}")]
    RecordNotFound(i64),

    #[error("task not found: {0}")]
    TaskNotFound(i64),

    #[error("worker not found: {0}")]
    WorkerNotFound(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid task status '{0}': expected pending, doing or done")]
    InvalidStatus(String),

    #[error("unknown nutrient program '{0}'")]
    InvalidProgram(String),

    #[error("not a SQLite database: {0}")]
    InvalidDatabase(String),

    #[error("advice backend error: {0}")]
    Advice(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HarvestError>;
