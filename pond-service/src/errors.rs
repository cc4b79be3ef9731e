use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Pond not found with ID: {0}")]
    PondNotFound(String),

    #[error("Sensor not found with type: {0}")]
    SensorNotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for the pond/sensor lookups that surface as 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::PondNotFound(_) | Error::SensorNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
