use sqlx::migrate::MigrateError;
use sqlx::Error as SqlxError;
use std::env::VarError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Migration error: {0}")]
    MigrationError(#[from] MigrateError),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Remote service returned {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    #[error("Authentication failed: {message}")]
    AuthError {
        message: String,
        #[source]
        source: Option<Box<AppError>>,
    },

    #[error("Sync of {entity} failed: {source}")]
    SyncError {
        entity: &'static str,
        #[source]
        source: Box<AppError>,
    },

    #[error("Not found")]
    NotFound,

    #[error("Room {room_number} is not available ({status})")]
    RoomUnavailable { room_number: String, status: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] VarError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl AppError {
    /// Wraps any failure of the credential exchange into an authentication error.
    pub fn auth(cause: AppError) -> Self {
        let message = match &cause {
            AppError::RemoteStatus { status: 401, .. } | AppError::RemoteStatus { status: 403, .. } => {
                "Invalid username or password".to_owned()
            }
            AppError::HttpError(e) if e.is_decode() => "Unexpected response from server".to_owned(),
            AppError::HttpError(_) => "Could not reach the server".to_owned(),
            other => other.to_string(),
        };
        AppError::AuthError {
            message,
            source: Some(Box::new(cause)),
        }
    }

    pub fn sync(entity: &'static str, cause: AppError) -> Self {
        AppError::SyncError {
            entity,
            source: Box::new(cause),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound)
    }
}

impl From<AppError> for std::io::Error {
    fn from(err: AppError) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
    }
}
