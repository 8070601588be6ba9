use std::{env, time::Duration};

use crate::errors::AppError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://kostkita.db";
pub const DEFAULT_SESSION_NAMESPACE: &str = "auth_prefs";

/// Runtime settings, read from the environment (and a `.env` file if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub api_base_url: String,
    pub session_namespace: String,
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub fn new(database_url: impl Into<String>, api_base_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            api_base_url: api_base_url.into(),
            session_namespace: DEFAULT_SESSION_NAMESPACE.to_owned(),
            request_timeout: None,
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("KOSTKITA_API_URL").map_err(|e| {
            log::error!("KOSTKITA_API_URL environment variable not set");
            AppError::EnvVarError(e)
        })?;
        let database_url =
            env::var("KOSTKITA_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned());
        let session_namespace = env::var("KOSTKITA_SESSION_NAMESPACE")
            .unwrap_or_else(|_| DEFAULT_SESSION_NAMESPACE.to_owned());

        let request_timeout = match env::var("KOSTKITA_HTTP_TIMEOUT_SECS") {
            Ok(raw) => Some(parse_timeout(&raw)?),
            Err(env::VarError::NotPresent) => None,
            Err(e) => return Err(AppError::EnvVarError(e)),
        };

        Ok(Self {
            database_url,
            api_base_url,
            session_namespace,
            request_timeout,
        })
    }

    pub fn with_session_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.session_namespace = namespace.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, AppError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| AppError::ConfigError(format!("KOSTKITA_HTTP_TIMEOUT_SECS '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_default_namespace() {
        let config = Config::new("sqlite::memory:", "http://localhost:8080/api");
        assert_eq!(config.session_namespace, "auth_prefs");
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn timeout_must_be_whole_seconds() {
        assert_eq!(parse_timeout(" 15 ").unwrap(), Duration::from_secs(15));
        assert!(matches!(parse_timeout("1.5"), Err(AppError::ConfigError(_))));
    }
}
