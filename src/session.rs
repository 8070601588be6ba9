//! Authentication state: the persisted token plus the cached user profile.

use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};
use sqlx::SqlitePool;

use crate::{dto::LoginResponse, errors::AppError, structs::User};

pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const USER_ID_KEY: &str = "user_id";
pub const USERNAME_KEY: &str = "username";
pub const EMAIL_KEY: &str = "email";
pub const FULL_NAME_KEY: &str = "full_name";
pub const ROLE_KEY: &str = "role";

/// Durable string key-value storage scoped to one namespace.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Writes every entry or none of them.
    async fn put_all(&self, entries: &[(&str, &str)]) -> Result<(), AppError>;

    /// Removes every key in the namespace in one step.
    async fn clear(&self) -> Result<(), AppError>;
}

/// Exchanges credentials for a token with the remote service.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> Result<LoginResponse, AppError>;
}

#[derive(Debug, Clone)]
pub struct SqlitePreferences {
    pool: SqlitePool,
    namespace: String,
}

impl SqlitePreferences {
    pub fn new(pool: SqlitePool, namespace: impl Into<String>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
        }
    }
}

#[async_trait]
impl PreferenceStore for SqlitePreferences {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT pref_value FROM preferences WHERE namespace = ? AND pref_key = ?",
        )
        .bind(&self.namespace)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn put_all(&self, entries: &[(&str, &str)]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        for (key, value) in entries {
            sqlx::query(
                "INSERT INTO preferences (namespace, pref_key, pref_value) VALUES (?, ?, ?) \
                 ON CONFLICT(namespace, pref_key) DO UPDATE SET pref_value = excluded.pref_value",
            )
            .bind(&self.namespace)
            .bind(*key)
            .bind(*value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM preferences WHERE namespace = ?")
            .bind(&self.namespace)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Login state for the running process. Construct once and share by reference.
#[derive(Clone)]
pub struct Session {
    gateway: Arc<dyn AuthGateway>,
    store: Arc<dyn PreferenceStore>,
}

impl Session {
    pub fn new(gateway: Arc<dyn AuthGateway>, store: Arc<dyn PreferenceStore>) -> Self {
        Self { gateway, store }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User, AppError> {
        let response = self
            .gateway
            .authenticate(username, password)
            .await
            .map_err(|e| {
                warn!("Login for {} failed: {}", username, e);
                AppError::auth(e)
            })?;

        let user = User::from(response);
        let token = user.token.as_deref().unwrap_or_default();
        self.store
            .put_all(&[
                (AUTH_TOKEN_KEY, token),
                (USER_ID_KEY, user.id.as_str()),
                (USERNAME_KEY, user.username.as_str()),
                (EMAIL_KEY, user.email.as_str()),
                (FULL_NAME_KEY, user.full_name.as_str()),
                (ROLE_KEY, user.role.as_str()),
            ])
            .await?;

        info!("User {} logged in", user.username);
        Ok(user)
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        self.store.clear().await?;
        info!("Session cleared");
        Ok(())
    }

    /// The stored user, or `None` unless the token and every profile field are present.
    pub async fn current_user(&self) -> Result<Option<User>, AppError> {
        let Some(token) = self.token().await? else {
            return Ok(None);
        };

        let Some(id) = self.store.get(USER_ID_KEY).await? else {
            return Ok(None);
        };
        let Some(username) = self.store.get(USERNAME_KEY).await? else {
            return Ok(None);
        };
        let Some(email) = self.store.get(EMAIL_KEY).await? else {
            return Ok(None);
        };
        let Some(full_name) = self.store.get(FULL_NAME_KEY).await? else {
            return Ok(None);
        };
        let Some(role) = self.store.get(ROLE_KEY).await? else {
            return Ok(None);
        };

        Ok(Some(User {
            id,
            username,
            email,
            full_name,
            role,
            token: Some(token),
        }))
    }

    pub async fn save_token(&self, token: &str) -> Result<(), AppError> {
        self.store.put_all(&[(AUTH_TOKEN_KEY, token)]).await
    }

    pub async fn token(&self) -> Result<Option<String>, AppError> {
        self.store.get(AUTH_TOKEN_KEY).await
    }

    pub async fn is_logged_in(&self) -> Result<bool, AppError> {
        Ok(self.current_user().await?.is_some())
    }
}
