//! HTTP client for the KostKita REST service.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use serde::de::DeserializeOwned;

use crate::{
    config::Config,
    dto::{LoginRequest, LoginResponse, PaymentDto, RoomDto, TenantDto},
    errors::AppError,
    repository::RemoteSource,
    session::{AuthGateway, PreferenceStore, AUTH_TOKEN_KEY},
};

pub const LOGIN_ENDPOINT: &str = "auth/login";
pub const TENANTS_ENDPOINT: &str = "tenants";
pub const ROOMS_ENDPOINT: &str = "rooms";
pub const PAYMENTS_ENDPOINT: &str = "payments";

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    tokens: Option<Arc<dyn PreferenceStore>>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.api_base_url.clone(),
            tokens: None,
        })
    }

    /// Collection reads carry the stored session token as a bearer credential.
    pub fn with_token_store(mut self, store: Arc<dyn PreferenceStore>) -> Self {
        self.tokens = Some(store);
        self
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AppError> {
        let url = self.url(LOGIN_ENDPOINT);
        debug!("POST {}", url);

        let response = self.client.post(&url).json(request).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<LoginResponse>().await?)
    }

    pub async fn get_collection<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<Vec<T>, AppError> {
        let url = self.url(endpoint);
        debug!("GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(store) = &self.tokens {
            if let Some(token) = store.get(AUTH_TOKEN_KEY).await? {
                request = request.bearer_auth(token);
            }
        }

        let response = ensure_success(request.send().await?).await?;
        Ok(response.json::<Vec<T>>().await?)
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    warn!("HTTP {} from {}", status.as_u16(), url);
    Err(AppError::RemoteStatus {
        status: status.as_u16(),
        body: if body.is_empty() {
            status.canonical_reason().unwrap_or("Unknown error").to_owned()
        } else {
            body
        },
    })
}

#[async_trait]
impl AuthGateway for ApiClient {
    async fn authenticate(&self, username: &str, password: &str) -> Result<LoginResponse, AppError> {
        self.login(&LoginRequest {
            username: username.to_owned(),
            password: password.to_owned(),
        })
        .await
    }
}

#[async_trait]
impl RemoteSource<TenantDto> for ApiClient {
    async fn fetch_all(&self) -> Result<Vec<TenantDto>, AppError> {
        self.get_collection(TENANTS_ENDPOINT).await
    }
}

#[async_trait]
impl RemoteSource<RoomDto> for ApiClient {
    async fn fetch_all(&self) -> Result<Vec<RoomDto>, AppError> {
        self.get_collection(ROOMS_ENDPOINT).await
    }
}

#[async_trait]
impl RemoteSource<PaymentDto> for ApiClient {
    async fn fetch_all(&self) -> Result<Vec<PaymentDto>, AppError> {
        self.get_collection(PAYMENTS_ENDPOINT).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let client = ApiClient::new(&Config::new("sqlite::memory:", "http://kost.local/api/")).unwrap();
        assert_eq!(client.url("/auth/login"), "http://kost.local/api/auth/login");
        assert_eq!(client.url(ROOMS_ENDPOINT), "http://kost.local/api/rooms");
    }
}
