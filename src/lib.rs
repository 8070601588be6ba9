//! Local-first data layer for running a kost (boarding house): tenants, rooms
//! and rent payments kept in SQLite, with a manual pull from the KostKita service.

use std::sync::Arc;

use futures::future::join3;
use sqlx::SqlitePool;

pub mod api;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod dto;
pub mod errors;
pub mod mapper;
pub mod occupancy;
pub mod records;
pub mod repository;
pub mod session;
pub mod structs;
pub mod utils;

pub use api::ApiClient;
pub use config::Config;
pub use errors::AppError;
pub use repository::{
    PaymentRepository, Repository, RoomRepository, Subscription, SyncOutcome, TenantRepository,
};
pub use session::{Session, SqlitePreferences};
pub use structs::{Payment, PaymentStatus, Room, RoomStatus, Tenant, User};

use dashboard::DashboardSummary;
use session::PreferenceStore;

/// Everything the app needs, built once per process and shared by reference.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub session: Session,
    pub tenants: TenantRepository,
    pub rooms: RoomRepository,
    pub payments: PaymentRepository,
}

impl AppState {
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let db_pool = db::connect(&config.database_url).await?;
        Self::with_pool(db_pool, config)
    }

    pub fn with_pool(db_pool: SqlitePool, config: &Config) -> Result<Self, AppError> {
        let preferences: Arc<dyn PreferenceStore> = Arc::new(SqlitePreferences::new(
            db_pool.clone(),
            config.session_namespace.clone(),
        ));
        let api = Arc::new(ApiClient::new(config)?.with_token_store(preferences.clone()));

        Ok(Self {
            session: Session::new(api.clone(), preferences),
            tenants: TenantRepository::new(db_pool.clone(), api.clone()),
            rooms: RoomRepository::new(db_pool.clone(), api.clone()),
            payments: PaymentRepository::new(db_pool.clone(), api),
            db_pool,
        })
    }

    /// Pulls all three collections concurrently. Each result stands on its own:
    /// one failing pull does not stop the others.
    pub async fn sync_all(&self) -> Vec<Result<SyncOutcome, AppError>> {
        let (tenants, rooms, payments) = join3(
            self.tenants.sync_with_remote(),
            self.rooms.sync_with_remote(),
            self.payments.sync_with_remote(),
        )
        .await;
        vec![tenants, rooms, payments]
    }

    pub async fn summary(&self, period: &str) -> Result<DashboardSummary, AppError> {
        let rooms = self.rooms.get_all().await?;
        let tenants = self.tenants.get_all().await?;
        let payments = self.payments.get_all().await?;
        Ok(DashboardSummary::compute(&rooms, &tenants, &payments, period))
    }
}
