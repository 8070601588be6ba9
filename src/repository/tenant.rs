use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info};
use sqlx::{sqlite::SqliteExecutor, SqlitePool};

use super::{ChangeFeed, RemoteSource, Repository, Subscription, SyncOutcome};
use crate::{dto::TenantDto, errors::AppError, records::TenantRecord, structs::Tenant};

const ENTITY: &str = "tenants";

const SELECT_TENANTS: &str = "SELECT id, name, email, phone, room_id, occupation, monthly_rate, \
     moved_in_at, emergency_contact FROM tenants";

#[derive(Clone)]
pub struct TenantRepository {
    pool: SqlitePool,
    remote: Arc<dyn RemoteSource<TenantDto>>,
    feed: Arc<ChangeFeed<Tenant>>,
}

impl TenantRepository {
    pub fn new(pool: SqlitePool, remote: Arc<dyn RemoteSource<TenantDto>>) -> Self {
        Self {
            pool,
            remote,
            feed: Arc::new(ChangeFeed::new()),
        }
    }

    /// Tenants whose room reference points at `room_id`.
    pub async fn find_by_room(&self, room_id: &str) -> Result<Vec<Tenant>, AppError> {
        let rows = in_room(&self.pool, room_id).await?;
        Ok(rows.into_iter().map(Tenant::from).collect())
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub(crate) async fn publish(&self) -> Result<(), AppError> {
        let _guard = self.feed.lock().await;
        let snapshot = self.get_all().await?;
        self.feed.send(snapshot);
        Ok(())
    }
}

pub(crate) async fn in_room<'e, E: SqliteExecutor<'e>>(
    executor: E,
    room_id: &str,
) -> Result<Vec<TenantRecord>, sqlx::Error> {
    sqlx::query_as::<_, TenantRecord>(&format!(
        "{} WHERE room_id = ? ORDER BY rowid",
        SELECT_TENANTS
    ))
    .bind(room_id)
    .fetch_all(executor)
    .await
}

/// Rewrites an existing row; returns the number of rows touched.
pub(crate) async fn update<'e, E: SqliteExecutor<'e>>(
    executor: E,
    record: &TenantRecord,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE tenants SET name = ?, email = ?, phone = ?, room_id = ?, occupation = ?, \
         monthly_rate = ?, moved_in_at = ?, emergency_contact = ? WHERE id = ?",
    )
    .bind(&record.name)
    .bind(&record.email)
    .bind(&record.phone)
    .bind(&record.room_id)
    .bind(&record.occupation)
    .bind(record.monthly_rate)
    .bind(record.moved_in_at)
    .bind(&record.emergency_contact)
    .bind(&record.id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn upsert<'e, E: SqliteExecutor<'e>>(
    executor: E,
    record: &TenantRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO tenants (id, name, email, phone, room_id, occupation, monthly_rate, moved_in_at, emergency_contact) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET name = excluded.name, email = excluded.email, \
         phone = excluded.phone, room_id = excluded.room_id, occupation = excluded.occupation, \
         monthly_rate = excluded.monthly_rate, moved_in_at = excluded.moved_in_at, \
         emergency_contact = excluded.emergency_contact",
    )
    .bind(&record.id)
    .bind(&record.name)
    .bind(&record.email)
    .bind(&record.phone)
    .bind(&record.room_id)
    .bind(&record.occupation)
    .bind(record.monthly_rate)
    .bind(record.moved_in_at)
    .bind(&record.emergency_contact)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl Repository for TenantRepository {
    type Entity = Tenant;

    async fn observe_all(&self) -> Result<Subscription<Tenant>, AppError> {
        let _guard = self.feed.lock().await;
        let current = self.get_all().await?;
        Ok(self.feed.subscribe(current))
    }

    async fn get_all(&self) -> Result<Vec<Tenant>, AppError> {
        let rows = sqlx::query_as::<_, TenantRecord>(&format!("{} ORDER BY rowid", SELECT_TENANTS))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Tenant::from).collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Tenant>, AppError> {
        let row = sqlx::query_as::<_, TenantRecord>(&format!("{} WHERE id = ?", SELECT_TENANTS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Tenant::from))
    }

    async fn insert(&self, tenant: &Tenant) -> Result<(), AppError> {
        upsert(&self.pool, &TenantRecord::from(tenant)).await?;
        info!("Tenant {} saved", tenant.id);
        self.publish().await
    }

    async fn update(&self, tenant: &Tenant) -> Result<(), AppError> {
        if update(&self.pool, &TenantRecord::from(tenant)).await? == 0 {
            return Err(AppError::NotFound);
        }
        info!("Tenant {} updated", tenant.id);
        self.publish().await
    }

    async fn delete(&self, tenant: &Tenant) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = ?")
            .bind(&tenant.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(());
        }
        info!("Tenant with id {} deleted", tenant.id);
        self.publish().await
    }

    async fn sync_with_remote(&self) -> Result<SyncOutcome, AppError> {
        let items = self.remote.fetch_all().await.map_err(|e| {
            error!("Failed to fetch {}: {}", ENTITY, e);
            AppError::sync(ENTITY, e)
        })?;

        let records: Vec<TenantRecord> = items
            .into_iter()
            .map(|dto| TenantRecord::from(&Tenant::from(dto)))
            .collect();

        let mut tx = self.pool.begin().await?;
        for record in &records {
            upsert(&mut *tx, record).await?;
        }
        tx.commit().await?;

        if !records.is_empty() {
            self.publish().await?;
        }
        info!("Synced {} {} from remote", records.len(), ENTITY);
        Ok(SyncOutcome {
            entity: ENTITY,
            applied: records.len(),
        })
    }
}
