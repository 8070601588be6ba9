use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info};
use sqlx::{sqlite::SqliteExecutor, SqlitePool};

use super::{ChangeFeed, RemoteSource, Repository, Subscription, SyncOutcome};
use crate::{dto::PaymentDto, errors::AppError, records::PaymentRecord, structs::Payment};

const ENTITY: &str = "payments";

const SELECT_PAYMENTS: &str = "SELECT id, tenant_id, room_id, period, amount_paid, paid_at, \
     status, penalty FROM payments";

#[derive(Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
    remote: Arc<dyn RemoteSource<PaymentDto>>,
    feed: Arc<ChangeFeed<Payment>>,
}

impl PaymentRepository {
    pub fn new(pool: SqlitePool, remote: Arc<dyn RemoteSource<PaymentDto>>) -> Self {
        Self {
            pool,
            remote,
            feed: Arc::new(ChangeFeed::new()),
        }
    }

    pub async fn find_by_tenant(&self, tenant_id: &str) -> Result<Vec<Payment>, AppError> {
        let rows = sqlx::query_as::<_, PaymentRecord>(&format!(
            "{} WHERE tenant_id = ? ORDER BY rowid",
            SELECT_PAYMENTS
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Payment::from).collect())
    }

    async fn publish(&self) -> Result<(), AppError> {
        let _guard = self.feed.lock().await;
        let snapshot = self.get_all().await?;
        self.feed.send(snapshot);
        Ok(())
    }
}

async fn upsert<'e, E: SqliteExecutor<'e>>(
    executor: E,
    record: &PaymentRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO payments (id, tenant_id, room_id, period, amount_paid, paid_at, status, penalty) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET tenant_id = excluded.tenant_id, room_id = excluded.room_id, \
         period = excluded.period, amount_paid = excluded.amount_paid, paid_at = excluded.paid_at, \
         status = excluded.status, penalty = excluded.penalty",
    )
    .bind(&record.id)
    .bind(&record.tenant_id)
    .bind(&record.room_id)
    .bind(&record.period)
    .bind(record.amount_paid)
    .bind(record.paid_at)
    .bind(record.status)
    .bind(record.penalty)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl Repository for PaymentRepository {
    type Entity = Payment;

    async fn observe_all(&self) -> Result<Subscription<Payment>, AppError> {
        let _guard = self.feed.lock().await;
        let current = self.get_all().await?;
        Ok(self.feed.subscribe(current))
    }

    async fn get_all(&self) -> Result<Vec<Payment>, AppError> {
        let rows = sqlx::query_as::<_, PaymentRecord>(&format!("{} ORDER BY rowid", SELECT_PAYMENTS))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Payment::from).collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Payment>, AppError> {
        let row = sqlx::query_as::<_, PaymentRecord>(&format!("{} WHERE id = ?", SELECT_PAYMENTS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Payment::from))
    }

    async fn insert(&self, payment: &Payment) -> Result<(), AppError> {
        upsert(&self.pool, &PaymentRecord::from(payment)).await?;
        info!(
            "Payment {} for {} saved ({})",
            payment.id, payment.period, payment.status
        );
        self.publish().await
    }

    async fn update(&self, payment: &Payment) -> Result<(), AppError> {
        let record = PaymentRecord::from(payment);
        let result = sqlx::query(
            "UPDATE payments SET tenant_id = ?, room_id = ?, period = ?, amount_paid = ?, \
             paid_at = ?, status = ?, penalty = ? WHERE id = ?",
        )
        .bind(&record.tenant_id)
        .bind(&record.room_id)
        .bind(&record.period)
        .bind(record.amount_paid)
        .bind(record.paid_at)
        .bind(record.status)
        .bind(record.penalty)
        .bind(&record.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        info!("Payment {} updated", payment.id);
        self.publish().await
    }

    async fn delete(&self, payment: &Payment) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM payments WHERE id = ?")
            .bind(&payment.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(());
        }
        info!("Payment with id {} deleted", payment.id);
        self.publish().await
    }

    async fn sync_with_remote(&self) -> Result<SyncOutcome, AppError> {
        let items = self.remote.fetch_all().await.map_err(|e| {
            error!("Failed to fetch {}: {}", ENTITY, e);
            AppError::sync(ENTITY, e)
        })?;

        let records: Vec<PaymentRecord> = items
            .into_iter()
            .map(|dto| PaymentRecord::from(&Payment::from(dto)))
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
