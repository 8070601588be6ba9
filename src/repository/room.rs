use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info};
use sqlx::{sqlite::SqliteExecutor, SqlitePool};

use super::{ChangeFeed, RemoteSource, Repository, Subscription, SyncOutcome};
use crate::{
    dto::RoomDto,
    errors::AppError,
    records::RoomRecord,
    structs::{Room, RoomStatus},
};

const ENTITY: &str = "rooms";

const SELECT_ROOMS: &str =
    "SELECT id, room_number, room_type, floor, monthly_rate, status FROM rooms";

#[derive(Clone)]
pub struct RoomRepository {
    pool: SqlitePool,
    remote: Arc<dyn RemoteSource<RoomDto>>,
    feed: Arc<ChangeFeed<Room>>,
}

impl RoomRepository {
    pub fn new(pool: SqlitePool, remote: Arc<dyn RemoteSource<RoomDto>>) -> Self {
        Self {
            pool,
            remote,
            feed: Arc::new(ChangeFeed::new()),
        }
    }

    pub async fn find_by_status(&self, status: RoomStatus) -> Result<Vec<Room>, AppError> {
        let rows = sqlx::query_as::<_, RoomRecord>(&format!(
            "{} WHERE status = ? ORDER BY rowid",
            SELECT_ROOMS
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Room::from).collect())
    }

    pub(crate) async fn publish(&self) -> Result<(), AppError> {
        let _guard = self.feed.lock().await;
        let snapshot = self.get_all().await?;
        self.feed.send(snapshot);
        Ok(())
    }
}

pub(crate) async fn fetch<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: &str,
) -> Result<Option<RoomRecord>, sqlx::Error> {
    sqlx::query_as::<_, RoomRecord>(&format!("{} WHERE id = ?", SELECT_ROOMS))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// No-op write on the room row. As the first statement of a transaction it takes
/// SQLite's write lock, so later reads in that transaction cannot go stale.
/// Returns false when the room does not exist.
pub(crate) async fn claim<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE rooms SET status = status WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn upsert<'e, E: SqliteExecutor<'e>>(
    executor: E,
    record: &RoomRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO rooms (id, room_number, room_type, floor, monthly_rate, status) \
         VALUES (?, ?, ?, ?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET room_number = excluded.room_number, \
         room_type = excluded.room_type, floor = excluded.floor, \
         monthly_rate = excluded.monthly_rate, status = excluded.status",
    )
    .bind(&record.id)
    .bind(&record.room_number)
    .bind(&record.room_type)
    .bind(record.floor)
    .bind(record.monthly_rate)
    .bind(record.status)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl Repository for RoomRepository {
    type Entity = Room;

    async fn observe_all(&self) -> Result<Subscription<Room>, AppError> {
        let _guard = self.feed.lock().await;
        let current = self.get_all().await?;
        Ok(self.feed.subscribe(current))
    }

    async fn get_all(&self) -> Result<Vec<Room>, AppError> {
        let rows = sqlx::query_as::<_, RoomRecord>(&format!("{} ORDER BY rowid", SELECT_ROOMS))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Room::from).collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Room>, AppError> {
        Ok(fetch(&self.pool, id).await?.map(Room::from))
    }

    async fn insert(&self, room: &Room) -> Result<(), AppError> {
        upsert(&self.pool, &RoomRecord::from(room)).await?;
        info!("Room {} ({}) saved", room.room_number, room.id);
        self.publish().await
    }

    async fn update(&self, room: &Room) -> Result<(), AppError> {
        let record = RoomRecord::from(room);
        let result = sqlx::query(
            "UPDATE rooms SET room_number = ?, room_type = ?, floor = ?, monthly_rate = ?, \
             status = ? WHERE id = ?",
        )
        .bind(&record.room_number)
        .bind(&record.room_type)
        .bind(record.floor)
        .bind(record.monthly_rate)
        .bind(record.status)
        .bind(&record.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        info!("Room {} updated, status {}", room.room_number, room.status);
        self.publish().await
    }

    async fn delete(&self, room: &Room) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = ?")
            .bind(&room.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(());
        }
        info!("Room with id {} deleted", room.id);
        self.publish().await
    }

    async fn sync_with_remote(&self) -> Result<SyncOutcome, AppError> {
        let items = self.remote.fetch_all().await.map_err(|e| {
            error!("Failed to fetch {}: {}", ENTITY, e);
            AppError::sync(ENTITY, e)
        })?;

        let records: Vec<RoomRecord> = items
            .into_iter()
            .map(|dto| RoomRecord::from(&Room::from(dto)))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, repository::testing::StubRemote};
    use std::time::Duration;

    async fn repo(remote: Arc<StubRemote<RoomDto>>) -> RoomRepository {
        RoomRepository::new(db::connect_in_memory().await.unwrap(), remote)
    }

    #[tokio::test]
    async fn status_update_emits_one_snapshot() {
        let repo = repo(StubRemote::with(vec![])).await;
        let room = Room::new("101", "Standard", 1, 800_000);
        repo.insert(&room).await.unwrap();

        let mut sub = repo.observe_all().await.unwrap();
        assert_eq!(sub.next().await.unwrap()[0].status, RoomStatus::Available);

        let occupied = room.clone().with_status(RoomStatus::Occupied);
        repo.update(&occupied).await.unwrap();

        assert_eq!(sub.next().await, Some(vec![occupied]));
        assert!(tokio::time::timeout(Duration::from_millis(50), sub.next())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn observer_queued_behind_a_write_sees_it_once() {
        let repo = repo(StubRemote::with(vec![])).await;
        let guard = repo.feed.lock().await;

        let observer = tokio::spawn({
            let repo = repo.clone();
            async move { repo.observe_all().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let room = Room::new("101", "Standard", 1, 800_000);
        let writer = tokio::spawn({
            let repo = repo.clone();
            let room = room.clone();
            async move { repo.insert(&room).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(guard);

        let mut sub = observer.await.unwrap().unwrap();
        writer.await.unwrap().unwrap();

        assert_eq!(sub.next().await, Some(vec![room]));
        assert!(tokio::time::timeout(Duration::from_millis(50), sub.next())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn concurrent_subscribers_are_independent() {
        let repo = repo(StubRemote::with(vec![])).await;
        let mut first = repo.observe_all().await.unwrap();
        let room = Room::new("201", "Deluxe", 2, 1_500_000);
        repo.insert(&room).await.unwrap();
        let mut second = repo.observe_all().await.unwrap();

        assert_eq!(first.next().await, Some(vec![]));
        assert_eq!(first.next().await, Some(vec![room.clone()]));
        assert_eq!(second.next().await, Some(vec![room.clone()]));

        drop(first);
        repo.delete(&room).await.unwrap();
        assert_eq!(second.next().await, Some(vec![]));
    }

    #[tokio::test]
    async fn status_is_stored_as_closed_enum() {
        let repo = repo(StubRemote::with(vec![])).await;
        let maintenance = Room::new("301", "Standard", 3, 700_000).with_status(RoomStatus::Maintenance);
        repo.insert(&maintenance).await.unwrap();
        repo.insert(&Room::new("302", "Standard", 3, 700_000)).await.unwrap();

        let stored: String = sqlx::query_scalar("SELECT status FROM rooms WHERE id = ?")
            .bind(&maintenance.id)
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(stored, "maintenance");
        assert_eq!(
            repo.find_by_status(RoomStatus::Maintenance).await.unwrap(),
            vec![maintenance]
        );
    }

    #[tokio::test]
    async fn sync_maps_remote_rooms() {
        let remote_room = Room::new("A-1", "VIP", 1, 2_000_000).with_status(RoomStatus::Occupied);
        let repo = repo(StubRemote::with(vec![RoomDto::from(&remote_room)])).await;

        let outcome = repo.sync_with_remote().await.unwrap();
        assert_eq!(outcome, SyncOutcome { entity: "rooms", applied: 1 });
        assert_eq!(repo.get_by_id(&remote_room.id).await.unwrap(), Some(remote_room));
    }

    #[tokio::test]
    async fn empty_remote_is_success_without_emission() {
        let repo = repo(StubRemote::with(vec![])).await;
        let mut sub = repo.observe_all().await.unwrap();
        sub.next().await;

        let outcome = repo.sync_with_remote().await.unwrap();
        assert_eq!(outcome.applied, 0);
        assert!(tokio::time::timeout(Duration::from_millis(50), sub.next())
            .await
            .is_err());
    }
}
