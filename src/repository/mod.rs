//! Local-first repositories: SQLite is the source of truth for reads and writes,
//! and `sync_with_remote` pulls the service's collection into it.

use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;
use tokio::sync::{broadcast, Mutex, MutexGuard};

use crate::errors::AppError;

mod payment;
mod room;
mod tenant;

pub use payment::PaymentRepository;
pub use room::RoomRepository;
pub use tenant::TenantRepository;

pub(crate) use room::{claim as claim_room, fetch as fetch_room, upsert as upsert_room};
pub(crate) use tenant::{
    in_room as tenants_in_room, update as update_tenant, upsert as upsert_tenant,
};

const FEED_CAPACITY: usize = 32;

/// Read access to one remote collection.
#[async_trait]
pub trait RemoteSource<T>: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<T>, AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    pub entity: &'static str,
    /// Records received from the service and upserted locally. Zero means the
    /// pull succeeded with nothing to apply.
    pub applied: usize,
}

#[async_trait]
pub trait Repository: Send + Sync {
    type Entity: Clone + PartialEq + Send + Sync + 'static;

    /// Current contents in insertion order, followed by a fresh snapshot after every
    /// write that changes them.
    async fn observe_all(&self) -> Result<Subscription<Self::Entity>, AppError>;

    async fn get_all(&self) -> Result<Vec<Self::Entity>, AppError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Self::Entity>, AppError>;

    /// Stores the entity, replacing any row with the same id in place.
    async fn insert(&self, entity: &Self::Entity) -> Result<(), AppError>;

    /// Fails with `AppError::NotFound` when no row has the entity's id.
    async fn update(&self, entity: &Self::Entity) -> Result<(), AppError>;

    async fn delete(&self, entity: &Self::Entity) -> Result<(), AppError>;

    /// Pulls the full remote collection and upserts it by id. Local rows missing
    /// remotely are kept.
    async fn sync_with_remote(&self) -> Result<SyncOutcome, AppError>;
}

/// Fan-out of full-table snapshots to any number of subscribers.
pub struct ChangeFeed<T> {
    sender: broadcast::Sender<Arc<Vec<T>>>,
    publishing: Mutex<()>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> ChangeFeed<T> {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            sender,
            publishing: Mutex::new(()),
        }
    }

    /// Held while a snapshot is read and sent, so the last snapshot out always
    /// reflects every write committed before it.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.publishing.lock().await
    }

    pub fn send(&self, snapshot: Vec<T>) {
        let len = snapshot.len();
        // no receivers is fine: nobody is watching
        let receivers = self.sender.send(Arc::new(snapshot)).unwrap_or(0);
        log::debug!("Published {} rows to {} subscribers", len, receivers);
    }

    pub fn subscribe(&self, initial: Vec<T>) -> Subscription<T> {
        Subscription {
            initial: Some(initial),
            last: None,
            receiver: self.sender.subscribe(),
        }
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Default for ChangeFeed<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// One subscriber's live view of a table. Dropping it unsubscribes.
pub struct Subscription<T> {
    initial: Option<Vec<T>>,
    /// Last snapshot handed out; an identical broadcast is skipped.
    last: Option<Arc<Vec<T>>>,
    receiver: broadcast::Receiver<Arc<Vec<T>>>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Subscription<T> {
    /// Next snapshot that differs from the previous one; `None` once the owning
    /// repository is gone.
    pub async fn next(&mut self) -> Option<Vec<T>> {
        if let Some(initial) = self.initial.take() {
            self.last = Some(Arc::new(initial.clone()));
            return Some(initial);
        }
        loop {
            match self.receiver.recv().await {
                Ok(snapshot) => {
                    if self.last.as_deref() == Some(&*snapshot) {
                        continue;
                    }
                    self.last = Some(snapshot.clone());
                    return Some(snapshot.as_ref().clone());
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("Subscriber lagged, skipped {} snapshots", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Vec<T>> {
        futures::stream::unfold(self, |mut sub| async move {
            sub.next().await.map(|snapshot| (snapshot, sub))
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex as StdMutex;

    /// In-process remote collection for repository tests.
    pub struct StubRemote<T> {
        response: StdMutex<Result<Vec<T>, u16>>,
    }

    impl<T: Clone + Send + Sync + 'static> StubRemote<T> {
        pub fn with(items: Vec<T>) -> Arc<Self> {
            Arc::new(Self {
                response: StdMutex::new(Ok(items)),
            })
        }

        pub fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                response: StdMutex::new(Err(status)),
            })
        }

        pub fn set(&self, items: Vec<T>) {
            *self.response.lock().unwrap() = Ok(items);
        }
    }

    #[async_trait]
    impl<T: Clone + Send + Sync + 'static> RemoteSource<T> for StubRemote<T> {
        async fn fetch_all(&self) -> Result<Vec<T>, AppError> {
            match &*self.response.lock().unwrap() {
                Ok(items) => Ok(items.clone()),
                Err(status) => Err(AppError::RemoteStatus {
                    status: *status,
                    body: "stub failure".into(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn subscription_starts_with_initial_snapshot() {
        let feed = ChangeFeed::new();
        let mut sub = feed.subscribe(vec![1, 2]);
        feed.send(vec![1, 2, 3]);

        assert_eq!(sub.next().await, Some(vec![1, 2]));
        assert_eq!(sub.next().await, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn each_subscriber_gets_every_snapshot() {
        let feed = ChangeFeed::new();
        let a = feed.subscribe(vec![]).into_stream();
        let b = feed.subscribe(vec![]).into_stream();

        feed.send(vec!["x"]);
        feed.send(vec!["x", "y"]);
        drop(feed);

        let a: Vec<_> = a.collect().await;
        let b: Vec<_> = b.collect().await;
        assert_eq!(a, vec![vec![], vec!["x"], vec!["x", "y"]]);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn repeated_snapshot_is_delivered_once() {
        let feed = ChangeFeed::new();
        let mut sub = feed.subscribe(vec![1]);
        feed.send(vec![1]);
        feed.send(vec![1, 2]);
        feed.send(vec![1, 2]);
        feed.send(vec![1]);
        drop(feed);

        assert_eq!(sub.next().await, Some(vec![1]));
        assert_eq!(sub.next().await, Some(vec![1, 2]));
        assert_eq!(sub.next().await, Some(vec![1]));
        assert_eq!(sub.next().await, None);
    }
}
