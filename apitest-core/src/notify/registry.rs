use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use super::{NotifyError, Result};

/// Receives serialized descriptors
#[async_trait]
pub trait Subscriber: Send + Sync {
    async fn deliver(&self, payload: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

/// Forwards payloads into a channel owned by the observer
pub struct ChannelSubscriber {
    sender: mpsc::Sender<String>,
}

impl ChannelSubscriber {
    pub fn new(sender: mpsc::Sender<String>) -> Self {
        Self { sender }
    }

    /// A subscriber plus the receiving end of its channel
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self::new(sender), receiver)
    }
}

/// A full channel counts as a failed delivery; the broadcaster never waits on a reader.
#[async_trait]
impl Subscriber for ChannelSubscriber {
    async fn deliver(&self, payload: &str) -> Result<()> {
        self.sender.try_send(payload.to_string()).map_err(|e| match e {
            TrySendError::Full(_) => NotifyError::Delivery("subscriber is not keeping up".to_string()),
            TrySendError::Closed(_) => NotifyError::Closed,
        })
    }
}

/// Outcome of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: usize,
    pub failed: usize,
}

/// Concurrent set of subscribers
#[derive(Default)]
pub struct SubscriberRegistry {
    subscribers: DashMap<SubscriberId, Arc<dyn Subscriber>>,
    next_id: AtomicU64,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber>) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.insert(id, subscriber);
        debug!("Subscriber {:?} registered", id);
        id
    }

    /// Returns whether the id was registered
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Deliver to every current subscriber. Failures are logged and skipped.
    pub async fn broadcast(&self, payload: &str) -> Delivery {
        // no map guard may be held across an await
        let snapshot: Vec<(SubscriberId, Arc<dyn Subscriber>)> =
            self.subscribers.iter().map(|entry| (*entry.key(), Arc::clone(entry.value()))).collect();

        let mut delivery = Delivery::default();
        for (id, subscriber) in snapshot {
            match subscriber.deliver(payload).await {
                Ok(()) => delivery.delivered += 1,
                Err(e) => {
                    warn!("Delivery to subscriber {:?} failed: {}", id, e);
                    delivery.failed += 1;
                }
            }
        }
        delivery
    }
}
