use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::Result;
use super::registry::SubscriberRegistry;
use crate::pipeline::{DescriptorStore, TestDescriptor};

/// Called by the orchestrator on every state change
#[async_trait]
pub trait ProgressObserver: Send + Sync {
    async fn on_transition(&self, descriptor: &TestDescriptor) -> Result<()>;
}

/// Persists each transition, then pushes it to subscribers
pub struct ProgressNotifier {
    store: Arc<dyn DescriptorStore>,
    registry: Arc<SubscriberRegistry>,
}

impl ProgressNotifier {
    pub fn new(store: Arc<dyn DescriptorStore>, registry: Arc<SubscriberRegistry>) -> Self {
        Self { store, registry }
    }

    pub fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.registry
    }
}

#[async_trait]
impl ProgressObserver for ProgressNotifier {
    /// Subscribers hear about the transition even when persisting it failed
    async fn on_transition(&self, descriptor: &TestDescriptor) -> Result<()> {
        let saved = self.store.save_descriptor(descriptor).await;
        if let Err(e) = &saved {
            warn!(run_id = %descriptor.id, "Could not persist {} transition: {}", descriptor.status, e);
        }

        let payload = serde_json::to_string(descriptor)?;
        let delivery = self.registry.broadcast(&payload).await;
        debug!(
            run_id = %descriptor.id,
            "Broadcast {} to {} subscriber(s), {} failed",
            descriptor.status, delivery.delivered, delivery.failed
        );
        saved?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ChannelSubscriber;
    use crate::notify::NotifyError;
    use crate::pipeline::{InMemoryStore, RunStatus, StoreError, TestMessage};
    use uuid::Uuid;

    struct UnavailableStore;

    #[async_trait]
    impl DescriptorStore for UnavailableStore {
        async fn save_descriptor(&self, _descriptor: &TestDescriptor) -> std::result::Result<(), StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn append_messages(&self, id: Uuid, _messages: Vec<TestMessage>) -> std::result::Result<(), StoreError> {
            Err(StoreError::NotFound(id))
        }

        async fn descriptor(&self, id: Uuid) -> std::result::Result<TestDescriptor, StoreError> {
            Err(StoreError::NotFound(id))
        }

        async fn messages(&self, id: Uuid) -> std::result::Result<Vec<TestMessage>, StoreError> {
            Err(StoreError::NotFound(id))
        }
    }

    #[tokio::test]
    async fn test_persists_then_broadcasts() {
        let store = Arc::new(InMemoryStore::new());
        let registry = Arc::new(SubscriberRegistry::new());
        let (sub, mut rx) = ChannelSubscriber::channel(4);
        registry.subscribe(Arc::new(sub));
        let notifier = ProgressNotifier::new(store.clone(), registry);

        let mut descriptor = TestDescriptor::new();
        descriptor.transition(RunStatus::Building).unwrap();
        notifier.on_transition(&descriptor).await.unwrap();

        assert_eq!(store.descriptor(descriptor.id).await.unwrap().status, RunStatus::Building);
        let payload: TestDescriptor = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(payload, descriptor);
    }

    #[tokio::test]
    async fn test_subscriber_failure_is_not_an_error() {
        let store = Arc::new(InMemoryStore::new());
        let registry = Arc::new(SubscriberRegistry::new());
        let (sub, rx) = ChannelSubscriber::channel(1);
        drop(rx);
        registry.subscribe(Arc::new(sub));

        let notifier = ProgressNotifier::new(store, registry);
        assert!(notifier.on_transition(&TestDescriptor::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_store_failure_still_broadcasts() {
        let registry = Arc::new(SubscriberRegistry::new());
        let (sub, mut rx) = ChannelSubscriber::channel(4);
        registry.subscribe(Arc::new(sub));
        let notifier = ProgressNotifier::new(Arc::new(UnavailableStore), registry);

        let mut descriptor = TestDescriptor::new();
        descriptor.transition(RunStatus::Building).unwrap();
        let result = notifier.on_transition(&descriptor).await;

        assert!(matches!(result, Err(NotifyError::Store(StoreError::Backend(_)))));
        let payload: TestDescriptor = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(payload, descriptor);
    }
}
