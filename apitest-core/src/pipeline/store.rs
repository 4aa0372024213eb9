//! Persistence of descriptors and their messages

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

use super::descriptor::{TestDescriptor, TestMessage};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Descriptor {0} not found")]
    NotFound(Uuid),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Storage collaborator for run records
#[async_trait]
pub trait DescriptorStore: Send + Sync {
    /// Insert or replace the descriptor
    async fn save_descriptor(&self, descriptor: &TestDescriptor) -> Result<(), StoreError>;

    async fn append_messages(&self, id: Uuid, messages: Vec<TestMessage>) -> Result<(), StoreError>;

    async fn descriptor(&self, id: Uuid) -> Result<TestDescriptor, StoreError>;

    async fn messages(&self, id: Uuid) -> Result<Vec<TestMessage>, StoreError>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    descriptors: DashMap<Uuid, TestDescriptor>,
    messages: DashMap<Uuid, Vec<TestMessage>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[async_trait]
impl DescriptorStore for InMemoryStore {
    async fn save_descriptor(&self, descriptor: &TestDescriptor) -> Result<(), StoreError> {
        self.descriptors.insert(descriptor.id, descriptor.clone());
        Ok(())
    }

    async fn append_messages(&self, id: Uuid, messages: Vec<TestMessage>) -> Result<(), StoreError> {
        if !self.descriptors.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        self.messages.entry(id).or_default().extend(messages);
        Ok(())
    }

    async fn descriptor(&self, id: Uuid) -> Result<TestDescriptor, StoreError> {
        self.descriptors.get(&id).map(|d| d.value().clone()).ok_or(StoreError::NotFound(id))
    }

    async fn messages(&self, id: Uuid) -> Result<Vec<TestMessage>, StoreError> {
        if !self.descriptors.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        Ok(self.messages.get(&id).map(|m| m.value().clone()).unwrap_or_default())
    }
}
