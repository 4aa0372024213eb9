//! Fan-out of run progress to persistence and live observers

pub mod progress;
pub mod registry;

pub use progress::{ProgressNotifier, ProgressObserver};
pub use registry::{ChannelSubscriber, Delivery, Subscriber, SubscriberId, SubscriberRegistry};

use crate::pipeline::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Subscriber channel closed")]
    Closed,

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Failed to serialize descriptor: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to persist descriptor: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, NotifyError>;
