//! # EventSource: topic + current value.
//!
//! ```text
//!  store / swap / compare_and_swap ──► current (direct write) ──► publish
//!                                                                  │
//!  publish / publish_sync ─────────────────────────────────────────┤
//!                                                                  ▼
//!                                                               Topic<T>
//!                                                                  │
//!                        mirror task ◄── internal sync subscription┘
//!                            │
//!                            └──► current (write, then ack)
//! ```
//!
//! ## Rules
//! - `current` starts at `T::default()`.
//! - `store`, `swap` and `compare_and_swap` write `current` before publishing, so
//!   a `load` right after them observes the new value.
//! - Values published directly (`publish*`) reach `current` through the mirror
//!   task; with [`StoreMode::PublishSync`] (or `publish_sync`) the mirror has
//!   acked before the call returns.
//! - The event source never closes its topic. Closing it through
//!   [`EventSource::topic`] stops the mirror; `current` keeps its last value.
//!
//! ## Example
//! ```rust
//! use tidings::EventSource;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), tidings::TopicError> {
//! let source = EventSource::<u32>::new();
//! assert_eq!(source.load().await, 0);
//!
//! let mut changes = source.subscribe().await?;
//! source.store(2).await?;
//!
//! assert_eq!(source.load().await, 2);
//! assert_eq!(changes.recv().await, Some(2));
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use tracing::debug;

use crate::config::TopicConfig;
use crate::core::Topic;
use crate::error::TopicError;
use crate::subscribers::{SubscriberId, Subscription, SyncSubscription};

/// How [`EventSource`] publishes values written through its store operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreMode {
    /// Fire-and-forget: the write returns once the value is enqueued.
    #[default]
    Publish,
    /// Acknowledged: the write returns once every subscriber answered.
    PublishSync,
}

/// A [`Topic`] that also keeps the last published value.
pub struct EventSource<T> {
    topic: Topic<T>,
    current: Arc<RwLock<T>>,
    mode: StoreMode,
}

impl<T> Clone for EventSource<T> {
    fn clone(&self) -> Self {
        Self {
            topic: self.topic.clone(),
            current: Arc::clone(&self.current),
            mode: self.mode,
        }
    }
}

impl<T> fmt::Debug for EventSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSource")
            .field("topic", &self.topic)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl<T> Default for EventSource<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventSource<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    /// Creates an event source in [`StoreMode::Publish`] with a default topic.
    ///
    /// # Panics
    /// Panics if called outside of a Tokio runtime.
    pub fn new() -> Self {
        Self::with_mode(StoreMode::default())
    }

    /// Creates an event source with the given store mode.
    ///
    /// # Panics
    /// Panics if called outside of a Tokio runtime.
    pub fn with_mode(mode: StoreMode) -> Self {
        Self::with_config(TopicConfig::default(), mode)
    }

    /// Creates an event source over a topic built from `config`.
    ///
    /// # Panics
    /// Panics if called outside of a Tokio runtime.
    pub fn with_config(config: TopicConfig, mode: StoreMode) -> Self {
        let (tx, rx) = mpsc::channel(config.subscriber_capacity_clamped());
        let (topic, id) = Topic::with_subscriber(config, tx);
        let current = Arc::new(RwLock::new(T::default()));
        tokio::spawn(mirror(Subscription::new(id, rx), Arc::clone(&current)));

        Self {
            topic,
            current,
            mode,
        }
    }

    /// Returns a snapshot of the current value.
    pub async fn load(&self) -> T {
        self.current.read().await.clone()
    }

    /// Sets the current value and publishes it.
    pub async fn store(&self, value: T) -> Result<(), TopicError> {
        self.ensure_open()?;
        *self.current.write().await = value.clone();
        self.publish_update(value).await
    }

    /// Replaces the current value, publishes the new one, returns the previous.
    pub async fn swap(&self, value: T) -> Result<T, TopicError> {
        self.ensure_open()?;
        let previous = {
            let mut current = self.current.write().await;
            std::mem::replace(&mut *current, value.clone())
        };
        self.publish_update(value).await?;
        Ok(previous)
    }

    /// Stores `new` and publishes it only if the current value equals `old`.
    ///
    /// Returns `Ok(false)` and leaves the value untouched otherwise.
    pub async fn compare_and_swap(&self, old: &T, new: T) -> Result<bool, TopicError>
    where
        T: PartialEq,
    {
        self.ensure_open()?;
        {
            let mut current = self.current.write().await;
            if *current != *old {
                return Ok(false);
            }
            *current = new.clone();
        }
        self.publish_update(new).await?;
        Ok(true)
    }

    /// Publishes without waiting for subscribers; `current` follows via the mirror.
    pub async fn publish(&self, value: T) -> Result<(), TopicError> {
        self.topic.publish(value).await
    }

    /// Publishes and waits for every subscriber, the mirror included.
    pub async fn publish_sync(&self, value: T) -> Result<(), TopicError> {
        self.topic.publish_sync(value).await
    }

    /// See [`Topic::subscribe`].
    pub async fn subscribe(&self) -> Result<Subscription<T>, TopicError> {
        self.topic.subscribe().await
    }

    /// See [`Topic::subscribe_sync`].
    pub async fn subscribe_sync(&self) -> Result<SyncSubscription<T>, TopicError> {
        self.topic.subscribe_sync().await
    }

    /// Returns the underlying topic.
    pub fn topic(&self) -> &Topic<T> {
        &self.topic
    }

    /// Returns the store mode chosen at construction.
    pub fn mode(&self) -> StoreMode {
        self.mode
    }

    async fn publish_update(&self, value: T) -> Result<(), TopicError> {
        match self.mode {
            StoreMode::Publish => self.topic.publish(value).await,
            StoreMode::PublishSync => self.topic.publish_sync(value).await,
        }
    }

    fn ensure_open(&self) -> Result<(), TopicError> {
        if self.topic.is_closed() {
            Err(TopicError::Closed)
        } else {
            Ok(())
        }
    }
}

/// Copies every delivered value into `current`, then acks it.
async fn mirror<T>(mut changes: SyncSubscription<T>, current: Arc<RwLock<T>>) {
    let id: SubscriberId = changes.id();
    while let Some(msg) = changes.recv().await {
        let (value, acker) = msg.into_parts();
        *current.write().await = value;
        acker.ack();
    }
    debug!(subscriber = %id, "event source mirror stopped");
}
