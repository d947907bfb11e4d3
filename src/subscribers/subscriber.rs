//! # Handler subscribers.
//!
//! Provides [`Subscribe`] an extension point for plugging message handlers into a topic.
//!
//! Each handler gets:
//! - **Dedicated worker task** (runs independently of other subscribers)
//! - **Bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (a panic becomes a nack carrying [`HandlerPanicked`])
//!
//! ## Architecture
//! ```text
//! control loop ──► [bounded queue] ──► worker task ──► handler.on_message()
//!                                         ├─ Ok(())  → ack
//!                                         ├─ Err(e)  → nack(e)
//!                                         └─ panic   → nack(HandlerPanicked)
//! ```
//!
//! ## Rules
//! - Messages are processed sequentially (FIFO) per handler.
//! - The control loop waits for the answer, so a slow handler delays fan-out
//!   to the subscribers after it, bounded by the ack timeout.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use tidings::{BoxError, Subscribe, Topic};
//!
//! struct Validator;
//!
//! #[async_trait]
//! impl Subscribe<i64> for Validator {
//!     async fn on_message(&self, value: &i64) -> Result<(), BoxError> {
//!         if *value < 0 {
//!             return Err("negative value".into());
//!         }
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &'static str { "validator" }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), tidings::TopicError> {
//! let topic = Topic::<i64>::new();
//! topic.subscribe_handler(Arc::new(Validator)).await?;
//!
//! assert!(topic.publish_sync(1).await.is_ok());
//! assert!(topic.publish_sync(-1).await.is_err());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::BoxError;
use crate::message::Message;
use crate::subscribers::SubscriberId;

/// Message handler attached to a topic.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Return `Err` to reject a message; do not panic.
/// - Answer well within the topic's ack timeout, or the handler is evicted.
#[async_trait]
pub trait Subscribe<T>: Send + Sync + 'static
where
    T: Send + Sync + 'static,
{
    /// Processes one message. `Ok` acks it, `Err` nacks it with the error.
    async fn on_message(&self, message: &T) -> Result<(), BoxError>;

    /// Returns the handler name used in logs and panic reports.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this handler.
    ///
    /// The topic clamps capacity to a minimum of 1.
    ///
    /// Default: 16.
    fn queue_capacity(&self) -> usize {
        crate::config::SUBSCRIBER_CAPACITY
    }
}

/// Nack reason reported when a handler panics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("handler {handler} panicked: {info}")]
pub struct HandlerPanicked {
    /// [`Subscribe::name`] of the handler.
    pub handler: &'static str,
    /// Panic payload rendered as text.
    pub info: String,
}

/// Worker loop driving one handler until its queue closes.
pub(crate) async fn run_handler<T>(
    id: SubscriberId,
    handler: Arc<dyn Subscribe<T>>,
    mut rx: mpsc::Receiver<Message<T>>,
) where
    T: Send + Sync + 'static,
{
    while let Some(msg) = rx.recv().await {
        let (value, acker) = msg.into_parts();
        let fut = handler.on_message(&value);

        match std::panic::AssertUnwindSafe(fut).catch_unwind().await {
            Ok(Ok(())) => acker.ack(),
            Ok(Err(err)) => acker.nack(err),
            Err(panic_err) => {
                let info = {
                    let any = &*panic_err;
                    if let Some(msg) = any.downcast_ref::<&'static str>() {
                        (*msg).to_string()
                    } else if let Some(msg) = any.downcast_ref::<String>() {
                        msg.clone()
                    } else {
                        "unknown panic".to_string()
                    }
                };
                warn!(subscriber = %id, handler = handler.name(), %info, "handler panicked");
                acker.nack(HandlerPanicked {
                    handler: handler.name(),
                    info,
                });
            }
        }
    }
    debug!(subscriber = %id, handler = handler.name(), "handler queue closed");
}
