//! # tidings
//!
//! **Tidings** is an in-process publish/subscribe library for Rust.
//!
//! It provides a single-topic broadcast primitive, [`Topic`], with two
//! delivery modes (fire-and-forget and acknowledged), and a last-value cache,
//! [`EventSource`], layered on top of it. Multiple independent topics are
//! simply multiple instances.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Topic<T>    │   │  Topic<T>    │   │ EventSource  │
//!     │  (clone #1)  │   │  (clone #2)  │   │ (store/swap) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ publish / subscribe / unsubscribe / close
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  control queue (unbounded, polled first)                          │
//! │  publish queue (bounded, TopicConfig::publish_capacity)           │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │      ControlLoop       │
//!                       │ (owns subscriber set)  │
//!                       └───┬────────┬───────┬───┘
//!                           ▼        ▼       ▼           one Message<T> each,
//!                     SyncSub   forwarder  handler       sequential, bounded
//!                     (caller    │          worker       by ack_timeout
//!                      acks)     ▼          ▼
//!                          Subscription  Subscribe::on_message()
//! ```
//!
//! ### Acknowledged publish
//! ```text
//! publish_sync(v) ──► publish queue ──► ControlLoop
//!
//! for each subscriber (registration order) {
//!   ├─► send Message{ v.clone(), ack slot }
//!   ├─► wait up to ack_timeout
//!   │       ├─ ack      ─► ok
//!   │       ├─ nack(e)  ─► DeliveryError::Nack
//!   │       ├─ dropped  ─► DeliveryError::Dropped
//!   │       ├─ timeout  ─► DeliveryError::AckTimeout, subscriber evicted
//!   │       └─ gone     ─► subscriber pruned
//! }
//! reply: Ok(()) or DeliveryErrors (every failure joined)
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                            |
//! |-------------------|----------------------------------------------------------------|-----------------------------------------------|
//! | **Topic**         | Broadcast values to every current subscriber.                  | [`Topic`]                                     |
//! | **Acknowledgment**| Sync subscribers answer each message; publishers can wait.     | [`Message`], [`Acker`], [`SyncSubscription`]  |
//! | **Subscribers**   | Channels, existing senders or async handlers.                  | [`Subscription`], [`Subscribe`]               |
//! | **Event source**  | Topic plus the last published value.                           | [`EventSource`], [`StoreMode`]                |
//! | **Errors**        | Typed errors for misuse and per-subscriber delivery failures.  | [`TopicError`], [`DeliveryErrors`]            |
//! | **Configuration** | Ack timeout and buffer sizes.                                  | [`TopicConfig`]                               |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] handler _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use tidings::{Topic, TopicError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), TopicError> {
//!     let topic = Topic::<String>::new();
//!
//!     // Acknowledged subscriber: every message must be answered
//!     let mut audit = topic.subscribe_sync().await?;
//!     tokio::spawn(async move {
//!         while let Some(msg) = audit.recv().await {
//!             if msg.payload().is_empty() {
//!                 msg.nack("empty payload");
//!             } else {
//!                 msg.ack();
//!             }
//!         }
//!     });
//!
//!     // Waits until the subscriber answered
//!     topic.publish_sync(String::from("hello")).await?;
//!     assert!(topic.publish_sync(String::new()).await.is_err());
//!
//!     topic.close().await?;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod message;
mod source;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::Topic;
pub use config::{ACK_TIMEOUT, PUBLISH_CAPACITY, SUBSCRIBER_CAPACITY, TopicConfig};
pub use error::{BoxError, DeliveryError, DeliveryErrors, NackError, TopicError};
pub use message::{Acker, Message};
pub use source::{EventSource, StoreMode};
pub use subscribers::{HandlerPanicked, Subscribe, SubscriberId, Subscription, SyncSubscription};

// Optional: expose a simple built-in logger handler (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
