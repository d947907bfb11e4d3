//! # Subscriber side of a topic.
//!
//! A topic only ever talks to one kind of subscriber: a channel of
//! [`Message`](crate::Message)s that must be acknowledged. Everything else in
//! this module adapts that single interface to friendlier shapes.
//!
//! ## Architecture
//! ```text
//! control loop ──► [Message<T> queue] ──┬──► SyncSubscription<T>      (caller acks)
//!                                       ├──► forwarder ──► Subscription<T>   (auto-ack)
//!                                       └──► handler worker ──► Subscribe::on_message()
//!                                                  ├─ Ok    → ack
//!                                                  ├─ Err   → nack(err)
//!                                                  └─ panic → nack(HandlerPanicked)
//! ```
//!
//! ## Subscriber kinds
//! - **Sync**: [`Topic::subscribe_sync`](crate::Topic::subscribe_sync), the caller answers every message.
//! - **Fire-and-forget**: [`Topic::subscribe`](crate::Topic::subscribe), values are acked once
//!   they are pushed into the consumer's channel.
//! - **Handler**: [`Topic::subscribe_handler`](crate::Topic::subscribe_handler), a [`Subscribe`]
//!   implementation decides ack/nack through its return value.

mod forward;
mod subscriber;
mod subscription;

#[cfg(feature = "logging")]
mod log;

pub(crate) use forward::forward;
pub(crate) use subscriber::run_handler;
pub use subscriber::{HandlerPanicked, Subscribe};
pub use subscription::{SubscriberId, Subscription, SyncSubscription};

#[cfg(feature = "logging")]
pub use log::LogWriter;
