//! # Fire-and-forget adapter.
//!
//! Every fire-and-forget subscription is backed by an ack-aware channel
//! registered with the control loop and one forwarder task:
//!
//! ```text
//! control loop ──► [Message<T>] ──► forward() ──► [T] ──► consumer
//!                        ▲               │
//!                        └──── ack ◄─────┘ (after the value is queued)
//! ```
//!
//! ## Rules
//! - The ack is sent once the value sits in the consumer's channel, not when it is read.
//! - The consumer channel closes when the internal channel closes.
//! - If the consumer drops its receiver the forwarder acks the pending message
//!   and exits; the control loop prunes the subscriber on the next publish.

use tokio::sync::mpsc;
use tracing::debug;

use crate::message::Message;
use crate::subscribers::SubscriberId;

/// Pushes payloads from `rx` into `consumer`, acking each one.
pub(crate) async fn forward<T>(
    id: SubscriberId,
    mut rx: mpsc::Receiver<Message<T>>,
    consumer: mpsc::Sender<T>,
) {
    while let Some(msg) = rx.recv().await {
        let (value, acker) = msg.into_parts();
        if consumer.send(value).await.is_err() {
            // refuse further sends before answering, so the loop prunes us
            rx.close();
            acker.ack();
            debug!(subscriber = %id, "consumer dropped its receiver; forwarder exiting");
            return;
        }
        acker.ack();
    }
    debug!(subscriber = %id, "subscription closed; forwarder exiting");
}
