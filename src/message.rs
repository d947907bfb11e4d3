//! # Acknowledged message envelope.
//!
//! A [`Message`] is what a synchronous subscriber receives: the payload plus a
//! one-shot acknowledgment slot. Every delivery must be answered exactly once
//! with [`Message::ack`], [`Message::nack`] or [`Message::reject`]. All three
//! consume the message, so answering twice does not compile.
//!
//! Dropping a message without answering is reported to the publisher as
//! [`DeliveryError::Dropped`](crate::DeliveryError::Dropped).
//!
//! ## Example
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), tidings::TopicError> {
//! let topic = tidings::Topic::<u32>::new();
//! let mut sub = topic.subscribe_sync().await?;
//!
//! let consumer = tokio::spawn(async move {
//!     let msg = sub.recv().await.unwrap();
//!     if *msg.payload() % 2 == 0 { msg.ack() } else { msg.nack("odd") }
//! });
//!
//! assert!(topic.publish_sync(3).await.is_err());
//! consumer.await.unwrap();
//! # Ok(())
//! # }
//! ```

use tokio::sync::oneshot;

use crate::error::{BoxError, NackError};

/// Outcome written into the ack slot.
pub(crate) type AckResult = Result<(), BoxError>;

/// Payload paired with a one-shot acknowledgment slot.
#[derive(Debug)]
pub struct Message<T> {
    payload: T,
    acker: Acker,
}

impl<T> Message<T> {
    /// Creates a message and the receiving half of its ack slot.
    pub(crate) fn new(payload: T) -> (Self, oneshot::Receiver<AckResult>) {
        let (tx, rx) = oneshot::channel();
        let msg = Self {
            payload,
            acker: Acker { tx },
        };
        (msg, rx)
    }

    /// Borrows the payload.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Splits the message into its payload and the ack handle.
    ///
    /// Use this when the payload has to be moved somewhere before answering.
    pub fn into_parts(self) -> (T, Acker) {
        (self.payload, self.acker)
    }

    /// Signals successful processing.
    pub fn ack(self) {
        self.acker.ack();
    }

    /// Rejects the message with `err`.
    pub fn nack(self, err: impl Into<BoxError>) {
        self.acker.nack(err);
    }

    /// Rejects the message with the generic [`NackError`].
    pub fn reject(self) {
        self.acker.reject();
    }
}

/// Ack handle detached from its payload by [`Message::into_parts`].
#[derive(Debug)]
pub struct Acker {
    tx: oneshot::Sender<AckResult>,
}

impl Acker {
    /// Signals successful processing.
    pub fn ack(self) {
        // A closed slot means the loop stopped waiting (timeout or shutdown).
        let _ = self.tx.send(Ok(()));
    }

    /// Rejects the message with `err`.
    pub fn nack(self, err: impl Into<BoxError>) {
        let _ = self.tx.send(Err(err.into()));
    }

    /// Rejects the message with the generic [`NackError`].
    pub fn reject(self) {
        self.nack(NackError);
    }

    /// Returns true if nobody waits for the answer anymore.
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ack_resolves_ok() {
        let (msg, rx) = Message::new("hello");
        assert_eq!(*msg.payload(), "hello");
        msg.ack();
        assert!(matches!(rx.await, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_nack_carries_error() {
        let (msg, rx) = Message::new(1);
        msg.nack("bad");
        let err = rx.await.unwrap().unwrap_err();
        assert_eq!(err.to_string(), "bad");
    }

    #[tokio::test]
    async fn test_reject_uses_generic_nack() {
        let (msg, rx) = Message::new(1);
        msg.reject();
        let err = rx.await.unwrap().unwrap_err();
        assert_eq!(err.to_string(), "nack");
        assert!(err.downcast_ref::<NackError>().is_some());
    }

    #[tokio::test]
    async fn test_drop_closes_slot() {
        let (msg, rx) = Message::new(1);
        drop(msg);
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn test_into_parts_then_ack() {
        let (msg, rx) = Message::new(String::from("moved"));
        let (payload, acker) = msg.into_parts();
        assert_eq!(payload, "moved");
        assert!(!acker.is_abandoned());
        acker.ack();
        assert!(matches!(rx.await, Ok(Ok(()))));
    }

    #[test]
    fn test_abandoned_after_receiver_drop() {
        let (msg, rx) = Message::new(());
        drop(rx);
        let (_, acker) = msg.into_parts();
        assert!(acker.is_abandoned());
    }
}
