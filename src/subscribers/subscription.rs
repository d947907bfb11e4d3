//! # Subscription handles.
//!
//! [`Subscription`] pairs the receiving end of a delivery channel with the
//! [`SubscriberId`] the topic assigned to it. The id is the subscriber's
//! identity: it is the key in the topic's subscriber set and the argument to
//! [`Topic::unsubscribe`](crate::Topic::unsubscribe).
//!
//! A subscription also implements [`futures::Stream`], ending when the topic
//! closes the channel (unsubscribe, eviction or topic close).

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::message::Message;

/// Identity of one subscriber within a topic.
///
/// Ids are allocated in increasing order, so comparing two ids of the same
/// topic tells which subscriber registered first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the numeric value of the id.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Receiving end of a subscription.
#[derive(Debug)]
pub struct Subscription<T> {
    id: SubscriberId,
    rx: mpsc::Receiver<T>,
}

/// Subscription whose items must be acknowledged.
pub type SyncSubscription<T> = Subscription<Message<T>>;

impl<T> Subscription<T> {
    pub(crate) fn new(id: SubscriberId, rx: mpsc::Receiver<T>) -> Self {
        Self { id, rx }
    }

    /// Id to pass to `unsubscribe`/`unsubscribe_sync`.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Receives the next item; `None` once the topic closed the channel and
    /// every buffered item has been read.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Receives an item if one is buffered.
    pub fn try_recv(&mut self) -> Result<T, mpsc::error::TryRecvError> {
        self.rx.try_recv()
    }

    /// Returns true once the topic dropped its side of the channel.
    pub fn is_closed(&self) -> bool {
        self.rx.is_closed()
    }

    /// Splits the handle into the id and the raw receiver.
    pub fn into_inner(self) -> (SubscriberId, mpsc::Receiver<T>) {
        (self.id, self.rx)
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.get_mut().rx.poll_recv(cx)
    }
}
