//! Error types used by topics and event sources.
//!
//! This module defines:
//!
//! - [`TopicError`]: errors returned by [`Topic`](crate::Topic) operations.
//! - [`DeliveryError`]: the outcome of one failed delivery to one subscriber.
//! - [`DeliveryErrors`]: the aggregate of every failed delivery for one
//!   synchronous publish.
//! - [`NackError`]: the generic rejection used when a subscriber nacks without a reason.
//!
//! [`TopicError`] and [`DeliveryError`] provide `as_label` for logs/metrics.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::subscribers::SubscriberId;

/// Boxed error carried by a nack.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// # Errors returned by topic operations.
///
/// `Closed` and `NotSubscribed` indicate misuse of a topic by the caller;
/// they are returned immediately and never retried internally.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TopicError {
    /// The topic has been closed; no further operation can succeed.
    #[error("topic closed")]
    Closed,

    /// The id does not belong to a live subscription of this topic.
    #[error("subscriber {0} is not subscribed")]
    NotSubscribed(SubscriberId),

    /// One or more subscribers failed to process a synchronous publish.
    #[error(transparent)]
    Delivery(#[from] DeliveryErrors),
}

impl TopicError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tidings::TopicError;
    ///
    /// assert_eq!(TopicError::Closed.as_label(), "topic_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TopicError::Closed => "topic_closed",
            TopicError::NotSubscribed(_) => "topic_not_subscribed",
            TopicError::Delivery(_) => "topic_delivery_failed",
        }
    }

    /// Returns the per-subscriber failures if this is a delivery error.
    pub fn delivery(&self) -> Option<&DeliveryErrors> {
        match self {
            TopicError::Delivery(errs) => Some(errs),
            _ => None,
        }
    }
}

/// # Failure of a single delivery to a single subscriber.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The subscriber rejected the message.
    #[error("subscriber {subscriber}: {source}")]
    Nack {
        /// Rejecting subscriber.
        subscriber: SubscriberId,
        /// Error passed to the nack.
        source: BoxError,
    },

    /// The subscriber did not answer within the acknowledgment timeout and was evicted.
    #[error("subscriber {subscriber}: no ack within {timeout:?}, evicted")]
    AckTimeout {
        /// Evicted subscriber.
        subscriber: SubscriberId,
        /// The acknowledgment timeout that was exceeded.
        timeout: Duration,
    },

    /// The subscriber dropped the message without acking or nacking it.
    #[error("subscriber {subscriber}: message dropped without ack")]
    Dropped {
        /// Offending subscriber.
        subscriber: SubscriberId,
    },
}

impl DeliveryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DeliveryError::Nack { .. } => "delivery_nack",
            DeliveryError::AckTimeout { .. } => "delivery_ack_timeout",
            DeliveryError::Dropped { .. } => "delivery_dropped",
        }
    }

    /// Returns the subscriber this failure belongs to.
    pub fn subscriber(&self) -> SubscriberId {
        match self {
            DeliveryError::Nack { subscriber, .. }
            | DeliveryError::AckTimeout { subscriber, .. }
            | DeliveryError::Dropped { subscriber } => *subscriber,
        }
    }
}

/// All failed deliveries of one synchronous publish.
///
/// Displays as the member messages joined by newlines. Never empty when
/// returned from [`Topic::publish_sync`](crate::Topic::publish_sync).
#[derive(Debug, Default)]
pub struct DeliveryErrors(Vec<DeliveryError>);

impl DeliveryErrors {
    /// Wraps the collected failures; returns `None` when there are none.
    pub(crate) fn join(errors: Vec<DeliveryError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    /// Iterates over individual failures in delivery order.
    pub fn iter(&self) -> std::slice::Iter<'_, DeliveryError> {
        self.0.iter()
    }

    /// Number of failed deliveries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no delivery failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the aggregate and returns the individual failures.
    pub fn into_vec(self) -> Vec<DeliveryError> {
        self.0
    }
}

impl fmt::Display for DeliveryErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DeliveryErrors {}

impl<'a> IntoIterator for &'a DeliveryErrors {
    type Item = &'a DeliveryError;
    type IntoIter = std::slice::Iter<'a, DeliveryError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Generic rejection used by [`Message::reject`](crate::Message::reject).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("nack")]
pub struct NackError;
