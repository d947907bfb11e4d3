//! # Topic configuration.
//!
//! Provides [`TopicConfig`] settings for a single [`Topic`](crate::Topic).
//!
//! [`Topic::new`](crate::Topic::new) always uses [`TopicConfig::default`], i.e.
//! the fixed [`ACK_TIMEOUT`]. A custom config is only needed to tune buffer
//! sizes or to shorten the timeout in tests.
//!
//! ## Sentinel values
//! - capacities of `0` are clamped to `1` (a zero-capacity tokio channel panics)
//! - `ack_timeout = 0s` is clamped to 1ms

use std::time::Duration;

/// Time to wait for a subscriber ack before giving up on it.
///
/// Bounds the control loop's wait on each subscriber, so a
/// [`Topic::publish_sync`](crate::Topic::publish_sync) call never outlives
/// `subscribers * ACK_TIMEOUT`.
pub const ACK_TIMEOUT: Duration = Duration::from_secs(30);

/// Capacity of the publish queue feeding the control loop.
pub const PUBLISH_CAPACITY: usize = 16384;

/// Buffer size of subscription channels created by the topic.
pub const SUBSCRIBER_CAPACITY: usize = 16;

/// Configuration of one topic.
///
/// ## Field semantics
/// - `ack_timeout`: per-subscriber deadline for send + ack
/// - `publish_capacity`: bounded publish queue size; `publish` waits when it is full
/// - `subscriber_capacity`: buffer of channels created by `subscribe`/`subscribe_sync`
#[derive(Clone, Debug)]
pub struct TopicConfig {
    /// Deadline for a subscriber to receive and answer one message.
    ///
    /// A subscriber that misses it is evicted and reported as
    /// [`DeliveryError::AckTimeout`](crate::DeliveryError::AckTimeout).
    pub ack_timeout: Duration,

    /// Capacity of the publish queue.
    pub publish_capacity: usize,

    /// Buffer size for channels the topic creates on behalf of subscribers.
    pub subscriber_capacity: usize,
}

impl TopicConfig {
    /// Returns the ack timeout clamped to a minimum of 1ms.
    #[inline]
    pub fn ack_timeout_clamped(&self) -> Duration {
        self.ack_timeout.max(Duration::from_millis(1))
    }

    /// Returns the publish queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn publish_capacity_clamped(&self) -> usize {
        self.publish_capacity.max(1)
    }

    /// Returns the subscription buffer size clamped to a minimum of 1.
    #[inline]
    pub fn subscriber_capacity_clamped(&self) -> usize {
        self.subscriber_capacity.max(1)
    }
}

impl Default for TopicConfig {
    /// Default configuration:
    ///
    /// - `ack_timeout = 30s`
    /// - `publish_capacity = 16384`
    /// - `subscriber_capacity = 16`
    fn default() -> Self {
        Self {
            ack_timeout: ACK_TIMEOUT,
            publish_capacity: PUBLISH_CAPACITY,
            subscriber_capacity: SUBSCRIBER_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = TopicConfig::default();
        assert_eq!(cfg.ack_timeout, Duration::from_secs(30));
        assert_eq!(cfg.publish_capacity, 16384);
        assert_eq!(cfg.subscriber_capacity, 16);
    }

    #[test]
    fn test_zero_values_are_clamped() {
        let cfg = TopicConfig {
            ack_timeout: Duration::ZERO,
            publish_capacity: 0,
            subscriber_capacity: 0,
        };
        assert_eq!(cfg.ack_timeout_clamped(), Duration::from_millis(1));
        assert_eq!(cfg.publish_capacity_clamped(), 1);
        assert_eq!(cfg.subscriber_capacity_clamped(), 1);
    }
}
