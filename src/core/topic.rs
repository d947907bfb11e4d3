//! # Topic: handle to a single-topic publish/subscribe primitive.
//!
//! [`Topic`] is a cheap, cloneable handle. Every clone talks to the same
//! control loop, which is spawned by [`Topic::new`] and owns the subscriber
//! set (see the `control` module).
//!
//! ## Delivery modes
//! - [`Topic::publish`]: enqueue and return; nothing waits for subscribers.
//! - [`Topic::publish_sync`]: enqueue and wait until every subscriber current at
//!   fan-out time acked or nacked. Nacks are joined into one [`DeliveryErrors`].
//!
//! ## Subscribing
//! ```text
//! subscribe()          ──► forwarder ──► Subscription<T>          (auto-ack)
//! subscribe_to(tx)     ──► forwarder ──► caller's Sender<T>       (auto-ack)
//! subscribe_sync()     ──────────────► SyncSubscription<T>        (caller acks)
//! subscribe_sync_to(tx)──────────────► caller's Sender<Message<T>>
//! subscribe_handler(h) ──► worker ───► h.on_message()             (Result acks)
//! ```
//! `subscribe*` returns only after the control loop registered the
//! subscriber, so a value published afterwards is guaranteed to reach it.
//!
//! ## Errors
//! Operations on a closed topic return [`TopicError::Closed`]; unsubscribing an
//! unknown id returns [`TopicError::NotSubscribed`]. Both are caller mistakes
//! and are reported immediately.
//!
//! ## Example
//! ```rust
//! use tidings::Topic;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), tidings::TopicError> {
//! let topic = Topic::new();
//! let mut changes = topic.subscribe().await?;
//!
//! topic.publish(1).await?;
//! topic.publish(2).await?;
//!
//! assert_eq!(changes.recv().await, Some(1));
//! assert_eq!(changes.recv().await, Some(2));
//!
//! topic.close().await?;
//! assert_eq!(changes.recv().await, None);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use crate::config::TopicConfig;
use crate::core::control::{Command, ControlLoop, Envelope};
use crate::core::registry::Registry;
use crate::error::TopicError;
use crate::message::Message;
use crate::subscribers::{
    Subscribe, SubscriberId, Subscription, SyncSubscription, forward, run_handler,
};

/// Shared state behind every clone of a [`Topic`].
struct Inner<T> {
    config: TopicConfig,
    control_tx: mpsc::UnboundedSender<Command<T>>,
    publish_tx: mpsc::Sender<Envelope<T>>,
    registry: Arc<Registry>,
    closed: CancellationToken,
    next_id: AtomicU64,
}

/// Publish/subscribe topic carrying values of type `T`.
///
/// Every subscriber receives its own clone of each published value.
pub struct Topic<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Topic<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Topic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topic")
            .field("config", &self.inner.config)
            .field("closed", &self.inner.closed.is_cancelled())
            .finish()
    }
}

impl<T> Default for Topic<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Topic<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a topic with the default [`TopicConfig`] and spawns its control loop.
    ///
    /// # Panics
    /// Panics if called outside of a Tokio runtime.
    pub fn new() -> Self {
        Self::with_config(TopicConfig::default())
    }

    /// Creates a topic with a custom configuration.
    ///
    /// # Panics
    /// Panics if called outside of a Tokio runtime.
    pub fn with_config(config: TopicConfig) -> Self {
        Self::start(config, BTreeMap::new())
    }

    /// Creates a topic whose first subscriber is `tx`, registered before the
    /// control loop starts.
    pub(crate) fn with_subscriber(
        config: TopicConfig,
        tx: mpsc::Sender<Message<T>>,
    ) -> (Self, SubscriberId) {
        let id = SubscriberId::from_raw(1);
        let topic = Self::start(config, BTreeMap::from([(id, tx)]));
        (topic, id)
    }

    fn start(
        config: TopicConfig,
        subscribers: BTreeMap<SubscriberId, mpsc::Sender<Message<T>>>,
    ) -> Self {
        let first_free = subscribers
            .keys()
            .next_back()
            .map_or(1, |id| id.as_u64() + 1);
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (publish_tx, publish_rx) = mpsc::channel(config.publish_capacity_clamped());
        let registry = Arc::new(Registry::new());
        let closed = CancellationToken::new();

        ControlLoop::spawn(
            &config,
            subscribers,
            Arc::clone(&registry),
            closed.clone(),
            control_rx,
            publish_rx,
        );

        Self {
            inner: Arc::new(Inner {
                config,
                control_tx,
                publish_tx,
                registry,
                closed,
                next_id: AtomicU64::new(first_free),
            }),
        }
    }

    /// Returns the configuration the topic was created with.
    pub fn config(&self) -> &TopicConfig {
        &self.inner.config
    }

    /// Publishes `value` without waiting for subscribers.
    ///
    /// Waits only if the publish queue is full.
    pub async fn publish(&self, value: T) -> Result<(), TopicError> {
        self.ensure_open()?;
        self.inner
            .publish_tx
            .send(Envelope {
                payload: value,
                reply: None,
            })
            .await
            .map_err(|_| TopicError::Closed)
    }

    /// Publishes `value` and waits until every current subscriber answered.
    ///
    /// The control loop bounds each delivery by the ack timeout, so with `n`
    /// subscribers this waits at most `n * ack_timeout` after fan-out starts.
    ///
    /// ### Outcome
    /// - `Ok(())`: every subscriber acked (or there were none)
    /// - `Err(Delivery)`: at least one subscriber nacked, dropped the message or was evicted
    /// - `Err(Closed)`: the topic closed before the value was fanned out
    pub async fn publish_sync(&self, value: T) -> Result<(), TopicError> {
        self.ensure_open()?;
        let (reply, outcome) = oneshot::channel();
        self.inner
            .publish_tx
            .send(Envelope {
                payload: value,
                reply: Some(reply),
            })
            .await
            .map_err(|_| TopicError::Closed)?;

        match outcome.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(errs)) => Err(TopicError::Delivery(errs)),
            Err(_) => Err(TopicError::Closed),
        }
    }

    /// Subscribes with a new channel of `subscriber_capacity` values.
    ///
    /// Values are acked on the subscriber's behalf as soon as they are queued.
    pub async fn subscribe(&self) -> Result<Subscription<T>, TopicError> {
        let (tx, rx) = mpsc::channel(self.inner.config.subscriber_capacity_clamped());
        let id = self.subscribe_to(tx).await?;
        Ok(Subscription::new(id, rx))
    }

    /// Subscribes an existing channel; the caller keeps the receiver.
    ///
    /// The channel is closed (its sender dropped) on unsubscribe or topic close.
    pub async fn subscribe_to(&self, consumer: mpsc::Sender<T>) -> Result<SubscriberId, TopicError> {
        self.ensure_open()?;
        let id = self.next_id();
        let (tx, rx) = mpsc::channel(consumer.max_capacity().max(1));
        let join = tokio::spawn(forward(id, rx, consumer));
        self.register_adapter(id, tx, join).await?;
        Ok(id)
    }

    /// Subscribes a [`Subscribe`] handler; its result acks or nacks each message.
    pub async fn subscribe_handler(
        &self,
        handler: Arc<dyn Subscribe<T>>,
    ) -> Result<SubscriberId, TopicError> {
        self.ensure_open()?;
        let id = self.next_id();
        let (tx, rx) = mpsc::channel(handler.queue_capacity().max(1));
        let join = tokio::spawn(run_handler(id, handler, rx));
        self.register_adapter(id, tx, join).await?;
        Ok(id)
    }

    /// Subscribes with acknowledged delivery; every [`Message`] must be answered.
    pub async fn subscribe_sync(&self) -> Result<SyncSubscription<T>, TopicError> {
        let (tx, rx) = mpsc::channel(self.inner.config.subscriber_capacity_clamped());
        let id = self.subscribe_sync_to(tx).await?;
        Ok(Subscription::new(id, rx))
    }

    /// Subscribes an existing channel of [`Message`]s.
    pub async fn subscribe_sync_to(
        &self,
        tx: mpsc::Sender<Message<T>>,
    ) -> Result<SubscriberId, TopicError> {
        self.ensure_open()?;
        let id = self.next_id();
        self.register(id, tx).await?;
        Ok(id)
    }

    /// Removes a subscription made with [`subscribe`](Self::subscribe),
    /// [`subscribe_to`](Self::subscribe_to) or
    /// [`subscribe_handler`](Self::subscribe_handler) and closes its channel.
    ///
    /// Values already queued for the consumer can still be read; nothing
    /// published after this returns is delivered. A subscriber the topic
    /// already evicted or pruned is reported as [`TopicError::NotSubscribed`].
    pub async fn unsubscribe(&self, id: SubscriberId) -> Result<(), TopicError> {
        self.ensure_open()?;
        if self.inner.registry.remove(id).await.is_none() {
            return Err(TopicError::NotSubscribed(id));
        }
        // the loop may already have pruned it (consumer gone, evicted)
        self.deregister(id).await.map(|_| ())
    }

    /// Removes a subscription made with [`subscribe_sync`](Self::subscribe_sync)
    /// or [`subscribe_sync_to`](Self::subscribe_sync_to) and closes its channel.
    pub async fn unsubscribe_sync(&self, id: SubscriberId) -> Result<(), TopicError> {
        self.ensure_open()?;
        if self.deregister(id).await? {
            Ok(())
        } else {
            Err(TopicError::NotSubscribed(id))
        }
    }

    /// Returns the number of live subscribers, as seen by the control loop.
    pub async fn subscriber_count(&self) -> Result<usize, TopicError> {
        self.ensure_open()?;
        let (reply, count) = oneshot::channel();
        self.send_command(Command::Count { reply })?;
        count.await.map_err(|_| TopicError::Closed)
    }

    /// Closes the topic.
    ///
    /// Waits until every subscriber channel is closed and every forwarder has
    /// exited. Pending publishes that were not fanned out yet are discarded;
    /// their `publish_sync` callers get [`TopicError::Closed`].
    pub async fn close(&self) -> Result<(), TopicError> {
        self.ensure_open()?;
        self.send_command(Command::Stop)?;
        self.inner.closed.cancelled().await;
        Ok(())
    }

    /// Returns a future that completes once the topic is closed.
    ///
    /// Does not request shutdown; see [`close`](Self::close).
    pub fn closed(&self) -> WaitForCancellationFutureOwned {
        self.inner.closed.clone().cancelled_owned()
    }

    /// Returns true once the topic is closed.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.is_cancelled()
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    async fn register_adapter(
        &self,
        id: SubscriberId,
        tx: mpsc::Sender<Message<T>>,
        join: tokio::task::JoinHandle<()>,
    ) -> Result<(), TopicError> {
        self.inner.registry.insert(id, join).await;
        if let Err(err) = self.register(id, tx).await {
            // the adapter task exits on its own: its channel sender is gone
            self.inner.registry.remove(id).await;
            return Err(err);
        }
        Ok(())
    }

    async fn register(&self, id: SubscriberId, tx: mpsc::Sender<Message<T>>) -> Result<(), TopicError> {
        let (reply, registered) = oneshot::channel();
        self.send_command(Command::Subscribe { id, tx, reply })?;
        registered.await.map_err(|_| TopicError::Closed)
    }

    async fn deregister(&self, id: SubscriberId) -> Result<bool, TopicError> {
        let (reply, removed) = oneshot::channel();
        self.send_command(Command::Unsubscribe { id, reply })?;
        removed.await.map_err(|_| TopicError::Closed)
    }

    fn send_command(&self, cmd: Command<T>) -> Result<(), TopicError> {
        self.inner
            .control_tx
            .send(cmd)
            .map_err(|_| TopicError::Closed)
    }

    fn ensure_open(&self) -> Result<(), TopicError> {
        if self.inner.closed.is_cancelled() {
            Err(TopicError::Closed)
        } else {
            Ok(())
        }
    }

    fn next_id(&self) -> SubscriberId {
        SubscriberId::from_raw(self.inner.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::error::{BoxError, DeliveryError};

    fn short_timeout() -> TopicConfig {
        TopicConfig {
            ack_timeout: Duration::from_secs(1),
            ..TopicConfig::default()
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_in_publish_order() {
        let topic = Topic::new();
        let mut sub = topic.subscribe().await.unwrap();

        topic.publish(1).await.unwrap();
        topic.publish(2).await.unwrap();

        assert_eq!(sub.recv().await, Some(1));
        assert_eq!(sub.recv().await, Some(2));
    }

    #[tokio::test]
    async fn test_every_subscriber_sees_same_order() {
        let topic = Topic::new();
        let mut a = topic.subscribe().await.unwrap();
        let mut b = topic.subscribe().await.unwrap();

        for n in 0..10 {
            topic.publish(n).await.unwrap();
        }
        for n in 0..10 {
            assert_eq!(a.recv().await, Some(n));
            assert_eq!(b.recv().await, Some(n));
        }
    }

    #[tokio::test]
    async fn test_only_values_between_subscribe_and_unsubscribe() {
        let topic = Topic::new();
        topic.publish("before").await.unwrap();

        let mut sub = topic.subscribe().await.unwrap();
        topic.publish_sync("during").await.unwrap();
        topic.unsubscribe(sub.id()).await.unwrap();
        topic.publish_sync("after").await.unwrap();

        assert_eq!(sub.recv().await, Some("during"));
        assert_eq!(sub.recv().await, None);
    }

    #[tokio::test]
    async fn test_subscribe_to_existing_channel() {
        let topic = Topic::new();
        let (tx, mut rx) = mpsc::channel(64);
        let id = topic.subscribe_to(tx).await.unwrap();

        topic.publish(String::from("hello")).await.unwrap();
        assert_eq!(rx.recv().await.as_deref(), Some("hello"));

        topic.unsubscribe(id).await.unwrap();
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_sync_waits_for_every_subscriber() {
        let topic = Topic::new();
        let acked = Arc::new(AtomicUsize::new(0));

        for delay in [10, 50] {
            let mut sub = topic.subscribe_sync().await.unwrap();
            let acked = acked.clone();
            tokio::spawn(async move {
                while let Some(msg) = sub.recv().await {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    acked.fetch_add(1, Ordering::SeqCst);
                    msg.ack();
                }
            });
        }

        topic.publish_sync(7u8).await.unwrap();
        assert_eq!(acked.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_publish_sync_without_subscribers_succeeds() {
        let topic = Topic::<u8>::new();
        assert!(topic.publish_sync(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_publish_sync_reports_nack() {
        let topic = Topic::new();
        let mut a = topic.subscribe_sync().await.unwrap();
        let mut b = topic.subscribe_sync().await.unwrap();

        tokio::spawn(async move {
            while let Some(msg) = a.recv().await {
                msg.ack();
            }
        });
        let b_id = b.id();
        tokio::spawn(async move {
            while let Some(msg) = b.recv().await {
                msg.nack("bad");
            }
        });

        let err = topic.publish_sync("x").await.unwrap_err();
        assert!(err.to_string().contains("bad"));

        let errs = err.delivery().unwrap();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs.iter().next().unwrap().subscriber(), b_id);
    }

    #[tokio::test]
    async fn test_dropped_message_is_reported() {
        let topic = Topic::new();
        let mut sub = topic.subscribe_sync().await.unwrap();
        tokio::spawn(async move {
            while let Some(msg) = sub.recv().await {
                drop(msg);
            }
        });

        let err = topic.publish_sync(1).await.unwrap_err();
        let errs = err.delivery().unwrap();
        assert!(matches!(
            errs.iter().next(),
            Some(DeliveryError::Dropped { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stuck_subscriber_is_evicted() {
        let topic = Topic::with_config(short_timeout());
        let mut stuck = topic.subscribe_sync().await.unwrap();
        let mut healthy = topic.subscribe().await.unwrap();

        let err = topic.publish_sync(1).await.unwrap_err();
        let errs = err.delivery().unwrap().iter().collect::<Vec<_>>();
        assert_eq!(errs.len(), 1);
        assert!(matches!(
            errs[0],
            DeliveryError::AckTimeout { subscriber, timeout }
                if *subscriber == stuck.id() && *timeout == Duration::from_secs(1)
        ));

        // the loop moved on to the next subscriber and dropped the stuck one
        assert_eq!(healthy.recv().await, Some(1));
        assert_eq!(topic.subscriber_count().await.unwrap(), 1);

        let late = stuck.recv().await.unwrap();
        late.ack();
        assert!(stuck.recv().await.is_none());

        topic.publish_sync(2).await.unwrap();
        assert_eq!(healthy.recv().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_sync_outlasts_one_ack_timeout() {
        let topic = Topic::new();
        for _ in 0..2 {
            let mut sub = topic.subscribe_sync().await.unwrap();
            tokio::spawn(async move {
                while let Some(msg) = sub.recv().await {
                    tokio::time::sleep(Duration::from_secs(20)).await;
                    msg.ack();
                }
            });
        }

        // 40s in total, each subscriber well within its own 30s
        topic.publish_sync("slow").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_sync_reports_nack_next_to_eviction() {
        let topic = Topic::with_config(short_timeout());
        let mut rejecting = topic.subscribe_sync().await.unwrap();
        let silent = topic.subscribe_sync().await.unwrap();

        let rejecting_id = rejecting.id();
        tokio::spawn(async move {
            while let Some(msg) = rejecting.recv().await {
                msg.nack("bad");
            }
        });

        let err = topic.publish_sync(1).await.unwrap_err();
        assert!(err.to_string().contains("bad"));

        let errs = err.delivery().unwrap().iter().collect::<Vec<_>>();
        assert_eq!(errs.len(), 2);
        assert!(matches!(errs[0], DeliveryError::Nack { subscriber, .. } if *subscriber == rejecting_id));
        assert!(matches!(
            errs[1],
            DeliveryError::AckTimeout { subscriber, .. } if *subscriber == silent.id()
        ));
    }

    #[tokio::test]
    async fn test_dropped_subscriptions_leave_registry() {
        let topic = Topic::new();
        for n in 0..50 {
            drop(topic.subscribe().await.unwrap());
            topic.publish_sync(n).await.unwrap();
        }
        // the last dropped subscription is noticed on the next publish
        topic.publish_sync(50).await.unwrap();

        assert_eq!(topic.subscriber_count().await.unwrap(), 0);
        assert!(topic.inner.registry.ids().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_evicted_forwarder_closes_consumer() {
        let topic = Topic::with_config(short_timeout());
        let (tx, mut rx) = mpsc::channel(1);
        let id = topic.subscribe_to(tx).await.unwrap();

        // the first value fills the consumer channel, the second blocks the forwarder
        topic.publish_sync(1).await.unwrap();
        let err = topic.publish_sync(2).await.unwrap_err();
        assert_eq!(err.delivery().unwrap().len(), 1);

        assert!(topic.inner.registry.ids().await.is_empty());
        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, None);
        assert!(matches!(
            topic.unsubscribe(id).await,
            Err(TopicError::NotSubscribed(_))
        ));
    }

    #[tokio::test]
    async fn test_dropped_consumer_is_pruned() {
        let topic = Topic::new();
        let sub = topic.subscribe().await.unwrap();
        assert_eq!(topic.subscriber_count().await.unwrap(), 1);
        drop(sub);

        topic.publish_sync(1).await.unwrap();
        topic.publish_sync(2).await.unwrap();
        assert_eq!(topic.subscriber_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_handler_subscription() {
        struct Even;

        #[async_trait]
        impl Subscribe<u32> for Even {
            async fn on_message(&self, value: &u32) -> Result<(), BoxError> {
                if value % 2 == 0 {
                    Ok(())
                } else {
                    Err(format!("{value} is odd").into())
                }
            }
        }

        let topic = Topic::<u32>::new();
        let id = topic.subscribe_handler(Arc::new(Even)).await.unwrap();

        topic.publish_sync(2).await.unwrap();
        let err = topic.publish_sync(3).await.unwrap_err();
        assert!(err.to_string().contains("3 is odd"));

        topic.unsubscribe(id).await.unwrap();
        topic.publish_sync(3).await.unwrap();
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_id() {
        let topic = Topic::<u8>::new();
        let sync = topic.subscribe_sync().await.unwrap();
        let plain = topic.subscribe().await.unwrap();

        // each kind is removed through its own call
        assert!(matches!(
            topic.unsubscribe(sync.id()).await,
            Err(TopicError::NotSubscribed(id)) if id == sync.id()
        ));
        topic.unsubscribe_sync(sync.id()).await.unwrap();
        assert!(matches!(
            topic.unsubscribe_sync(sync.id()).await,
            Err(TopicError::NotSubscribed(_))
        ));

        topic.unsubscribe(plain.id()).await.unwrap();
        assert!(matches!(
            topic.unsubscribe(plain.id()).await,
            Err(TopicError::NotSubscribed(_))
        ));
    }

    #[tokio::test]
    async fn test_close_ends_streams_and_fails_fast() {
        let topic = Topic::new();
        let mut plain = topic.subscribe().await.unwrap();
        let mut sync = topic.subscribe_sync().await.unwrap();
        let (tx, mut raw) = mpsc::channel(64);
        let raw_id = topic.subscribe_to(tx).await.unwrap();

        topic.close().await.unwrap();
        assert!(topic.is_closed());

        assert_eq!(plain.recv().await, None);
        assert!(sync.recv().await.is_none());
        assert_eq!(raw.recv().await, None);

        assert!(matches!(topic.publish("x").await, Err(TopicError::Closed)));
        assert!(matches!(topic.publish_sync("x").await, Err(TopicError::Closed)));
        assert!(matches!(topic.subscribe().await, Err(TopicError::Closed)));
        assert!(matches!(topic.subscribe_sync().await, Err(TopicError::Closed)));
        assert!(matches!(topic.unsubscribe(raw_id).await, Err(TopicError::Closed)));
        assert!(matches!(topic.subscriber_count().await, Err(TopicError::Closed)));
        assert!(matches!(topic.close().await, Err(TopicError::Closed)));
    }

    #[tokio::test]
    async fn test_closed_signal_is_shared_by_clones() {
        let topic = Topic::<u8>::new();
        let other = topic.clone();
        let waiter = tokio::spawn(other.closed());

        topic.close().await.unwrap();
        waiter.await.unwrap();
        assert!(other.is_closed());
    }

    #[tokio::test]
    async fn test_dropping_every_handle_shuts_down() {
        let topic = Topic::new();
        let mut sub = topic.subscribe().await.unwrap();
        let closed = topic.closed();
        topic.publish_sync(1).await.unwrap();
        drop(topic);

        closed.await;
        assert_eq!(sub.recv().await, Some(1));
        assert_eq!(sub.recv().await, None);
    }
}
