//! # Control loop: the single owner of a topic's subscriber set.
//!
//! Every state change and every fan-out of a topic runs on one task. The loop
//! selects over two queues:
//!
//! ```text
//! subscribe / unsubscribe / count / stop ──► [control queue, unbounded] ──┐
//!                                                                        ├──► ControlLoop::run()
//! publish / publish_sync ─────────────────► [publish queue, bounded] ────┘        │
//!                                                                                 ▼
//!                                                    BTreeMap<SubscriberId, Sender<Message<T>>>
//! ```
//!
//! ## Rules
//! - The control queue is polled first (`biased`), so a command enqueued before
//!   a publish is always applied before that publish is fanned out.
//! - Fan-out visits subscribers in id order (= registration order), one at a
//!   time; each gets a fresh [`Message`] and up to `ack_timeout` to receive and
//!   answer it.
//! - A subscriber that misses the deadline is evicted: its channel is closed and
//!   the publish reports [`DeliveryError::AckTimeout`].
//! - A subscriber whose receiver is gone is pruned silently.
//! - Evicted and pruned ids leave the forwarder registry too; their adapter
//!   task is aborted, which closes a consumer channel it was blocked on.
//! - Stop (or every handle dropped) closes all channels, joins the forwarders
//!   and fires the closed signal. Nothing runs after that.
//!
//! ## State machine
//! ```text
//! Running ──(stop)──► Closing ──(channels closed, forwarders joined)──► Closed
//! ```

use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::TopicConfig;
use crate::core::registry::Registry;
use crate::error::{DeliveryError, DeliveryErrors};
use crate::message::Message;
use crate::subscribers::SubscriberId;

/// Control operations understood by the loop.
pub(crate) enum Command<T> {
    /// Adds `tx` to the subscriber set under `id`.
    Subscribe {
        id: SubscriberId,
        tx: mpsc::Sender<Message<T>>,
        reply: oneshot::Sender<()>,
    },
    /// Removes `id` and closes its channel; replies whether it was present.
    Unsubscribe {
        id: SubscriberId,
        reply: oneshot::Sender<bool>,
    },
    /// Replies with the number of live subscribers.
    Count { reply: oneshot::Sender<usize> },
    /// Shuts the topic down.
    Stop,
}

/// Aggregate outcome delivered back to a synchronous publisher.
pub(crate) type PublishOutcome = Result<(), DeliveryErrors>;

/// A published value on its way to the loop.
pub(crate) struct Envelope<T> {
    pub(crate) payload: T,
    /// Present for `publish_sync`; fire-and-forget publishes skip the reply.
    pub(crate) reply: Option<oneshot::Sender<PublishOutcome>>,
}

/// Lifecycle of a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TopicState {
    Running,
    Closing,
    Closed,
}

/// Result of delivering one message to one subscriber.
enum Delivery {
    Acked,
    Failed(DeliveryError),
    Gone,
}

/// Task-local state of the control loop.
pub(crate) struct ControlLoop<T> {
    ack_timeout: Duration,
    subscribers: BTreeMap<SubscriberId, mpsc::Sender<Message<T>>>,
    registry: Arc<Registry>,
    closed: CancellationToken,
    state: TopicState,
}

impl<T> ControlLoop<T>
where
    T: Clone + Send + 'static,
{
    /// Spawns the loop on the current Tokio runtime, starting with `subscribers`.
    pub(crate) fn spawn(
        config: &TopicConfig,
        subscribers: BTreeMap<SubscriberId, mpsc::Sender<Message<T>>>,
        registry: Arc<Registry>,
        closed: CancellationToken,
        control_rx: mpsc::UnboundedReceiver<Command<T>>,
        publish_rx: mpsc::Receiver<Envelope<T>>,
    ) -> JoinHandle<()> {
        let me = Self {
            ack_timeout: config.ack_timeout_clamped(),
            subscribers,
            registry,
            closed,
            state: TopicState::Running,
        };
        tokio::spawn(me.run(control_rx, publish_rx))
    }

    async fn run(
        mut self,
        mut control_rx: mpsc::UnboundedReceiver<Command<T>>,
        mut publish_rx: mpsc::Receiver<Envelope<T>>,
    ) {
        loop {
            tokio::select! {
                biased;

                cmd = control_rx.recv() => match cmd {
                    Some(cmd) => {
                        if self.handle_command(cmd).is_break() {
                            debug!("stop requested");
                            break;
                        }
                    }
                    None => {
                        debug!("all topic handles dropped");
                        break;
                    }
                },
                Some(envelope) = publish_rx.recv() => self.fan_out(envelope).await,
            }
        }

        self.shutdown(control_rx, publish_rx).await;
    }

    /// Applies a subscriber-set change; breaks on stop.
    fn handle_command(&mut self, cmd: Command<T>) -> ControlFlow<()> {
        match cmd {
            Command::Subscribe { id, tx, reply } => {
                self.subscribers.insert(id, tx);
                debug!(subscriber = %id, total = self.subscribers.len(), "subscribed");
                let _ = reply.send(());
            }
            Command::Unsubscribe { id, reply } => {
                // dropping the sender closes the subscriber's channel
                let removed = self.subscribers.remove(&id).is_some();
                debug!(subscriber = %id, removed, "unsubscribed");
                let _ = reply.send(removed);
            }
            Command::Count { reply } => {
                let _ = reply.send(self.subscribers.len());
            }
            Command::Stop => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Delivers one published value to every subscriber and reports back.
    async fn fan_out(&mut self, envelope: Envelope<T>) {
        let Envelope { payload, reply } = envelope;
        let mut errors = Vec::new();
        let mut evicted = Vec::new();

        for (&id, tx) in &self.subscribers {
            match deliver(id, tx, payload.clone(), self.ack_timeout).await {
                Delivery::Acked => {}
                Delivery::Failed(err) => {
                    if matches!(err, DeliveryError::AckTimeout { .. }) {
                        warn!(subscriber = %id, timeout = ?self.ack_timeout, "no ack in time; evicting subscriber");
                        evicted.push(id);
                    }
                    errors.push(err);
                }
                Delivery::Gone => {
                    debug!(subscriber = %id, "receiver dropped; pruning subscriber");
                    evicted.push(id);
                }
            }
        }

        for id in evicted {
            self.subscribers.remove(&id);
            if let Some(join) = self.registry.remove(id).await {
                join.abort();
            }
        }

        if let Some(reply) = reply {
            let outcome = match DeliveryErrors::join(errors) {
                Some(errs) => Err(errs),
                None => Ok(()),
            };
            // the publisher may have been cancelled
            let _ = reply.send(outcome);
        }
    }

    /// Closes every channel, joins the forwarders, fires the closed signal.
    async fn shutdown(
        mut self,
        control_rx: mpsc::UnboundedReceiver<Command<T>>,
        publish_rx: mpsc::Receiver<Envelope<T>>,
    ) {
        self.state = TopicState::Closing;
        let remaining = self.subscribers.len();
        self.subscribers.clear();

        // pending commands and publishes are dropped with their reply slots
        drop(control_rx);
        drop(publish_rx);

        self.registry.drain_and_join(self.ack_timeout).await;

        self.state = TopicState::Closed;
        self.closed.cancel();
        debug!(remaining, state = ?self.state, "topic closed");
    }
}

/// Sends `payload` to one subscriber and waits for its answer.
async fn deliver<T>(
    id: SubscriberId,
    tx: &mpsc::Sender<Message<T>>,
    payload: T,
    ack_timeout: Duration,
) -> Delivery {
    let (msg, ack) = Message::new(payload);

    let attempt = async {
        if tx.send(msg).await.is_err() {
            return Delivery::Gone;
        }
        match ack.await {
            Ok(Ok(())) => Delivery::Acked,
            Ok(Err(source)) => Delivery::Failed(DeliveryError::Nack {
                subscriber: id,
                source,
            }),
            Err(_) => {
                warn!(subscriber = %id, "message dropped without ack");
                Delivery::Failed(DeliveryError::Dropped { subscriber: id })
            }
        }
    };

    match tokio::time::timeout(ack_timeout, attempt).await {
        Ok(delivery) => delivery,
        Err(_) => Delivery::Failed(DeliveryError::AckTimeout {
            subscriber: id,
            timeout: ack_timeout,
        }),
    }
}
