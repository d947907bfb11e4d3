//! # Forwarder registry.
//!
//! Maps the id of every adapter-backed subscription (fire-and-forget and
//! handler) to the task that feeds it. Sync subscriptions never appear here.
//!
//! ## Rules
//! - Entries are inserted by `subscribe*` calls on caller tasks, before the
//!   subscribe command reaches the control loop.
//! - `unsubscribe` removes the entry; a missing entry means the id is not a
//!   live adapter subscription of this topic.
//! - The control loop removes the entry of every subscriber it evicts or prunes.
//! - On stop the control loop drains the registry and joins every forwarder
//!   under one shared deadline, so consumers have observed end-of-stream when
//!   `close()` returns.

use std::collections::HashMap;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::subscribers::SubscriberId;

/// Side-table of adapter tasks, guarded independently of the control loop.
pub(crate) struct Registry {
    forwarders: RwLock<HashMap<SubscriberId, JoinHandle<()>>>,
}

impl Registry {
    /// Creates an empty registry.
    pub(crate) fn new() -> Self {
        Self {
            forwarders: RwLock::new(HashMap::new()),
        }
    }

    /// Records the forwarder task of `id`.
    pub(crate) async fn insert(&self, id: SubscriberId, join: JoinHandle<()>) {
        self.forwarders.write().await.insert(id, join);
    }

    /// Atomically removes the entry of `id`.
    ///
    /// The returned handle may be dropped; the forwarder exits on its own once
    /// the control loop drops its channel.
    pub(crate) async fn remove(&self, id: SubscriberId) -> Option<JoinHandle<()>> {
        self.forwarders.write().await.remove(&id)
    }

    /// Returns sorted list of registered ids.
    #[cfg(test)]
    pub(crate) async fn ids(&self) -> Vec<SubscriberId> {
        let mut ids: Vec<SubscriberId> = self.forwarders.read().await.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Empties the registry and waits for every forwarder to exit.
    ///
    /// Must run after the delivery channels were dropped. `grace` bounds the
    /// whole drain; forwarders still running when it expires (e.g. blocked on
    /// a full consumer channel) are aborted.
    pub(crate) async fn drain_and_join(&self, grace: Duration) {
        let mut handles: Vec<(SubscriberId, JoinHandle<()>)> = {
            let mut forwarders = self.forwarders.write().await;
            forwarders.drain().collect()
        };

        let joins = join_all(handles.iter_mut().map(|(_, join)| join));
        let joined = tokio::time::timeout(grace, joins).await;
        match joined {
            Ok(results) => {
                for ((id, _), result) in handles.iter().zip(results) {
                    if let Err(err) = result {
                        warn!(subscriber = %id, error = %err, "forwarder task failed");
                    }
                }
            }
            Err(_) => {
                for (id, join) in handles.iter().filter(|(_, join)| !join.is_finished()) {
                    warn!(subscriber = %id, ?grace, "forwarder did not exit in time; aborting");
                    join.abort();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;
    use tokio::time::Instant;

    fn id(n: u64) -> SubscriberId {
        SubscriberId::from_raw(n)
    }

    #[tokio::test]
    async fn test_insert_remove() {
        let registry = Registry::new();
        registry.insert(id(2), tokio::spawn(async {})).await;
        registry.insert(id(1), tokio::spawn(async {})).await;
        assert_eq!(registry.ids().await, vec![id(1), id(2)]);

        assert!(registry.remove(id(1)).await.is_some());
        assert!(registry.remove(id(1)).await.is_none());
        assert_eq!(registry.ids().await, vec![id(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_shares_one_deadline() {
        let registry = Registry::new();
        registry.insert(id(1), tokio::spawn(async {})).await;

        // each stuck task holds a sender that is dropped when it is aborted
        let mut aborted = Vec::new();
        for n in [2, 3] {
            let (guard, dropped) = oneshot::channel::<()>();
            let stuck = tokio::spawn(async move {
                let _guard = guard;
                futures::future::pending::<()>().await;
            });
            registry.insert(id(n), stuck).await;
            aborted.push(dropped);
        }

        let started = Instant::now();
        registry.drain_and_join(Duration::from_secs(1)).await;
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(1) && waited < Duration::from_secs(2));
        assert!(registry.ids().await.is_empty());

        for dropped in aborted {
            assert!(dropped.await.is_err());
        }
    }
}
