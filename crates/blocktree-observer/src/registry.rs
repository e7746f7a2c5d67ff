//! The set of live push-channel subscribers.
//!
//! Members are stored behind a sharded concurrent map so connects and
//! disconnects never wait on a broadcast in progress. A broadcast works on
//! [`SubscriberRegistry::members`], a point-in-time copy, and is free to
//! remove members while it iterates.
//!
//! The registry never owns a connection. A [`ChannelSubscriber`] holds only
//! the sending half of its connection's outbound queue; when the connection
//! task ends, the queue closes, and the next push discovers it. A connection
//! that stops draining its queue altogether is treated as closed once it has
//! missed [`LAG_LIMIT`] updates in a row.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::ws::Utf8Bytes;
use blocktree_types::SubscriberId;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

/// Outbound queue depth per connection.
///
/// A connection more than this many frames behind is lagging and misses
/// updates until it drains.
pub const OUTBOUND_CAPACITY: usize = 16;

/// Consecutive skipped frames after which a lagging subscriber is dropped.
pub const LAG_LIMIT: usize = 3;

/// Why a push to one subscriber did not go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PushError {
    /// The subscriber's connection is gone. It should be removed.
    #[error("subscriber closed")]
    Closed,

    /// The subscriber is alive but its queue is full. This frame is dropped.
    #[error("subscriber lagging")]
    Lagging,
}

/// One live push target.
pub trait Subscriber: Send + Sync {
    /// Stable identity used for registration and removal.
    fn id(&self) -> SubscriberId;

    /// Hand one serialized frame to the subscriber without waiting.
    fn push(&self, frame: &Utf8Bytes) -> Result<(), PushError>;
}

/// Subscriber backed by a bounded queue drained by its connection task.
#[derive(Debug)]
pub struct ChannelSubscriber {
    id: SubscriberId,
    tx: mpsc::Sender<Utf8Bytes>,
    skipped: AtomicUsize,
}

impl ChannelSubscriber {
    /// Create a subscriber and the receiving half its connection drains.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Utf8Bytes>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                id: SubscriberId::new(),
                tx,
                skipped: AtomicUsize::new(0),
            },
            rx,
        )
    }
}

impl Subscriber for ChannelSubscriber {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn push(&self, frame: &Utf8Bytes) -> Result<(), PushError> {
        match self.tx.try_send(frame.clone()) {
            Ok(()) => {
                self.skipped.store(0, Ordering::Relaxed);
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(PushError::Closed),
            Err(mpsc::error::TrySendError::Full(_)) => {
                let skipped = self.skipped.fetch_add(1, Ordering::Relaxed).saturating_add(1);
                if skipped >= LAG_LIMIT {
                    Err(PushError::Closed)
                } else {
                    Err(PushError::Lagging)
                }
            }
        }
    }
}

/// Concurrent set of subscribers keyed by [`SubscriberId`].
#[derive(Default)]
pub struct SubscriberRegistry {
    members: DashMap<SubscriberId, Arc<dyn Subscriber>>,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber. Re-adding an id replaces the previous entry.
    pub fn add(&self, subscriber: Arc<dyn Subscriber>) {
        let id = subscriber.id();
        self.members.insert(id, subscriber);
        debug!(subscriber = %id, members = self.members.len(), "Subscriber registered");
    }

    /// Remove a subscriber. Removing an absent id is a no-op.
    ///
    /// Returns whether an entry was removed.
    pub fn remove(&self, id: SubscriberId) -> bool {
        let removed = self.members.remove(&id).is_some();
        if removed {
            debug!(subscriber = %id, members = self.members.len(), "Subscriber removed");
        }
        removed
    }

    /// Point-in-time copy of the current members.
    ///
    /// Safe to iterate while other tasks add or remove members.
    pub fn members(&self) -> Vec<Arc<dyn Subscriber>> {
        self.members
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Whether `id` is currently registered.
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.members.contains_key(&id)
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Add a subscriber and return a guard that removes it when dropped.
    ///
    /// Connection tasks hold the guard for their whole lifetime, so the
    /// entry goes away on every exit path, including errors and panics.
    pub fn register(self: &Arc<Self>, subscriber: Arc<dyn Subscriber>) -> Registration {
        let id = subscriber.id();
        self.add(subscriber);
        Registration {
            registry: Arc::clone(self),
            id,
        }
    }
}

/// Removes its subscriber from the registry on drop.
pub struct Registration {
    registry: Arc<SubscriberRegistry>,
    id: SubscriberId,
}

impl Registration {
    /// Identity of the registered subscriber.
    pub const fn id(&self) -> SubscriberId {
        self.id
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}
