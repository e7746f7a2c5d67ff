//! Fan-out of one merged view to every registered subscriber.
//!
//! The update envelope is serialized exactly once per call and the same
//! frame is handed to each member. Delivery is isolated per subscriber: a
//! closed subscriber is removed, a lagging one skips this frame (and is
//! removed once it has lagged too long), and neither affects delivery to
//! the rest.

use axum::extract::ws::Utf8Bytes;
use blocktree_types::{Envelope, EnvelopeKind, ForkChoiceMap};
use tracing::{debug, warn};

use crate::error::PublishError;
use crate::registry::{PushError, SubscriberRegistry};

/// Per-call delivery counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Subscribers the frame was queued for.
    pub delivered: usize,
    /// Subscribers found closed and removed.
    pub pruned: usize,
    /// Subscribers that skipped this frame because their queue was full.
    pub lagging: usize,
}

/// Push `map` as a `fork_choice_update` envelope to every member.
///
/// An empty map is not sent: subscribers would learn nothing from it.
pub fn broadcast(
    registry: &SubscriberRegistry,
    map: &ForkChoiceMap,
) -> Result<BroadcastReport, PublishError> {
    if map.is_empty() {
        return Ok(BroadcastReport::default());
    }

    let frame = Utf8Bytes::from(Envelope::new(EnvelopeKind::ForkChoiceUpdate, map).to_json()?);

    let mut report = BroadcastReport::default();
    for subscriber in registry.members() {
        match subscriber.push(&frame) {
            Ok(()) => report.delivered = report.delivered.saturating_add(1),
            Err(PushError::Closed) => {
                registry.remove(subscriber.id());
                report.pruned = report.pruned.saturating_add(1);
            }
            Err(PushError::Lagging) => {
                warn!(subscriber = %subscriber.id(), "Subscriber lagging, update skipped");
                report.lagging = report.lagging.saturating_add(1);
            }
        }
    }

    debug!(
        sources = map.len(),
        delivered = report.delivered,
        pruned = report.pruned,
        lagging = report.lagging,
        "Fork choice update broadcast"
    );

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use blocktree_types::{Snapshot, SourceId, SubscriberId};

    use super::*;
    use crate::registry::{ChannelSubscriber, LAG_LIMIT, Subscriber};

    /// Subscriber whose push always fails with a fixed error.
    struct BrokenSubscriber {
        id: SubscriberId,
        error: PushError,
        attempts: AtomicUsize,
    }

    impl BrokenSubscriber {
        fn new(error: PushError) -> Self {
            Self {
                id: SubscriberId::new(),
                error,
                attempts: AtomicUsize::new(0),
            }
        }
    }

    impl Subscriber for BrokenSubscriber {
        fn id(&self) -> SubscriberId {
            self.id
        }

        fn push(&self, _frame: &Utf8Bytes) -> Result<(), PushError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(self.error)
        }
    }

    fn one_source_map() -> ForkChoiceMap {
        [(SourceId::new("http://a:1"), Snapshot::default())]
            .into_iter()
            .collect()
    }

    #[test]
    fn failing_subscriber_does_not_block_others() {
        let registry = SubscriberRegistry::new();
        let mut receivers = Vec::new();
        for _ in 0..4 {
            let (subscriber, rx) = ChannelSubscriber::new(4);
            registry.add(Arc::new(subscriber));
            receivers.push(rx);
        }
        let broken = Arc::new(BrokenSubscriber::new(PushError::Closed));
        registry.add(Arc::clone(&broken) as Arc<dyn Subscriber>);

        let report = broadcast(&registry, &one_source_map()).unwrap();

        assert_eq!(report.delivered, 4);
        assert_eq!(report.pruned, 1);
        assert!(!registry.contains(broken.id()));
        for rx in &mut receivers {
            let frame = rx.try_recv().unwrap();
            let value: serde_json::Value = serde_json::from_str(frame.as_str()).unwrap();
            assert_eq!(value["type"], "fork_choice_update");
            assert!(value["data"]["http://a:1"].is_object());
        }
    }

    #[test]
    fn closed_subscriber_is_pruned_within_one_broadcast() {
        let registry = SubscriberRegistry::new();
        let (subscriber, rx) = ChannelSubscriber::new(4);
        let id = subscriber.id();
        registry.add(Arc::new(subscriber));

        drop(rx);
        assert!(registry.contains(id));

        let report = broadcast(&registry, &one_source_map()).unwrap();
        assert_eq!(report.pruned, 1);
        assert!(!registry.contains(id));
    }

    #[test]
    fn lagging_subscriber_stays_registered() {
        let registry = SubscriberRegistry::new();
        let lagging = Arc::new(BrokenSubscriber::new(PushError::Lagging));
        registry.add(Arc::clone(&lagging) as Arc<dyn Subscriber>);

        let report = broadcast(&registry, &one_source_map()).unwrap();
        assert_eq!(report.lagging, 1);
        assert!(registry.contains(lagging.id()));
    }

    #[test]
    fn stalled_subscriber_is_pruned_after_lag_limit() {
        let registry = SubscriberRegistry::new();
        let (stalled, _stalled_rx) = ChannelSubscriber::new(1);
        let stalled_id = stalled.id();
        registry.add(Arc::new(stalled));
        let (healthy, mut healthy_rx) = ChannelSubscriber::new(1);
        registry.add(Arc::new(healthy));

        broadcast(&registry, &one_source_map()).unwrap();
        healthy_rx.try_recv().unwrap();
        for _ in 1..LAG_LIMIT {
            let report = broadcast(&registry, &one_source_map()).unwrap();
            assert_eq!(report.lagging, 1);
            assert!(registry.contains(stalled_id));
            healthy_rx.try_recv().unwrap();
        }

        let report = broadcast(&registry, &one_source_map()).unwrap();
        assert_eq!(report.pruned, 1);
        assert_eq!(report.delivered, 1);
        assert!(!registry.contains(stalled_id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn empty_map_is_not_sent() {
        let registry = SubscriberRegistry::new();
        let broken = Arc::new(BrokenSubscriber::new(PushError::Closed));
        registry.add(Arc::clone(&broken) as Arc<dyn Subscriber>);

        let report = broadcast(&registry, &ForkChoiceMap::new()).unwrap();
        assert_eq!(report, BroadcastReport::default());
        assert_eq!(broken.attempts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn every_subscriber_receives_identical_frame() {
        let registry = SubscriberRegistry::new();
        let (a, mut rx_a) = ChannelSubscriber::new(1);
        let (b, mut rx_b) = ChannelSubscriber::new(1);
        registry.add(Arc::new(a));
        registry.add(Arc::new(b));

        broadcast(&registry, &one_source_map()).unwrap();

        let frame_a = rx_a.try_recv().unwrap();
        let frame_b = rx_b.try_recv().unwrap();
        assert_eq!(frame_a.as_str(), frame_b.as_str());
    }
}
