//! Change propagation bus.
//!
//! A single process-wide publish/subscribe channel that redistributes
//! "reservation changed" events to any number of read-side views. Events
//! carry only the reservation id and the new status; subscribers re-query
//! for detail. Publishing is fire-and-forget: there is no delivery
//! guarantee, nothing is persisted, and an event published with no
//! subscriber listening is simply lost.

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::reservations::ReservationStatus;

const DEFAULT_CAPACITY: usize = 64;

/// Minimal payload of a reservation mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReservationChange {
    pub reservation_id: Uuid,
    pub status: ReservationStatus,
}

#[derive(Clone, Debug)]
pub struct ChangeBus {
    tx: broadcast::Sender<ReservationChange>,
}

impl ChangeBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self { tx }
    }

    /// Publishes a change without blocking.
    ///
    /// A send error only means no subscriber is currently listening,
    /// which is an acceptable outcome for this bus.
    pub fn publish(&self, change: ReservationChange) {
        if self.tx.send(change).is_err() {
            tracing::debug!(
                reservation_id = %change.reservation_id,
                "reservation change published with no subscribers"
            );
        }
    }

    /// Registers a subscriber. Dropping the returned feed deregisters it.
    pub fn subscribe(&self) -> ChangeFeed {
        ChangeFeed {
            rx: self.tx.subscribe(),
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A live subscription to reservation changes.
pub struct ChangeFeed {
    rx: broadcast::Receiver<ReservationChange>,
}

impl ChangeFeed {
    /// Next change, or `None` once the bus is gone. A slow consumer that
    /// misses events skips ahead instead of failing; views re-fetch on
    /// mount anyway.
    pub async fn recv(&mut self) -> Option<ReservationChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(status: ReservationStatus) -> ReservationChange {
        ReservationChange {
            reservation_id: Uuid::new_v4(),
            status,
        }
    }

    #[test]
    fn publish_without_subscribers_does_not_panic_or_block() {
        let bus = ChangeBus::new();
        bus.publish(change(ReservationStatus::Pending));
        bus.publish(change(ReservationStatus::Approved));
    }

    #[tokio::test]
    async fn subscribers_receive_published_changes() {
        let bus = ChangeBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        let published = change(ReservationStatus::Approved);
        bus.publish(published);

        assert_eq!(first.recv().await, Some(published));
        assert_eq!(second.recv().await, Some(published));
    }

    #[tokio::test]
    async fn dropping_a_feed_unsubscribes() {
        let bus = ChangeBus::new();
        let feed = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        drop(feed);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
