use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Instant;

use swipecast_protocol::event::CastStatusEvent;
use swipecast_protocol::ids::CastAttemptId;
use tokio::sync::broadcast;

use crate::envelope::CastEventEnvelope;

pub const DEFAULT_ATTEMPT_BUFFER_CAPACITY: usize = 16;
pub const DEFAULT_GLOBAL_BUFFER_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastEventBusConfig {
    pub attempt_buffer_capacity: usize,
    pub global_buffer_capacity: usize,
}

impl Default for CastEventBusConfig {
    fn default() -> Self {
        Self {
            attempt_buffer_capacity: DEFAULT_ATTEMPT_BUFFER_CAPACITY,
            global_buffer_capacity: DEFAULT_GLOBAL_BUFFER_CAPACITY,
        }
    }
}

/// Broadcast bus keyed by attempt id. Subscribers filter on the attempt and
/// session generation carried in the envelope, which is how late results
/// from a reset session are ignored safely.
#[derive(Debug)]
pub struct CastEventBus {
    next_sequence: AtomicU64,
    boot_instant: Instant,
    config: CastEventBusConfig,
    attempt_senders: RwLock<HashMap<CastAttemptId, broadcast::Sender<CastEventEnvelope>>>,
    global_sender: broadcast::Sender<CastEventEnvelope>,
}

impl Default for CastEventBus {
    fn default() -> Self {
        Self::new(CastEventBusConfig::default())
    }
}

impl CastEventBus {
    pub fn new(config: CastEventBusConfig) -> Self {
        assert!(
            config.attempt_buffer_capacity > 0,
            "attempt_buffer_capacity must be greater than 0"
        );
        assert!(
            config.global_buffer_capacity > 0,
            "global_buffer_capacity must be greater than 0"
        );

        let (global_sender, _global_receiver) = broadcast::channel(config.global_buffer_capacity);
        Self {
            next_sequence: AtomicU64::new(0),
            boot_instant: Instant::now(),
            config,
            attempt_senders: RwLock::new(HashMap::new()),
            global_sender,
        }
    }

    pub fn subscribe_attempt(
        &self,
        attempt_id: CastAttemptId,
    ) -> broadcast::Receiver<CastEventEnvelope> {
        if let Some(sender) = self.attempt_sender(attempt_id) {
            return sender.subscribe();
        }

        let mut attempt_senders = self
            .attempt_senders
            .write()
            .expect("cast eventbus attempt sender lock poisoned");
        let sender = attempt_senders.entry(attempt_id).or_insert_with(|| {
            let (sender, _receiver) = broadcast::channel(self.config.attempt_buffer_capacity);
            sender
        });
        sender.subscribe()
    }

    pub fn subscribe_all(&self) -> broadcast::Receiver<CastEventEnvelope> {
        self.global_sender.subscribe()
    }

    pub fn remove_attempt(&self, attempt_id: CastAttemptId) -> bool {
        let mut attempt_senders = self
            .attempt_senders
            .write()
            .expect("cast eventbus attempt sender lock poisoned");
        attempt_senders.remove(&attempt_id).is_some()
    }

    pub fn publish(&self, event: CastStatusEvent) -> CastEventEnvelope {
        let envelope = CastEventEnvelope {
            attempt_id: event.attempt_id,
            sequence: self.next_sequence(),
            received_at_monotonic_nanos: self.monotonic_nanos_since_bus_bootstrap(),
            event,
        };

        let attempt_sender = self.attempt_sender(envelope.attempt_id);
        if let Some(sender) = attempt_sender.as_ref() {
            if sender.receiver_count() > 0 {
                let _ = sender.send(envelope.clone());
            }
        }
        if self.global_sender.receiver_count() > 0 {
            let _ = self.global_sender.send(envelope.clone());
        }

        envelope
    }

    fn attempt_sender(
        &self,
        attempt_id: CastAttemptId,
    ) -> Option<broadcast::Sender<CastEventEnvelope>> {
        let attempt_senders = self
            .attempt_senders
            .read()
            .expect("cast eventbus attempt sender lock poisoned");
        attempt_senders.get(&attempt_id).cloned()
    }

    fn next_sequence(&self) -> u64 {
        let mut current = self.next_sequence.load(Ordering::Relaxed);
        loop {
            let next = current
                .checked_add(1)
                .expect("cast event sequence exhausted");
            match self.next_sequence.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(observed) => current = observed,
            }
        }
    }

    fn monotonic_nanos_since_bus_bootstrap(&self) -> u64 {
        let nanos = self.boot_instant.elapsed().as_nanos();
        u64::try_from(nanos).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use swipecast_protocol::event::{CastAttemptStatus, CastStatusEvent};
    use swipecast_protocol::ids::ItemId;
    use tokio::sync::broadcast::error::RecvError;
    use tokio::time::timeout;

    use super::CastEventBus;

    const TEST_TIMEOUT: Duration = Duration::from_secs(2);

    fn status_event(attempt_id: u64, generation: u64) -> CastStatusEvent {
        CastStatusEvent {
            attempt_id,
            item_id: ItemId::new(format!("item-{attempt_id}")),
            generation,
            status: CastAttemptStatus::Pending,
        }
    }

    #[test]
    fn publish_allocates_monotonic_sequence_numbers() {
        let bus = CastEventBus::default();

        let first = bus.publish(status_event(1, 1));
        let second = bus.publish(status_event(1, 1));

        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert!(second.received_at_monotonic_nanos >= first.received_at_monotonic_nanos);
    }

    #[tokio::test]
    async fn publish_fans_out_to_attempt_and_global_subscribers() {
        let bus = CastEventBus::default();
        let mut attempt_subscriber = bus.subscribe_attempt(5);
        let mut global_subscriber = bus.subscribe_all();

        let published = bus.publish(status_event(5, 1));

        let attempt_envelope = timeout(TEST_TIMEOUT, attempt_subscriber.recv())
            .await
            .expect("attempt recv timed out")
            .expect("attempt recv should succeed");
        let global_envelope = timeout(TEST_TIMEOUT, global_subscriber.recv())
            .await
            .expect("global recv timed out")
            .expect("global recv should succeed");

        assert_eq!(attempt_envelope, published);
        assert_eq!(global_envelope, published);
    }

    #[tokio::test]
    async fn attempt_subscriptions_only_receive_matching_attempt_events() {
        let bus = CastEventBus::default();
        let mut subscriber_a = bus.subscribe_attempt(1);
        let mut subscriber_b = bus.subscribe_attempt(2);

        let event_a = bus.publish(status_event(1, 1));
        let event_b = bus.publish(status_event(2, 1));

        let received_a = timeout(TEST_TIMEOUT, subscriber_a.recv())
            .await
            .expect("attempt 1 recv timed out")
            .expect("attempt 1 recv should succeed");
        let received_b = timeout(TEST_TIMEOUT, subscriber_b.recv())
            .await
            .expect("attempt 2 recv timed out")
            .expect("attempt 2 recv should succeed");

        assert_eq!(received_a, event_a);
        assert_eq!(received_b, event_b);
    }

    #[tokio::test]
    async fn remove_attempt_closes_existing_subscribers() {
        let bus = CastEventBus::default();
        let mut subscriber = bus.subscribe_attempt(9);

        assert!(bus.remove_attempt(9));
        assert!(!bus.remove_attempt(9));

        let closed = timeout(TEST_TIMEOUT, subscriber.recv())
            .await
            .expect("attempt recv timed out")
            .expect_err("attempt subscription should close after remove_attempt");
        assert!(matches!(closed, RecvError::Closed));
    }

    #[tokio::test]
    async fn envelope_carries_generation_for_staleness_filtering() {
        let bus = CastEventBus::default();
        let mut global_subscriber = bus.subscribe_all();

        bus.publish(status_event(1, 1));
        bus.publish(status_event(2, 2));

        let stale = timeout(TEST_TIMEOUT, global_subscriber.recv())
            .await
            .expect("recv timed out")
            .expect("recv should succeed");
        let live = timeout(TEST_TIMEOUT, global_subscriber.recv())
            .await
            .expect("recv timed out")
            .expect("recv should succeed");

        assert_eq!(stale.event.generation, 1);
        assert_eq!(live.event.generation, 2);
    }
}
