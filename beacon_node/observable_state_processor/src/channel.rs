//! Replay-last, error-on-overflow output channels (SPEC_FULL.md §4.6).
//!
//! Grounded on the teacher's `events.rs` (`ServerSentEventHandler`, a thin
//! wrapper over `tokio::sync::broadcast::Sender`): this wraps the same
//! primitive, adding a last-value cell so a subscriber that joins late is
//! replayed the most recent emission before it sees live ones. `Lagged`
//! already surfaces `tokio::sync::broadcast`'s own back-pressure signal.

use crate::error::ChannelError;
use crate::metrics;
use parking_lot::RwLock;
use tokio::sync::broadcast;

/// A broadcast channel that remembers its most recently published value.
pub struct ReplayChannel<V: Clone + Send + Sync + 'static> {
    tx: broadcast::Sender<V>,
    last: RwLock<Option<V>>,
    name: &'static str,
}

impl<V: Clone + Send + Sync + 'static> ReplayChannel<V> {
    /// `name` labels this channel's `CHANNEL_LAGGED_TOTAL` series so a
    /// lagging head channel can be told apart from a lagging state channel.
    pub fn new(capacity: usize, name: &'static str) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self {
            tx,
            last: RwLock::new(None),
            name,
        }
    }

    /// Publishes `value`, overwriting the replay cell first so a
    /// subscription racing with this call never observes a stale replay
    /// with no corresponding live message still pending.
    pub fn publish(&self, value: V) {
        *self.last.write() = Some(value.clone());
        // No receivers is not an error: matches the teacher's handling of
        // `SendError` in `ServerSentEventHandler::register`.
        let _ = self.tx.send(value);
    }

    pub fn subscribe(&self) -> ReplaySubscription<V> {
        ReplaySubscription {
            replay: self.last.read().clone(),
            rx: self.tx.subscribe(),
            name: self.name,
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A subscription to a `ReplayChannel`: yields the last published value
/// first (if any existed at subscribe time), then forwards live emissions.
pub struct ReplaySubscription<V> {
    replay: Option<V>,
    rx: broadcast::Receiver<V>,
    name: &'static str,
}

impl<V: Clone> ReplaySubscription<V> {
    pub async fn recv(&mut self) -> Result<V, ChannelError> {
        if let Some(value) = self.replay.take() {
            return Ok(value);
        }
        match self.rx.recv().await {
            Ok(value) => Ok(value),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                metrics::inc_counter_vec(&metrics::CHANNEL_LAGGED_TOTAL, &[self.name]);
                Err(ChannelError::Lagged(n))
            }
            Err(broadcast::error::RecvError::Closed) => Err(ChannelError::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn late_subscriber_replays_last_value() {
        let channel = ReplayChannel::new(4, "test");
        channel.publish(1u64);
        channel.publish(2u64);

        let mut sub = channel.subscribe();
        assert_eq!(sub.recv().await.unwrap(), 2);

        channel.publish(3u64);
        assert_eq!(sub.recv().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn subscriber_with_no_prior_publish_gets_nothing_replayed() {
        let channel: ReplayChannel<u64> = ReplayChannel::new(4, "test");
        let mut sub = channel.subscribe();
        channel.publish(1u64);
        assert_eq!(sub.recv().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn slow_subscriber_is_dropped_with_lagged_error() {
        let channel = ReplayChannel::new(2, "test");
        let mut sub = channel.subscribe();
        for i in 0..10u64 {
            channel.publish(i);
        }
        let err = sub.recv().await.unwrap_err();
        assert!(matches!(err, ChannelError::Lagged(_)));
    }
}
