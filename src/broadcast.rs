//! Fan-out of live updates to connected dashboard viewers.
//!
//! Built on `tokio::broadcast`: publishing never waits on a viewer, and a
//! viewer that falls behind loses the overflowed messages instead of
//! slowing down ingestion.

use crate::models::LiveMessage;
use tokio::sync::broadcast;
use tracing::trace;

/// Default capacity of the broadcast channel.
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct Broadcaster {
    sender: broadcast::Sender<LiveMessage>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Sends to every current subscriber and returns how many there were.
    /// Having no viewers is not an error.
    pub fn publish(&self, message: LiveMessage) -> usize {
        match self.sender.send(message) {
            Ok(receivers) => receivers,
            Err(_) => {
                trace!("no live viewers connected");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LiveMessage> {
        self.sender.subscribe()
    }

    pub fn viewer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VisitUpdate;
    use tokio::sync::broadcast::error::RecvError;

    fn visit(total: u64) -> LiveMessage {
        LiveMessage::Visit(VisitUpdate {
            total_visits: total,
            visits_today: total,
            visits_by_hour: vec![0; 24],
        })
    }

    #[test]
    fn publish_without_viewers_is_fine() {
        let hub = Broadcaster::new();
        assert_eq!(hub.publish(visit(1)), 0);
    }

    #[tokio::test]
    async fn every_viewer_receives_each_update() {
        let hub = Broadcaster::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        assert_eq!(hub.publish(visit(1)), 2);
        assert_eq!(a.recv().await.unwrap(), visit(1));
        assert_eq!(b.recv().await.unwrap(), visit(1));
    }

    #[tokio::test]
    async fn slow_viewer_lags_without_blocking_publisher() {
        let hub = Broadcaster::with_capacity(2);
        let mut slow = hub.subscribe();
        for n in 1..=5 {
            hub.publish(visit(n));
        }

        assert!(matches!(slow.recv().await, Err(RecvError::Lagged(3))));
        assert_eq!(slow.recv().await.unwrap(), visit(4));
        assert_eq!(slow.recv().await.unwrap(), visit(5));
    }

    #[test]
    fn dropped_viewer_is_forgotten() {
        let hub = Broadcaster::new();
        let viewer = hub.subscribe();
        assert_eq!(hub.viewer_count(), 1);
        drop(viewer);
        assert_eq!(hub.viewer_count(), 0);
    }
}
