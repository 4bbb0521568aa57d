//! In-process bus backed by `tokio::sync::broadcast`.

use tokio::sync::broadcast;

use crate::bus::{EventBus, Subscription};

/// In-process pub/sub bus.
///
/// - Bounded: `capacity` messages are buffered per subscriber
/// - Best-effort fan-out; slow subscribers lose the oldest messages
#[derive(Debug, Clone)]
pub struct BroadcastBus<M> {
    sender: broadcast::Sender<M>,
}

impl<M: Clone> BroadcastBus<M> {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self { sender }
    }
}

impl<M> EventBus<M> for BroadcastBus<M>
where
    M: Clone + Send + 'static,
{
    fn publish(&self, message: M) -> usize {
        // `send` only fails when nobody is listening.
        self.sender.send(message).unwrap_or(0)
    }

    fn subscribe(&self) -> Subscription<M> {
        Subscription::new(self.sender.subscribe())
    }
}
