//! Event publishing/subscription abstraction (mechanics only).
//!
//! The bus carries realtime messages from the server to every connected
//! viewer. It is **lossy**: a subscriber that falls more than the channel
//! capacity behind skips the oldest messages instead of slowing publishers
//! down. Nothing on the bus is durable; the scoreboard store is the source of
//! truth and every `updatedScoreboard` message carries full state.

use tokio::sync::broadcast;

/// Why a subscription stopped yielding messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvError {
    /// The bus was dropped; no further messages will arrive.
    Closed,
}

/// A subscription to a bus. Each subscription sees every message published
/// after it was created (broadcast semantics).
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: broadcast::Receiver<M>,
}

impl<M: Clone> Subscription<M> {
    pub fn new(receiver: broadcast::Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Wait for the next message, skipping over any that were lost to lag.
    pub async fn recv(&mut self) -> Result<M, RecvError> {
        loop {
            match self.receiver.recv().await {
                Ok(message) => return Ok(message),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber lagged; dropping missed messages");
                }
                Err(broadcast::error::RecvError::Closed) => return Err(RecvError::Closed),
            }
        }
    }

    /// Take the next message if one is already queued.
    pub fn try_recv(&mut self) -> Option<M> {
        loop {
            match self.receiver.try_recv() {
                Ok(message) => return Some(message),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    pub fn into_inner(self) -> broadcast::Receiver<M> {
        self.receiver
    }
}

/// Publish/subscribe fan-out used for realtime viewer updates.
///
/// `publish` returns how many subscribers were live at the time of sending.
/// Publishing with no subscribers is not an error.
pub trait EventBus<M>: Send + Sync {
    fn publish(&self, message: M) -> usize;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for std::sync::Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    fn publish(&self, message: M) -> usize {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
