use tokio::sync::mpsc::{UnboundedReceiver, error::TryRecvError};

use crate::engine::EventSubscription;
use crate::events::MediaEngineEvent;

/// Async stream of payloads for one event, created by
/// [`MediaEngine::subscribe`](crate::engine::MediaEngine::subscribe).
///
/// The registration lives as long as the receiver; closing or dropping it
/// unregisters. Payloads are queued without bound, so a consumer that stops
/// polling should close the receiver.
pub struct EventReceiver<E: MediaEngineEvent> {
    rx: UnboundedReceiver<E::Args>,
    subscription: Option<EventSubscription>,
}

impl<E: MediaEngineEvent> EventReceiver<E> {
    pub(crate) fn new(rx: UnboundedReceiver<E::Args>, subscription: EventSubscription) -> Self {
        Self {
            rx,
            subscription: Some(subscription),
        }
    }

    /// Wait for the next payload. Returns `None` once closed and drained.
    pub async fn recv(&mut self) -> Option<E::Args> {
        self.rx.recv().await
    }

    /// Next queued payload, if any, without waiting.
    pub fn try_recv(&mut self) -> Option<E::Args> {
        match self.rx.try_recv() {
            Ok(args) => Some(args),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Unregister. Payloads already queued can still be drained.
    pub fn close(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.remove();
            tracing::debug!(event = E::TYPE.as_str(), "event receiver closed");
        }
    }
}

impl<E: MediaEngineEvent> Drop for EventReceiver<E> {
    fn drop(&mut self) {
        self.close();
    }
}
