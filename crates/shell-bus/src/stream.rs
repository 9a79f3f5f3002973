//! # Event Stream
//!
//! A channel-backed view of a subscription for consumers that prefer
//! `Stream` combinators over callbacks. Internally it is an ordinary
//! repeating listener feeding an unbounded channel; dropping the stream
//! unsubscribes it.

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::mpsc;
use tokio_stream::Stream;

use shell_types::EventEnvelope;

use crate::registry::Subscription;

/// A stream of delivered envelopes for one subscription.
pub struct EventStream {
    receiver: mpsc::UnboundedReceiver<EventEnvelope>,
    subscription: Subscription,
}

impl EventStream {
    pub(crate) fn new(
        receiver: mpsc::UnboundedReceiver<EventEnvelope>,
        subscription: Subscription,
    ) -> Self {
        Self {
            receiver,
            subscription,
        }
    }

    /// Receive the next delivered envelope.
    ///
    /// Returns `None` once the stream has been closed and drained.
    pub async fn recv(&mut self) -> Option<EventEnvelope> {
        self.receiver.recv().await
    }

    /// The routing key this stream is subscribed under.
    #[must_use]
    pub fn routing_key(&self) -> &str {
        self.subscription.routing_key()
    }
}

impl Stream for EventStream {
    type Item = EventEnvelope;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}
