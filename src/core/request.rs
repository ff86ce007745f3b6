//! # Work items queued for the dispatch loop.
//!
//! - [`Change`]: a pending subscribe/unsubscribe, applied between dispatch cycles.
//! - [`DispatchRequest`]: a pending delivery with its single-shot completion.
//!
//! Both travel over unbounded `tokio::sync::mpsc` queues: many producers, one
//! consumer (the loop).

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::message::Message;
use crate::subscriptions::{Subscription, SubscriptionId};

/// Pending mutation of the live subscription list.
#[derive(Debug)]
pub(crate) enum Change {
    Subscribe(Subscription),
    Unsubscribe(SubscriptionId),
}

/// One message awaiting delivery.
///
/// Completion is consumed by value, so the result is reported at most once;
/// if the request is dropped unprocessed, the waiting caller sees `false`.
pub(crate) struct DispatchRequest {
    pub(crate) payload: Arc<dyn Message>,
    pub(crate) cancel: CancellationToken,
    on_complete: oneshot::Sender<bool>,
}

impl DispatchRequest {
    /// Creates a request and the receiver its caller awaits.
    pub(crate) fn new(
        payload: Arc<dyn Message>,
        cancel: CancellationToken,
    ) -> (Self, oneshot::Receiver<bool>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                payload,
                cancel,
                on_complete: tx,
            },
            rx,
        )
    }

    /// Reports the aggregate result. A caller that stopped waiting is ignored.
    pub(crate) fn complete(self, ok: bool) {
        let _ = self.on_complete.send(ok);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping;
    crate::message!(Ping);

    #[tokio::test]
    async fn completion_reaches_caller() {
        let (req, rx) = DispatchRequest::new(Arc::new(Ping), CancellationToken::new());
        req.complete(false);
        assert_eq!(rx.await, Ok(false));
    }

    #[tokio::test]
    async fn dropped_request_is_observable() {
        let (req, rx) = DispatchRequest::new(Arc::new(Ping), CancellationToken::new());
        drop(req);
        assert!(rx.await.is_err());
    }

    #[test]
    fn completion_without_listener_is_silent() {
        let (req, rx) = DispatchRequest::new(Arc::new(Ping), CancellationToken::new());
        drop(rx);
        req.complete(true);
    }
}
