//! # Dispatcher - the serialized dispatch loop.
//!
//! One dispatcher task per [`Bus`](crate::Bus). It is the only owner of the live
//! subscription list and the only consumer of the bus queues.
//!
//! ## Architecture
//! ```text
//! Bus (any thread) ── subscribe/unsubscribe ──► [changes]  ──┐
//! Bus (any thread) ── send/send_async ────────► [requests] ──┤
//!                                                            ▼
//!                                             Dispatcher::run() (one task)
//! loop {
//!   ├─► shutdown requested?       → stop (queued requests resolve false)
//!   ├─► next request (FIFO)       → none left and all senders gone → stop
//!   ├─► drain [changes]           → LiveSubscriptions::apply (enqueue order)
//!   ├─► deliver(request)          → inline handlers awaited, detached spawned
//!   └─► request.complete(result)
//! }
//! ```
//!
//! ## Rules
//! - One request at a time; requests are processed in enqueue order.
//! - Changes enqueued before a request is taken are visible to it; changes
//!   enqueued while it is being delivered wait for the next request.
//! - Shutdown is observed only between requests; an in-flight inline handler is
//!   never interrupted (a handler that never returns stalls the bus).

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::live::LiveSubscriptions;
use crate::core::request::{Change, DispatchRequest};

/// Single consumer of a bus's queues.
pub(crate) struct Dispatcher {
    bus: Arc<str>,
    live: LiveSubscriptions,
    changes: mpsc::UnboundedReceiver<Change>,
    requests: mpsc::UnboundedReceiver<DispatchRequest>,
    shutdown: CancellationToken,
    stopped: CancellationToken,
}

impl Dispatcher {
    /// Creates a dispatcher.
    ///
    /// - `shutdown`: cancelled by the bus to request a stop.
    /// - `stopped`: cancelled by the dispatcher once its loop has exited.
    pub(crate) fn new(
        bus: Arc<str>,
        changes: mpsc::UnboundedReceiver<Change>,
        requests: mpsc::UnboundedReceiver<DispatchRequest>,
        shutdown: CancellationToken,
        stopped: CancellationToken,
    ) -> Self {
        Self {
            live: LiveSubscriptions::new(Arc::clone(&bus)),
            bus,
            changes,
            requests,
            shutdown,
            stopped,
        }
    }

    /// Spawns the loop on the current tokio runtime.
    pub(crate) fn spawn(self) {
        tokio::spawn(self.run());
    }

    async fn run(mut self) {
        let _stopped = self.stopped.clone().drop_guard();
        debug!(bus = %self.bus, "dispatch loop started");

        loop {
            let request = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                next = self.requests.recv() => match next {
                    Some(request) => request,
                    None => break,
                },
            };

            self.merge_pending();
            let ok = self.live.deliver(&request.payload, &request.cancel).await;
            request.complete(ok);
        }

        self.requests.close();
        self.changes.close();
        let mut dropped = 0usize;
        while let Ok(request) = self.requests.try_recv() {
            drop(request);
            dropped += 1;
        }
        debug!(
            bus = %self.bus,
            live = self.live.len(),
            dropped,
            "dispatch loop stopped"
        );
    }

    /// Drains every queued change, in enqueue order.
    fn merge_pending(&mut self) {
        while let Ok(change) = self.changes.try_recv() {
            self.live.apply(change);
        }
    }
}
