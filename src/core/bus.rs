//! # Bus: the public facade.
//!
//! [`Bus`] is a thin, cloneable handle over two unbounded MPSC queues that feed
//! one [`Dispatcher`] task. Every operation only enqueues work; the facade never
//! touches the subscription list itself.
//!
//! ## Architecture
//! ```text
//! Producers (many):                                Consumer (one):
//!   subscribe / unsubscribe ──► [changes]  ──┐
//!   send / send_async       ──► [requests] ──┴──► Dispatcher ──► handlers
//!                                                     │
//!   send_async future ◄──── oneshot(bool) ────────────┘
//! ```
//!
//! ## Rules
//! - **Non-blocking**: `subscribe`, `unsubscribe` and `send` return immediately.
//! - **Ordered**: messages are delivered in the order `send`/`send_async` were called.
//! - **Eventually visible**: a subscription takes effect at the first dispatch cycle
//!   begun after it was enqueued; never mid-cycle.
//! - **Lossy result**: `send_async` resolves to a single `bool`; handler failures are
//!   reported through `tracing`, never to the caller.
//! - **Independent**: each `Bus::new` owns its own queues, list and loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::config::BusConfig;
use crate::core::dispatcher::Dispatcher;
use crate::core::request::{Change, DispatchRequest};
use crate::error::{BusError, HandlerError};
use crate::handlers::{HandlerFn, HandlerRef};
use crate::message::{Envelope, Message};
use crate::subscriptions::{SubscribeOptions, Subscription, SubscriptionGuard, SubscriptionId};

/// Handle to an in-process publish/subscribe bus.
///
/// Cheap to clone; all clones feed the same dispatch loop. The loop exits after
/// [`shutdown`](Bus::shutdown), or once every clone is dropped and the queued
/// messages are delivered.
///
/// Handlers that capture a `Bus` clone keep the loop alive until `shutdown`.
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use serialbus::{message, Bus, BusConfig, Envelope, HandlerError, SubscribeOptions};
///
/// struct Greeting { text: String }
/// message!(Greeting);
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let bus = Bus::new(BusConfig::default());
///
///     let id = bus.subscribe(
///         |msg: Envelope<Greeting>, _ctx: CancellationToken| async move {
///             println!("got: {}", msg.text);
///             Ok::<_, HandlerError>(())
///         },
///         SubscribeOptions::new(),
///     );
///
///     let delivered = bus
///         .send_async(Greeting { text: "hello".into() }, CancellationToken::new())
///         .await;
///     assert!(delivered);
///
///     bus.unsubscribe(id);
/// }
/// ```
#[derive(Clone)]
pub struct Bus {
    cfg: Arc<BusConfig>,
    changes: mpsc::UnboundedSender<Change>,
    requests: mpsc::UnboundedSender<DispatchRequest>,
    shutdown: CancellationToken,
    stopped: CancellationToken,
}

impl Bus {
    /// Creates a bus and spawns its dispatch loop.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn new(cfg: BusConfig) -> Self {
        let (changes_tx, changes_rx) = mpsc::unbounded_channel();
        let (requests_tx, requests_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let stopped = CancellationToken::new();

        Dispatcher::new(
            Arc::from(cfg.name.as_ref()),
            changes_rx,
            requests_rx,
            shutdown.clone(),
            stopped.clone(),
        )
        .spawn();

        Self {
            cfg: Arc::new(cfg),
            changes: changes_tx,
            requests: requests_tx,
            shutdown,
            stopped,
        }
    }

    /// Returns the bus configuration.
    pub fn config(&self) -> &BusConfig {
        &self.cfg
    }

    /// Registers an async handler for messages of type `M`.
    ///
    /// Returns immediately; the subscription becomes visible at the next dispatch
    /// cycle. With `include_derived_types` (the default) subtypes of `M` are
    /// delivered too, viewed as `M`.
    ///
    /// The returned id is the explicit one from `options` when set. If that id is
    /// already live when the subscription is merged, the loop rejects it with a
    /// `warn` event; the id returned here still names the earlier subscription.
    pub fn subscribe<M, F, Fut>(&self, handler: F, options: SubscribeOptions) -> SubscriptionId
    where
        M: Message,
        F: Fn(Envelope<M>, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let handler: HandlerRef<M> = HandlerFn::arc(std::any::type_name::<F>(), handler);
        self.subscribe_handler(handler, options)
    }

    /// Registers a synchronous handler for messages of type `M`.
    ///
    /// The handler runs on the dispatch loop (or a detached task) and must not block.
    pub fn subscribe_fn<M, F>(&self, handler: F, options: SubscribeOptions) -> SubscriptionId
    where
        M: Message,
        F: Fn(&M, &CancellationToken) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let name = std::any::type_name::<F>();
        let handler: HandlerRef<M> = HandlerFn::arc(name, move |msg: Envelope<M>, ctx: CancellationToken| {
            std::future::ready(handler(msg.get(), &ctx))
        });
        self.subscribe_handler(handler, options)
    }

    /// Registers a [`Handler`](crate::Handler) object for messages of type `M`.
    pub fn subscribe_handler<M: Message>(
        &self,
        handler: HandlerRef<M>,
        options: SubscribeOptions,
    ) -> SubscriptionId {
        let opts = options.resolve(&self.cfg);
        let sub = Subscription::new(
            opts.id,
            handler,
            opts.include_derived_types,
            opts.run_detached,
        );

        if self.changes.send(Change::Subscribe(sub)).is_err() {
            debug!(bus = %self.cfg.name, subscription = %opts.id, "bus closed; subscribe ignored");
        }
        opts.id
    }

    /// Like [`subscribe`](Bus::subscribe), but returns a guard that unsubscribes on drop.
    pub fn subscribe_guarded<M, F, Fut>(&self, handler: F, options: SubscribeOptions) -> SubscriptionGuard
    where
        M: Message,
        F: Fn(Envelope<M>, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let id = self.subscribe(handler, options);
        SubscriptionGuard::new(self.clone(), id)
    }

    /// Removes a subscription at the next dispatch cycle.
    ///
    /// Idempotent: unknown or already-removed ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        if self.changes.send(Change::Unsubscribe(id)).is_err() {
            debug!(bus = %self.cfg.name, subscription = %id, "bus closed; unsubscribe ignored");
        }
    }

    /// Enqueues `message` and returns a future resolving once it has been delivered.
    ///
    /// The message is enqueued when this method is called, not when the future is
    /// first polled; dropping the future does not cancel delivery.
    ///
    /// Resolves to:
    /// - `true` if every matching inline handler succeeded (or nothing matched);
    /// - `false` if `cancel` was observed, an inline handler failed, or the bus
    ///   shut down before the message was processed.
    pub fn send_async<M: Message>(
        &self,
        message: M,
        cancel: CancellationToken,
    ) -> impl Future<Output = bool> + Send + 'static {
        self.send_arc(Arc::new(message), cancel)
    }

    /// Type-erased variant of [`send_async`](Bus::send_async) for shared payloads.
    pub fn send_arc(
        &self,
        payload: Arc<dyn Message>,
        cancel: CancellationToken,
    ) -> impl Future<Output = bool> + Send + 'static {
        let (request, done) = DispatchRequest::new(payload, cancel);

        if self.shutdown.is_cancelled() {
            debug!(
                bus = %self.cfg.name,
                message_type = %request.payload.message_type(),
                "bus closed; message dropped"
            );
        } else if let Err(mpsc::error::SendError(request)) = self.requests.send(request) {
            debug!(
                bus = %self.cfg.name,
                message_type = %request.payload.message_type(),
                "bus closed; message dropped"
            );
        }

        async move { done.await.unwrap_or(false) }
    }

    /// Fire-and-forget: enqueues `message` without waiting or observing the result.
    pub fn send<M: Message>(&self, message: M) {
        let _ = self.send_async(message, CancellationToken::new());
    }

    /// Asks the dispatch loop to stop after the message currently being delivered.
    ///
    /// Queued messages are not delivered; their `send_async` futures resolve to
    /// `false`. Later subscribes, unsubscribes and sends are ignored.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            debug!(bus = %self.cfg.name, "shutdown requested");
        }
        self.shutdown.cancel();
    }

    /// Requests shutdown and waits up to `grace` for the dispatch loop to exit.
    ///
    /// Returns [`BusError::GraceExceeded`] if an inline handler is still running
    /// when the grace period ends; the loop exits once that handler returns.
    pub async fn shutdown_with_grace(&self, grace: Duration) -> Result<(), BusError> {
        self.shutdown();
        tokio::time::timeout(grace, self.stopped.cancelled())
            .await
            .map_err(|_| BusError::GraceExceeded { grace })
    }

    /// Waits until the dispatch loop has exited.
    pub async fn closed(&self) {
        self.stopped.cancelled().await;
    }

    /// Returns `true` once shutdown was requested or the loop has exited.
    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled() || self.stopped.is_cancelled()
    }
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bus")
            .field("name", &self.cfg.name)
            .field("closed", &self.is_closed())
            .finish()
    }
}
