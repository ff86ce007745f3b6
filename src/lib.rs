//! # serialbus
//!
//! **serialbus** is an in-process publish/subscribe message bus for tokio.
//!
//! Producers post typed messages and consumers register or remove typed handlers
//! at any time, from any thread. Delivery is ordered and serialized by a single
//! dispatch task per bus, so the subscription list needs no locks.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   producer A        producer B        producer C          (any thread)
//!      │ subscribe        │ send_async       │ unsubscribe
//!      ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Bus (facade, Clone)                                              │
//! │  - [changes]  unbounded MPSC: Subscribe(sub) / Unsubscribe(id)    │
//! │  - [requests] unbounded MPSC: DispatchRequest{payload, cancel, ⟲} │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//!                  ┌────────────────────────────┐
//!                  │  Dispatcher (one task)     │
//!                  │  owns LiveSubscriptions    │
//!                  └─────┬──────────────┬───────┘
//!                        ▼              ▼
//!                 inline handler   detached handler
//!                 (awaited)        (tokio::spawn, unobserved)
//! ```
//!
//! ### Dispatch cycle
//! ```text
//! for each request (FIFO) {
//!   ├─► drain [changes] in enqueue order → live list updated
//!   ├─► for sub in live list (registration order):
//!   │     ├─ type filter fails          → skip
//!   │     ├─ cancel token triggered      → result=false, stop
//!   │     ├─ detached                    → spawn, outcome ignored
//!   │     └─ inline                      → await; Err/panic → result=false, continue
//!   └─► complete(result)                 → send_async future resolves
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                        |
//! |-------------------|---------------------------------------------------------------|-------------------------------------------|
//! | **Bus**           | Subscribe, unsubscribe, send, shutdown.                       | [`Bus`], [`BusConfig`]                    |
//! | **Messages**      | Type tags with explicit subtype hierarchies.                  | [`Message`], [`MessageType`], [`message!`]|
//! | **Handlers**      | Async, sync, or trait-object handlers.                        | [`Handler`], [`HandlerFn`], [`Envelope`]  |
//! | **Subscriptions** | Per-subscription id, matching and execution mode.             | [`SubscribeOptions`], [`SubscriptionGuard`] |
//! | **Errors**        | Typed handler and runtime errors with stable labels.          | [`HandlerError`], [`BusError`]            |
//!
//! ## Limitations
//! - No handler timeout: an inline handler that never completes stalls the bus.
//! - `send_async` reports a single `bool`; failure detail goes to `tracing` only.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use serialbus::{message, Bus, BusConfig, Envelope, HandlerError, SubscribeOptions};
//!
//! struct Shape { sides: u32 }
//! struct Square { shape: Shape, side: f64 }
//!
//! message!(Shape);
//! message!(Square: Shape => shape);
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let bus = Bus::new(BusConfig::default());
//!
//!     // Receives Shape and every subtype of Shape.
//!     bus.subscribe(
//!         |shape: Envelope<Shape>, _ctx: CancellationToken| async move {
//!             println!("{} sides ({})", shape.sides, shape.message_type());
//!             Ok::<_, HandlerError>(())
//!         },
//!         SubscribeOptions::new(),
//!     );
//!
//!     // Receives Square only.
//!     bus.subscribe_fn(
//!         |sq: &Square, _ctx: &CancellationToken| {
//!             println!("area {}", sq.side * sq.side);
//!             Ok(())
//!         },
//!         SubscribeOptions::new().exact_type(),
//!     );
//!
//!     let square = Square { shape: Shape { sides: 4 }, side: 2.0 };
//!     assert!(bus.send_async(square, CancellationToken::new()).await);
//! }
//! ```

mod core;
mod error;
mod handlers;
mod message;
mod subscriptions;

// ---- Public re-exports ----

pub use crate::core::{Bus, BusConfig};
pub use error::{BusError, HandlerError};
pub use handlers::{Handler, HandlerFn, HandlerRef};
pub use message::{Envelope, Message, MessageType};
pub use subscriptions::{SubscribeOptions, SubscriptionGuard, SubscriptionId};
