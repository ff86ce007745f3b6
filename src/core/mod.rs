//! Runtime core: facade, dispatch loop and delivery.
//!
//! The public API from this module is [`Bus`] and its [`BusConfig`].
//!
//! Internal modules:
//! - [`request`]: queued work items (subscription changes, dispatch requests);
//! - [`dispatcher`]: the single consumer that serializes changes and deliveries;
//! - [`live`]: the loop-owned live subscription list and per-message delivery;
//! - [`invoke`]: runs one handler inline or detached, isolating failures.

mod bus;
mod config;
mod dispatcher;
mod invoke;
mod live;
mod request;

pub use bus::Bus;
pub use config::BusConfig;
