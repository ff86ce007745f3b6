//! # Subscriptions: records, options and scoped handles.
//!
//! - [`SubscriptionId`] - opaque handle used for removal
//! - [`SubscribeOptions`] - per-subscription overrides of the bus defaults
//! - [`SubscriptionGuard`] - unsubscribes on drop
//!
//! The subscription record itself is internal: only the dispatch loop ever sees it.

mod guard;
mod options;
mod subscription;

pub use guard::SubscriptionGuard;
pub use options::SubscribeOptions;
pub use subscription::SubscriptionId;

pub(crate) use subscription::Subscription;
