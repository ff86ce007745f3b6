//! # Per-subscription options.
//!
//! [`SubscribeOptions`] carries the optional overrides accepted by
//! [`Bus::subscribe`](crate::Bus::subscribe). Unset fields fall back to the bus
//! [`BusConfig`] at subscribe time.
//!
//! | Option                  | Unset means                                   |
//! |-------------------------|-----------------------------------------------|
//! | `id`                    | a fresh random [`SubscriptionId`]             |
//! | `run_detached`          | `BusConfig::run_detached` (default `false`)   |
//! | `include_derived_types` | `BusConfig::include_derived_types` (default `true`) |

use crate::core::BusConfig;
use crate::subscriptions::SubscriptionId;

/// Optional overrides for one subscription.
///
/// ## Example
/// ```rust
/// use serialbus::{SubscribeOptions, SubscriptionId};
///
/// let id = SubscriptionId::new();
/// let opts = SubscribeOptions::new().with_id(id).exact_type().detached();
/// assert_eq!(opts.id, Some(id));
/// assert_eq!(opts.include_derived_types, Some(false));
/// assert_eq!(opts.run_detached, Some(true));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// Explicit handle; must be unique among live subscriptions.
    ///
    /// Uniqueness is checked by the dispatch loop, after `subscribe` has already
    /// returned this id. A duplicate is dropped and only reported as a `warn`
    /// event, so reusing a live id silently keeps the earlier handler.
    pub id: Option<SubscriptionId>,
    /// Run the handler without blocking the dispatch loop.
    pub run_detached: Option<bool>,
    /// Also match subtypes of the registered message type.
    pub include_derived_types: Option<bool>,
}

/// Options after defaults have been applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Resolved {
    pub(crate) id: SubscriptionId,
    pub(crate) run_detached: bool,
    pub(crate) include_derived_types: bool,
}

impl SubscribeOptions {
    /// All options unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `id` instead of a generated handle.
    pub fn with_id(mut self, id: SubscriptionId) -> Self {
        self.id = Some(id);
        self
    }

    /// Overrides the bus default for detached execution.
    pub fn with_run_detached(mut self, run_detached: bool) -> Self {
        self.run_detached = Some(run_detached);
        self
    }

    /// Shorthand for `with_run_detached(true)`.
    pub fn detached(self) -> Self {
        self.with_run_detached(true)
    }

    /// Shorthand for `with_run_detached(false)`.
    pub fn inline(self) -> Self {
        self.with_run_detached(false)
    }

    /// Sets whether subtypes of the registered type are delivered.
    pub fn with_derived_types(mut self, include: bool) -> Self {
        self.include_derived_types = Some(include);
        self
    }

    /// Shorthand for `with_derived_types(false)`: only the exact registered type.
    pub fn exact_type(self) -> Self {
        self.with_derived_types(false)
    }

    pub(crate) fn resolve(&self, cfg: &BusConfig) -> Resolved {
        Resolved {
            id: self.id.unwrap_or_default(),
            run_detached: self.run_detached.unwrap_or(cfg.run_detached),
            include_derived_types: self
                .include_derived_types
                .unwrap_or(cfg.include_derived_types),
        }
    }
}
