//! # Bus configuration.
//!
//! Provides [`BusConfig`] centralized settings for one [`Bus`](crate::Bus) instance.
//!
//! Config is used in two ways:
//! 1. **Bus creation**: `Bus::new(config)` (name is attached to every log event)
//! 2. **Subscription defaults**: options left unset in
//!    [`SubscribeOptions`](crate::SubscribeOptions) inherit `run_detached` and
//!    `include_derived_types` from here.

use std::borrow::Cow;

/// Configuration for one bus instance.
///
/// ## Field semantics
/// - `name`: label attached to the bus's log events (several buses may coexist)
/// - `run_detached`: default execution mode for subscriptions that don't choose
/// - `include_derived_types`: default matching mode for subscriptions that don't choose
///
/// ## Example
/// ```rust
/// use serialbus::BusConfig;
///
/// let cfg = BusConfig::default().with_name("orders").with_run_detached(true);
/// assert_eq!(cfg.name, "orders");
/// assert!(cfg.run_detached);
/// assert!(cfg.include_derived_types);
/// ```
#[derive(Clone, Debug)]
pub struct BusConfig {
    /// Bus label used in logs.
    pub name: Cow<'static, str>,

    /// Default for [`SubscribeOptions::run_detached`](crate::SubscribeOptions::run_detached).
    ///
    /// - `false` = handlers run inline: the loop awaits each before moving on
    /// - `true` = handlers run on their own tasks; their outcome is not observed
    pub run_detached: bool,

    /// Default for [`SubscribeOptions::include_derived_types`](crate::SubscribeOptions::include_derived_types).
    pub include_derived_types: bool,
}

impl BusConfig {
    /// Returns a config with the given log label.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns a config with the given default execution mode.
    pub fn with_run_detached(mut self, run_detached: bool) -> Self {
        self.run_detached = run_detached;
        self
    }

    /// Returns a config with the given default matching mode.
    pub fn with_include_derived_types(mut self, include: bool) -> Self {
        self.include_derived_types = include;
        self
    }
}

impl Default for BusConfig {
    /// Default configuration:
    ///
    /// - `name = "bus"`
    /// - `run_detached = false` (inline delivery, failures observed)
    /// - `include_derived_types = true` (polymorphic matching)
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("bus"),
            run_detached: false,
            include_derived_types: true,
        }
    }
}
