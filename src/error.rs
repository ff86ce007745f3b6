//! Error types used by the bus runtime and by message handlers.
//!
//! This module defines two main error enums:
//!
//! - [`BusError`]: errors raised by the bus runtime itself.
//! - [`HandlerError`]: errors raised by individual handler invocations.
//!
//! Neither ever reaches a [`Bus::send_async`](crate::Bus::send_async) caller:
//! handler failures are collapsed into the boolean delivery result and reported
//! through `tracing`. Both types provide `as_label` / `as_message` for logs.

use std::fmt::Display;
use std::time::Duration;

use thiserror::Error;

/// # Errors produced by the bus runtime.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The dispatch loop did not stop within the grace period
    /// (an inline handler is still running).
    #[error("shutdown timeout {grace:?} exceeded; dispatch loop still busy")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
    },
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use serialbus::BusError;
    /// use std::time::Duration;
    ///
    /// let err = BusError::GraceExceeded { grace: Duration::from_secs(5) };
    /// assert_eq!(err.as_label(), "bus_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::GraceExceeded { .. } => "bus_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BusError::GraceExceeded { grace } => {
                format!("grace exceeded after {grace:?}; dispatch loop busy")
            }
        }
    }
}

/// # Errors produced by a handler invocation.
///
/// A handler reports failure by returning one of these; a panic inside a
/// handler is caught by the runtime and converted to [`HandlerError::Panicked`].
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Handler failed while processing the message.
    #[error("handler failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Handler panicked; the panic payload was captured by the runtime.
    #[error("handler panicked: {info}")]
    Panicked {
        /// Panic message, or `"unknown panic"` for non-string payloads.
        info: String,
    },

    /// Handler gave up because the send was cancelled.
    #[error("context cancelled")]
    Canceled,
}

impl HandlerError {
    /// Shorthand for [`HandlerError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use serialbus::HandlerError;
    ///
    /// let err = HandlerError::fail("db unavailable");
    /// assert_eq!(err.to_string(), "handler failed: db unavailable");
    /// ```
    pub fn fail(error: impl Display) -> Self {
        HandlerError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use serialbus::HandlerError;
    ///
    /// assert_eq!(HandlerError::Canceled.as_label(), "handler_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Fail { .. } => "handler_failed",
            HandlerError::Panicked { .. } => "handler_panicked",
            HandlerError::Canceled => "handler_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Fail { error } => format!("error: {error}"),
            HandlerError::Panicked { info } => format!("panic: {info}"),
            HandlerError::Canceled => "context cancelled".to_string(),
        }
    }

    /// Builds a [`HandlerError::Panicked`] from a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let info = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        HandlerError::Panicked { info }
    }
}
