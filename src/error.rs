//! Error types for the bridge holder.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use bridge_holder::{BridgeHolder, Result};
//!
//! fn example(holder: &BridgeHolder) -> Result<()> {
//!     holder.register_request_handler("user.get", |request, completion| {
//!         completion.succeed(request.data);
//!     })?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Misuse | [`Error::DuplicateHandler`], [`Error::TransportAlreadyBound`], [`Error::MalformedOperation`] |
//! | Delivery | [`Error::RequestDelivery`], [`Error::Timeout`], [`Error::ChannelClosed`] |
//! | Configuration | [`Error::Config`] |
//! | Transport | [`Error::Protocol`] |
//! | External | [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;

use crate::protocol::BridgeFailure;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Structural misuse is returned synchronously from the call that caused it.
/// Delivery failures travel through request completions and only surface
/// here through the async request API.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Misuse Errors
    // ========================================================================
    /// A request handler is already bound for this name.
    ///
    /// The original handler stays in place.
    #[error("Request handler already registered for: {name}")]
    DuplicateHandler {
        /// Name that already has a handler.
        name: String,
    },

    /// The transport was already attached.
    ///
    /// Returned by a second `set_transport` under [`RebindPolicy::Reject`].
    /// The pending queue and registration table are left untouched.
    ///
    /// [`RebindPolicy::Reject`]: crate::holder::RebindPolicy::Reject
    #[error("Transport already bound on {label}")]
    TransportAlreadyBound {
        /// Label of the holder instance.
        label: String,
    },

    /// Invalid name or payload.
    ///
    /// The operation was neither queued nor forwarded.
    #[error("Malformed operation: {message}")]
    MalformedOperation {
        /// Description of what was wrong.
        message: String,
    },

    // ========================================================================
    // Delivery Errors
    // ========================================================================
    /// The transport or the remote side reported a failure for a request.
    #[error("Request delivery failed ({code}): {message}")]
    RequestDelivery {
        /// Failure code.
        code: String,
        /// Failure message.
        message: String,
    },

    /// Gave up waiting for a response.
    ///
    /// The underlying request is not cancelled.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when builder input is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// Transport-side protocol violation.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Channel receive error.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a duplicate handler error.
    #[inline]
    pub fn duplicate_handler(name: impl Into<String>) -> Self {
        Self::DuplicateHandler { name: name.into() }
    }

    /// Creates a transport already bound error.
    #[inline]
    pub fn transport_already_bound(label: impl Into<String>) -> Self {
        Self::TransportAlreadyBound {
            label: label.into(),
        }
    }

    /// Creates a malformed operation error.
    #[inline]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedOperation {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

impl From<BridgeFailure> for Error {
    fn from(failure: BridgeFailure) -> Self {
        Self::RequestDelivery {
            code: failure.code,
            message: failure.message,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error was reported synchronously for misuse.
    #[inline]
    #[must_use]
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            Self::DuplicateHandler { .. }
                | Self::TransportAlreadyBound { .. }
                | Self::MalformedOperation { .. }
        )
    }

    /// Returns `true` if this error came from request delivery.
    #[inline]
    #[must_use]
    pub fn is_delivery_error(&self) -> bool {
        matches!(
            self,
            Self::RequestDelivery { .. } | Self::Timeout { .. } | Self::ChannelClosed(_)
        )
    }

    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::duplicate_handler("user.get");
        assert_eq!(
            err.to_string(),
            "Request handler already registered for: user.get"
        );
    }

    #[test]
    fn test_malformed_display() {
        let err = Error::malformed("event name is empty");
        assert_eq!(err.to_string(), "Malformed operation: event name is empty");
    }

    #[test]
    fn test_from_bridge_failure() {
        let err: Error = BridgeFailure::new("E42", "remote exploded").into();
        assert!(matches!(
            err,
            Error::RequestDelivery { ref code, ref message }
                if code == "E42" && message == "remote exploded"
        ));
        assert!(err.is_delivery_error());
        assert!(!err.is_misuse());
    }

    #[test]
    fn test_is_misuse() {
        assert!(Error::duplicate_handler("a").is_misuse());
        assert!(Error::transport_already_bound("main").is_misuse());
        assert!(Error::malformed("x").is_misuse());
        assert!(!Error::config("x").is_misuse());
    }

    #[test]
    fn test_is_timeout() {
        let timeout_err = Error::timeout("request user.get", 500);
        let other_err = Error::protocol("test");

        assert!(timeout_err.is_timeout());
        assert!(!other_err.is_timeout());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
