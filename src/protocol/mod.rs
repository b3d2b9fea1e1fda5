//! Bridge payload types.
//!
//! This module defines what callers hand to the holder and what the holder
//! hands to the transport. The wire encoding is the transport's business;
//! these types only derive serde so a transport can pick one.
//!
//! # Message Types
//!
//! | Type | Direction | Purpose |
//! |------|-----------|---------|
//! | [`BridgeEvent`] | both | Fire-and-forget notification |
//! | [`BridgeRequest`] | both | Call expecting exactly one response |
//! | [`BridgeFailure`] | Remote → Local | Failure side of a response |
//! | [`Completion`] | Local | One-shot response callback |
//!
//! # Naming
//!
//! Names are free-form but must contain a non-whitespace character,
//! e.g. `user.get` or `app.ready`.

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};

// ============================================================================
// Submodules
// ============================================================================

/// Event message type.
pub mod event;

/// Request message type.
pub mod request;

/// Response failures and one-shot completions.
pub mod response;

// ============================================================================
// Re-exports
// ============================================================================

pub use event::BridgeEvent;
pub use request::{BridgeRequest, DEFAULT_REQUEST_TIMEOUT_MS};
pub(crate) use request::saturating_millis;
pub use response::{BridgeFailure, Completion, ResponseResult};

// ============================================================================
// Validation
// ============================================================================

/// Rejects empty and whitespace-only names.
pub(crate) fn validate_name(kind: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::malformed(format!("{kind} name is empty")));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("event", "app.ready").is_ok());
        assert!(validate_name("event", "").is_err());

        let err = validate_name("request", "  \t").unwrap_err();
        assert_eq!(err.to_string(), "Malformed operation: request name is empty");
    }
}
