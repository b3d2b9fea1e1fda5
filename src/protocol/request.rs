//! Request message type.
//!
//! A request is answered exactly once, through the [`Completion`] passed
//! alongside it.
//!
//! [`Completion`]: super::Completion

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, from_value, to_value};

use crate::error::Result;
use crate::identifiers::MessageId;

// ============================================================================
// Constants
// ============================================================================

/// Timeout hint attached to new requests.
///
/// Transports may enforce it; the holder never does.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// BridgeRequest
// ============================================================================

/// A named request with an optional payload.
///
/// # Format
///
/// ```json
/// {
///   "id": "uuid",
///   "name": "user.get",
///   "data": { ... },
///   "timeoutMs": 5000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeRequest {
    /// Unique identifier for response correlation.
    pub id: MessageId,

    /// Request name.
    pub name: String,

    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Timeout hint for the transport.
    #[serde(rename = "timeoutMs", default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl BridgeRequest {
    /// Creates a request without a payload and with the default timeout hint.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            name: name.into(),
            data: None,
            timeout_ms: Some(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    /// Creates a request whose payload is the JSON form of `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if `payload` cannot be serialized.
    pub fn with_payload<T: Serialize>(name: impl Into<String>, payload: &T) -> Result<Self> {
        Ok(Self::new(name).with_data(to_value(payload)?))
    }

    /// Sets the payload.
    #[inline]
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets the timeout hint.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(saturating_millis(timeout));
        self
    }

    /// Removes the timeout hint.
    #[inline]
    #[must_use]
    pub fn without_timeout(mut self) -> Self {
        self.timeout_ms = None;
        self
    }

    /// Decodes the payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the payload does not match `T`.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(from_value(self.data.clone().unwrap_or(Value::Null))?)
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Tests
// ============================================================================
