//! Event message type.
//!
//! Events are one-way notifications. Sending one never produces a reply.

// ============================================================================
// Imports
// ============================================================================

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, from_value, to_value};

use crate::error::Result;
use crate::identifiers::MessageId;

// ============================================================================
// BridgeEvent
// ============================================================================

/// A named event with an optional payload.
///
/// # Format
///
/// ```json
/// {
///   "id": "uuid",
///   "name": "app.ready",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeEvent {
    /// Unique identifier.
    pub id: MessageId,

    /// Event name.
    pub name: String,

    /// Event body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl BridgeEvent {
    /// Creates an event without a payload.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            name: name.into(),
            data: None,
        }
    }

    /// Creates an event whose payload is the JSON form of `payload`.
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

    /// Decodes the payload into `T`.
    ///
    /// A missing payload decodes from `null`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the payload does not match `T`.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(from_value(self.data.clone().unwrap_or(Value::Null))?)
    }
}

// ============================================================================
// Tests
// ============================================================================
