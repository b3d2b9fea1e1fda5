//! Transport boundary.
//!
//! A [`Transport`] carries events and requests across the runtime boundary
//! once it is attached to a [`BridgeHolder`]. The holder treats it as an
//! opaque sink and never depends on how it marshals data.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Native code    │                              │  Remote runtime │
//! │                 │        Transport             │                 │
//! │  BridgeHolder   │─────────────────────────────►│  dispatch       │
//! │  (queue, table) │◄─────────────────────────────│                 │
//! │                 │   dispatch_event/request     │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `channel` | Transport over a tokio channel with response correlation |
//! | `recording` | Transport that records every call, for tests |
//!
//! [`BridgeHolder`]: crate::BridgeHolder

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use crate::identifiers::ListenerId;
use crate::protocol::{BridgeEvent, BridgeRequest, Completion};
use crate::registry::{EventListener, RequestHandler};

// ============================================================================
// Submodules
// ============================================================================

/// Channel-backed transport.
pub mod channel;

/// Recording transport.
pub mod recording;

// ============================================================================
// Re-exports
// ============================================================================

pub use channel::{ChannelTransport, Outbound};
pub use recording::{RecordingTransport, TransportCall};

// ============================================================================
// Transport
// ============================================================================

/// Opaque sink for bridge traffic.
///
/// Queued calls are replayed in submission order. Calls made while that
/// replay runs are forwarded directly and may interleave with it. The holder
/// never calls in while holding its gate lock, so implementations may call
/// back into the holder.
pub trait Transport: Send + Sync {
    /// Emits an event. Fire-and-forget.
    fn emit_event(&self, event: BridgeEvent);

    /// Dispatches a request.
    ///
    /// The transport owns `completion` from here on and must answer it
    /// exactly once, eventually.
    fn send_request(&self, request: BridgeRequest, completion: Completion);

    /// Binds a request handler on the transport side.
    ///
    /// Only needed by transports that route remote requests themselves.
    fn bind_request_handler(&self, name: &str, handler: Arc<dyn RequestHandler>) {
        let _ = (name, handler);
    }

    /// Binds an event listener on the transport side.
    ///
    /// Only needed by transports that route remote events themselves.
    fn bind_event_listener(&self, name: &str, id: ListenerId, listener: Arc<dyn EventListener>) {
        let _ = (name, id, listener);
    }
}
