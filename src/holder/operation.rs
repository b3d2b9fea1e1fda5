//! Deferred calls and the queue that holds them.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::collections::vec_deque::Drain;
use std::fmt;
use std::mem;
use std::sync::Arc;

use crate::identifiers::ListenerId;
use crate::protocol::{BridgeEvent, BridgeRequest, Completion};
use crate::registry::{EventListener, RequestHandler};
use crate::transport::Transport;

// ============================================================================
// Operation
// ============================================================================

/// One caller operation, captured so it can be forwarded later.
///
/// Replaying goes through [`Operation::forward`], the same code the ready
/// path uses, so a queued call and an immediate call reach the transport
/// identically.
pub(crate) enum Operation {
    /// `send_event`.
    SendEvent(BridgeEvent),
    /// `send_request`, with the caller's completion.
    SendRequest {
        request: BridgeRequest,
        completion: Completion,
    },
    /// `register_request_handler`.
    RegisterHandler {
        name: String,
        handler: Arc<dyn RequestHandler>,
    },
    /// `add_event_listener`.
    AddListener {
        name: String,
        id: ListenerId,
        listener: Arc<dyn EventListener>,
    },
}

impl Operation {
    /// Short tag for log output.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::SendEvent(_) => "event",
            Self::SendRequest { .. } => "request",
            Self::RegisterHandler { .. } => "handler",
            Self::AddListener { .. } => "listener",
        }
    }

    /// Name the operation targets.
    pub(crate) fn name(&self) -> &str {
        match self {
            Self::SendEvent(event) => &event.name,
            Self::SendRequest { request, .. } => &request.name,
            Self::RegisterHandler { name, .. } | Self::AddListener { name, .. } => name,
        }
    }

    /// Hands the operation to `transport`, consuming it.
    pub(crate) fn forward(self, transport: &dyn Transport) {
        match self {
            Self::SendEvent(event) => transport.emit_event(event),
            Self::SendRequest {
                request,
                completion,
            } => transport.send_request(request, completion),
            Self::RegisterHandler { name, handler } => {
                transport.bind_request_handler(&name, handler);
            }
            Self::AddListener { name, id, listener } => {
                transport.bind_event_listener(&name, id, listener);
            }
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish()
    }
}

// ============================================================================
// PendingQueue
// ============================================================================

/// FIFO buffer of operations waiting for a transport.
#[derive(Debug, Default)]
pub(crate) struct PendingQueue {
    records: VecDeque<Operation>,
}

impl PendingQueue {
    /// Creates an empty queue with room for `capacity` records.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends a record at the back.
    #[inline]
    pub(crate) fn push(&mut self, operation: Operation) {
        self.records.push_back(operation);
    }

    /// Moves every record out, leaving the queue empty.
    #[inline]
    pub(crate) fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Removes records front to back.
    #[inline]
    pub(crate) fn drain(&mut self) -> Drain<'_, Operation> {
        self.records.drain(..)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
