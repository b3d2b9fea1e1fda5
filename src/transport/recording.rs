//! Transport that records every call.
//!
//! Useful wherever a test needs to see exactly what reached the transport,
//! and in which order. Requests are answered by an optional responder or
//! held until [`RecordingTransport::complete_held`] is called.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::identifiers::ListenerId;
use crate::protocol::{BridgeEvent, BridgeRequest, Completion, ResponseResult};
use crate::registry::{EventListener, RequestHandler};

use super::Transport;

// ============================================================================
// Types
// ============================================================================

/// Computes the answer for a request.
type Responder = Box<dyn Fn(&BridgeRequest) -> ResponseResult + Send + Sync>;

// ============================================================================
// TransportCall
// ============================================================================

/// One call observed by a [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    /// `emit_event` was called.
    Event(BridgeEvent),
    /// `send_request` was called.
    Request(BridgeRequest),
    /// `bind_request_handler` was called.
    HandlerBound(String),
    /// `bind_event_listener` was called.
    ListenerBound(String),
}

impl TransportCall {
    /// Returns the event, request or registration name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Event(event) => &event.name,
            Self::Request(request) => &request.name,
            Self::HandlerBound(name) | Self::ListenerBound(name) => name,
        }
    }
}

// ============================================================================
// RecordingTransport
// ============================================================================

/// Transport that keeps an ordered log of its calls.
#[derive(Default)]
pub struct RecordingTransport {
    /// Every call, in arrival order.
    calls: Mutex<Vec<TransportCall>>,
    /// Completions waiting for `complete_held`.
    held: Mutex<Vec<Completion>>,
    /// Answers requests immediately when set.
    responder: Option<Responder>,
}

impl RecordingTransport {
    /// Creates a transport that holds every request.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport that answers each request with `responder`.
    #[must_use]
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&BridgeRequest) -> ResponseResult + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(responder)),
            ..Self::default()
        }
    }

    /// Returns a copy of the call log.
    #[must_use]
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().clone()
    }

    /// Returns the names of all calls, in order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .map(|call| call.name().to_string())
            .collect()
    }

    /// Returns the number of calls.
    #[inline]
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the number of unanswered requests.
    #[inline]
    #[must_use]
    pub fn held_count(&self) -> usize {
        self.held.lock().len()
    }

    /// Answers every held request with `result`.
    ///
    /// Returns how many were answered.
    pub fn complete_held(&self, result: ResponseResult) -> usize {
        let held: Vec<_> = self.held.lock().drain(..).collect();
        let count = held.len();
        for completion in held {
            completion.complete(result.clone());
        }
        count
    }

    fn record(&self, call: TransportCall) {
        self.calls.lock().push(call);
    }
}

impl Transport for RecordingTransport {
    fn emit_event(&self, event: BridgeEvent) {
        self.record(TransportCall::Event(event));
    }

    fn send_request(&self, request: BridgeRequest, completion: Completion) {
        self.record(TransportCall::Request(request.clone()));

        match &self.responder {
            Some(responder) => completion.complete(responder(&request)),
            None => self.held.lock().push(completion),
        }
    }

    fn bind_request_handler(&self, name: &str, _handler: Arc<dyn RequestHandler>) {
        self.record(TransportCall::HandlerBound(name.to_string()));
    }

    fn bind_event_listener(&self, name: &str, _id: ListenerId, _listener: Arc<dyn EventListener>) {
        self.record(TransportCall::ListenerBound(name.to_string()));
    }
}

impl fmt::Debug for RecordingTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingTransport")
            .field("calls", &self.call_count())
            .field("held", &self.held_count())
            .field("responder", &self.responder.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use crate::protocol::BridgeFailure;

    #[test]
    fn test_records_in_order() {
        let transport = RecordingTransport::new();
        transport.emit_event(BridgeEvent::new("a"));
        transport.bind_request_handler(
            "b",
            Arc::new(|_: BridgeRequest, completion: Completion| completion.succeed(None)),
        );
        transport.bind_event_listener("c", ListenerId::generate(), Arc::new(|_: &BridgeEvent| {}));

        assert_eq!(transport.names(), vec!["a", "b", "c"]);
        assert_eq!(transport.call_count(), 3);
    }

    #[test]
    fn test_responder_answers_immediately() {
        let transport = RecordingTransport::with_responder(|request| Ok(request.data.clone()));
        let answered = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&answered);

        transport.send_request(
            BridgeRequest::new("echo").with_data(json!(1)),
            Completion::new(move |result| {
                assert_eq!(result, Ok(Some(json!(1))));
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(answered.load(Ordering::SeqCst), 1);
        assert_eq!(transport.held_count(), 0);
    }

    #[test]
    fn test_held_until_completed() {
        let transport = RecordingTransport::new();
        let failures = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let failures = Arc::clone(&failures);
            transport.send_request(
                BridgeRequest::new("slow"),
                Completion::new(move |result| {
                    if result.is_err() {
                        failures.fetch_add(1, Ordering::SeqCst);
                    }
                }),
            );
        }

        assert_eq!(transport.held_count(), 2);
        assert_eq!(failures.load(Ordering::SeqCst), 0);

        let answered = transport.complete_held(Err(BridgeFailure::new("E1", "remote failure")));
        assert_eq!(answered, 2);
        assert_eq!(failures.load(Ordering::SeqCst), 2);
    }
}
