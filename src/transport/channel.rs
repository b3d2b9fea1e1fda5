//! Channel-backed transport with response correlation.
//!
//! Outgoing traffic is pushed as [`Outbound`] messages onto an unbounded
//! tokio channel that the remote runtime's pump drains. In-flight requests
//! wait in a correlation map until the pump answers them with
//! [`ChannelTransport::resolve`].
//!
//! # Lifecycle
//!
//! 1. `ChannelTransport::new` - Create the transport and its receiver
//! 2. `BridgeHolder::set_transport` - Attach it to a holder
//! 3. Pump reads `Outbound` messages and calls `resolve` for requests
//! 4. `ChannelTransport::close` - Fail whatever is still in flight
//!
//! Once the receiver is dropped, the next outbound push fails every
//! in-flight request with [`BridgeFailure::CLOSED`], the same as `close`.
//! Requests sent after that fail immediately.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::{ListenerId, MessageId};
use crate::protocol::{BridgeEvent, BridgeFailure, BridgeRequest, Completion, ResponseResult};
use crate::registry::{EventListener, RequestHandler};

use super::Transport;

// ============================================================================
// Types
// ============================================================================

/// Map of request IDs to their completions.
type CorrelationMap = FxHashMap<MessageId, Completion>;

/// In-flight requests plus the closed flag, guarded together.
#[derive(Default)]
struct Correlation {
    pending: CorrelationMap,
    closed: bool,
}

// ============================================================================
// Outbound
// ============================================================================

/// A message headed for the remote runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// An event to emit.
    Event(BridgeEvent),
    /// A request awaiting [`ChannelTransport::resolve`].
    Request(BridgeRequest),
    /// A local request handler now exists for `name`.
    HandlerBound {
        /// Request name.
        name: String,
    },
    /// A local event listener now exists for `name`.
    ListenerBound {
        /// Event name.
        name: String,
        /// Listener ID.
        id: ListenerId,
    },
}

// ============================================================================
// ChannelTransport
// ============================================================================

/// Transport that hands traffic to a tokio channel.
///
/// # Thread Safety
///
/// `ChannelTransport` is `Send + Sync` and cheap to clone; clones share the
/// channel and the correlation map.
#[derive(Clone)]
pub struct ChannelTransport {
    /// Sender side of the outbound channel.
    outbound_tx: mpsc::UnboundedSender<Outbound>,
    /// In-flight requests.
    correlation: Arc<Mutex<Correlation>>,
}

impl ChannelTransport {
    /// Creates a transport and the receiver the remote pump reads from.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let transport = Self {
            outbound_tx,
            correlation: Arc::new(Mutex::new(Correlation::default())),
        };
        (transport, outbound_rx)
    }

    /// Answers the in-flight request `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if no request with `id` is in flight.
    pub fn resolve(&self, id: MessageId, result: ResponseResult) -> Result<()> {
        let completion = self.correlation.lock().pending.remove(&id);

        match completion {
            Some(completion) => {
                completion.complete(result);
                trace!(%id, "Request resolved");
                Ok(())
            }
            None => {
                warn!(%id, "Response for unknown request");
                Err(Error::protocol(format!("Response for unknown request: {id}")))
            }
        }
    }

    /// Returns the number of in-flight requests.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.correlation.lock().pending.len()
    }

    /// Returns `true` after [`close`](Self::close) or once the receiving side is gone.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.correlation.lock().closed || self.outbound_tx.is_closed()
    }

    /// Fails every in-flight request with [`BridgeFailure::CLOSED`].
    ///
    /// Requests sent afterwards fail immediately.
    pub fn close(&self) {
        self.fail_pending_requests();
    }

    /// Marks the transport closed and fails everything in flight.
    fn fail_pending_requests(&self) {
        let pending: Vec<_> = {
            let mut correlation = self.correlation.lock();
            correlation.closed = true;
            correlation.pending.drain().collect()
        };
        let count = pending.len();

        for (_, completion) in pending {
            completion.fail(BridgeFailure::closed());
        }

        if count > 0 {
            debug!(count, "Failed pending requests on close");
        }
    }

    /// Pushes `message`; a gone receiver closes the transport.
    fn push(&self, message: Outbound) -> bool {
        if self.outbound_tx.send(message).is_ok() {
            return true;
        }
        self.fail_pending_requests();
        false
    }
}

impl Transport for ChannelTransport {
    fn emit_event(&self, event: BridgeEvent) {
        let name = event.name.clone();
        if !self.push(Outbound::Event(event)) {
            warn!(%name, "Outbound channel closed, event dropped");
        }
    }

    fn send_request(&self, request: BridgeRequest, completion: Completion) {
        let id = request.id;

        // Store correlation before sending
        let displaced = {
            let mut correlation = self.correlation.lock();
            if correlation.closed {
                drop(correlation);
                warn!(%id, "Transport closed, request failed");
                completion.fail(BridgeFailure::closed());
                return;
            }
            correlation.pending.insert(id, completion)
        };

        if displaced.is_some() {
            warn!(%id, "Request ID reused, earlier completion dropped");
        }
        drop(displaced);

        if !self.push(Outbound::Request(request)) {
            warn!(%id, "Outbound channel closed, request failed");
            return;
        }

        trace!(%id, "Request sent");
    }

    fn bind_request_handler(&self, name: &str, _handler: Arc<dyn RequestHandler>) {
        if !self.push(Outbound::HandlerBound {
            name: name.to_string(),
        }) {
            warn!(%name, "Outbound channel closed, handler binding dropped");
        }
    }

    fn bind_event_listener(&self, name: &str, id: ListenerId, _listener: Arc<dyn EventListener>) {
        if !self.push(Outbound::ListenerBound {
            name: name.to_string(),
            id,
        }) {
            warn!(%name, "Outbound channel closed, listener binding dropped");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use tokio::sync::oneshot;

    fn oneshot_completion() -> (Completion, oneshot::Receiver<ResponseResult>) {
        let (tx, rx) = oneshot::channel();
        let completion = Completion::new(move |result| {
            let _ = tx.send(result);
        });
        (completion, rx)
    }

    #[tokio::test]
    async fn test_request_round_trip() -> anyhow::Result<()> {
        let (transport, mut outbound) = ChannelTransport::new();
        let (completion, rx) = oneshot_completion();

        transport.send_request(BridgeRequest::new("user.get"), completion);
        assert_eq!(transport.pending_count(), 1);

        let Some(Outbound::Request(request)) = outbound.recv().await else {
            anyhow::bail!("expected a request");
        };
        transport.resolve(request.id, Ok(Some(json!({"name": "Ada"}))))?;

        assert_eq!(rx.await?, Ok(Some(json!({"name": "Ada"}))));
        assert_eq!(transport.pending_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_unknown_id() {
        let (transport, _outbound) = ChannelTransport::new();
        let err = transport
            .resolve(MessageId::generate(), Ok(None))
            .unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[tokio::test]
    async fn test_close_fails_pending() {
        let (transport, _outbound) = ChannelTransport::new();
        let (completion, rx) = oneshot_completion();

        transport.send_request(BridgeRequest::new("user.get"), completion);
        transport.close();

        let failure = rx.await.expect("answered").unwrap_err();
        assert_eq!(failure.code, BridgeFailure::CLOSED);
        assert_eq!(transport.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_dropped_receiver_fails_request() {
        let (transport, outbound) = ChannelTransport::new();
        drop(outbound);
        assert!(transport.is_closed());

        let (completion, rx) = oneshot_completion();
        transport.send_request(BridgeRequest::new("user.get"), completion);

        let failure = rx.await.expect("answered").unwrap_err();
        assert_eq!(failure.code, BridgeFailure::CLOSED);
    }

    #[tokio::test]
    async fn test_dropped_receiver_fails_in_flight_requests() -> anyhow::Result<()> {
        let (transport, mut outbound) = ChannelTransport::new();
        let (first, first_rx) = oneshot_completion();

        transport.send_request(BridgeRequest::new("user.get"), first);
        let Some(Outbound::Request(_)) = outbound.recv().await else {
            anyhow::bail!("expected a request");
        };
        drop(outbound);

        let (second, second_rx) = oneshot_completion();
        transport.send_request(BridgeRequest::new("user.list"), second);

        assert_eq!(first_rx.await?.unwrap_err().code, BridgeFailure::CLOSED);
        assert_eq!(second_rx.await?.unwrap_err().code, BridgeFailure::CLOSED);
        assert_eq!(transport.pending_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_send_after_close_fails_immediately() -> anyhow::Result<()> {
        let (transport, mut outbound) = ChannelTransport::new();
        transport.close();
        assert!(transport.is_closed());

        let (completion, rx) = oneshot_completion();
        transport.send_request(BridgeRequest::new("user.get"), completion);

        assert_eq!(rx.await?.unwrap_err().code, BridgeFailure::CLOSED);
        assert_eq!(transport.pending_count(), 0);
        assert!(outbound.try_recv().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_reused_id_completion_may_resolve() -> anyhow::Result<()> {
        let (transport, _outbound) = ChannelTransport::new();
        let request = BridgeRequest::new("user.get");
        let id = request.id;

        let pump = transport.clone();
        let earlier = Completion::new(move |result: ResponseResult| {
            assert_eq!(result.unwrap_err().code, BridgeFailure::DROPPED);
            pump.resolve(id, Ok(Some(json!("late")))).expect("resolve");
        });
        let (later, rx) = oneshot_completion();

        transport.send_request(request.clone(), earlier);
        transport.send_request(request, later);

        assert_eq!(rx.await?, Ok(Some(json!("late"))));
        assert_eq!(transport.pending_count(), 0);
        Ok(())
    }

    #[test]
    fn test_events_and_bindings_in_order() {
        let (transport, mut outbound) = ChannelTransport::new();
        let id = ListenerId::generate();

        transport.emit_event(BridgeEvent::new("app.ready"));
        transport.bind_request_handler(
            "user.get",
            Arc::new(|_: BridgeRequest, completion: Completion| completion.succeed(None)),
        );
        transport.bind_event_listener("app.ready", id, Arc::new(|_: &BridgeEvent| {}));

        assert!(matches!(outbound.try_recv(), Ok(Outbound::Event(e)) if e.name == "app.ready"));
        assert_eq!(
            outbound.try_recv().ok(),
            Some(Outbound::HandlerBound {
                name: "user.get".into()
            })
        );
        assert_eq!(
            outbound.try_recv().ok(),
            Some(Outbound::ListenerBound {
                name: "app.ready".into(),
                id
            })
        );
        assert!(outbound.try_recv().is_err());
    }
}
