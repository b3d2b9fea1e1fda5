//! Core holder implementation.
//!
//! # Readiness Gate
//!
//! ```text
//! NotReady(queue) ──set_transport──► Ready(transport)
//! ```
//!
//! Every public operation inspects the gate under the same lock that moves
//! it. While `NotReady`, operations are appended to the queue; once `Ready`
//! they are forwarded directly. `set_transport` swaps the queue out and flips
//! the gate in one critical section, then replays the batch outside the lock.
//! A record is therefore either in the swapped batch or sees `Ready`, never
//! both and never neither.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::ListenerId;
use crate::protocol::{
    BridgeEvent, BridgeFailure, BridgeRequest, Completion, ResponseResult, saturating_millis,
    validate_name,
};
use crate::registry::{EventListener, RegistrationTable, RequestHandler};
use crate::transport::Transport;

use super::builder::BridgeHolderBuilder;
use super::operation::{Operation, PendingQueue};
use super::options::{BridgeOptions, RebindPolicy};

// ============================================================================
// Gate
// ============================================================================

/// Readiness state.
enum Gate {
    /// No transport yet; operations queue.
    NotReady(PendingQueue),
    /// Operations go straight to the transport.
    Ready(Arc<dyn Transport>),
}

impl Gate {
    fn state_name(&self) -> &'static str {
        match self {
            Self::NotReady(_) => "not_ready",
            Self::Ready(_) => "ready",
        }
    }

    fn pending(&self) -> usize {
        match self {
            Self::NotReady(queue) => queue.len(),
            Self::Ready(_) => 0,
        }
    }
}

// ============================================================================
// BridgeHolder
// ============================================================================

/// Internal shared state for a holder.
struct HolderInner {
    /// Configuration.
    options: BridgeOptions,
    /// Readiness gate and pending queue.
    gate: Mutex<Gate>,
    /// Handler and listener registrations.
    registry: RwLock<RegistrationTable>,
}

/// Queue-until-ready facade in front of a [`Transport`].
///
/// Accepts events, requests and registrations at any time. Until
/// [`set_transport`](Self::set_transport) is called they are queued; after
/// that they are forwarded directly.
///
/// # Thread Safety
///
/// `BridgeHolder` is `Send + Sync` and cheap to clone; clones share state.
/// No operation blocks waiting for the transport.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use bridge_holder::{BridgeEvent, BridgeHolder, RecordingTransport};
///
/// # fn example() -> bridge_holder::Result<()> {
/// let holder = BridgeHolder::new();
/// holder.send_event(BridgeEvent::new("app.started"))?;
/// assert_eq!(holder.pending_count(), 1);
///
/// let transport = Arc::new(RecordingTransport::new());
/// holder.set_transport(transport.clone())?;
/// assert_eq!(transport.names(), vec!["app.started"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BridgeHolder {
    inner: Arc<HolderInner>,
}

impl fmt::Debug for BridgeHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gate = self.inner.gate.lock();
        f.debug_struct("BridgeHolder")
            .field("label", &self.inner.options.label)
            .field("state", &gate.state_name())
            .field("pending", &gate.pending())
            .finish_non_exhaustive()
    }
}

impl Default for BridgeHolder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// BridgeHolder - Constructors
// ============================================================================

impl BridgeHolder {
    /// Creates a holder with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::from_options(BridgeOptions::default())
    }

    /// Creates a builder for a configured holder.
    #[inline]
    #[must_use]
    pub fn builder() -> BridgeHolderBuilder {
        BridgeHolderBuilder::new()
    }

    /// Returns the process-wide holder, creating it on first use.
    ///
    /// Independent holders from [`new`](Self::new) never share state with it.
    pub fn global() -> &'static BridgeHolder {
        static GLOBAL: OnceLock<BridgeHolder> = OnceLock::new();
        GLOBAL.get_or_init(BridgeHolder::new)
    }

    pub(crate) fn from_options(options: BridgeOptions) -> Self {
        let queue = PendingQueue::with_capacity(options.queue_capacity);
        Self {
            inner: Arc::new(HolderInner {
                options,
                gate: Mutex::new(Gate::NotReady(queue)),
                registry: RwLock::new(RegistrationTable::new()),
            }),
        }
    }
}

// ============================================================================
// BridgeHolder - Accessors
// ============================================================================

impl BridgeHolder {
    /// Returns the instance label.
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.inner.options.label
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &BridgeOptions {
        &self.inner.options
    }

    /// Returns `true` once the transport is attached.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(*self.inner.gate.lock(), Gate::Ready(_))
    }

    /// Returns the number of queued operations.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.gate.lock().pending()
    }

    /// Returns `true` if a request handler is bound to `name`.
    #[must_use]
    pub fn has_request_handler(&self, name: &str) -> bool {
        self.inner.registry.read().has_handler(name)
    }

    /// Returns the number of event listeners for `name`.
    #[must_use]
    pub fn listener_count(&self, name: &str) -> usize {
        self.inner.registry.read().listener_count(name)
    }
}

// ============================================================================
// BridgeHolder - Outbound API
// ============================================================================

impl BridgeHolder {
    /// Sends a fire-and-forget event.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedOperation`] if the event name is blank
    pub fn send_event(&self, event: BridgeEvent) -> Result<()> {
        validate_name("event", &event.name)?;
        self.submit(Operation::SendEvent(event));
        Ok(())
    }

    /// Sends a request; `completion` runs exactly once with the outcome.
    ///
    /// The completion is not invoked while the request is queued.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedOperation`] if the request name is blank. The
    ///   completion has then already run with a [`BridgeFailure::MALFORMED`]
    ///   failure.
    pub fn send_request<F>(&self, request: BridgeRequest, completion: F) -> Result<()>
    where
        F: FnOnce(ResponseResult) + Send + 'static,
    {
        self.send_request_with(request, Completion::new(completion))
    }

    /// Same as [`send_request`](Self::send_request) with a prebuilt [`Completion`].
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedOperation`] if the request name is blank
    pub fn send_request_with(&self, request: BridgeRequest, completion: Completion) -> Result<()> {
        if let Err(e) = validate_name("request", &request.name) {
            completion.fail(BridgeFailure::malformed(e.to_string()));
            return Err(e);
        }
        self.submit(Operation::SendRequest {
            request,
            completion,
        });
        Ok(())
    }

    /// Sends a request and waits for its response.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedOperation`] if the request name is blank
    /// - [`Error::RequestDelivery`] if the response is a failure
    /// - [`Error::ChannelClosed`] if the completion vanished unanswered
    pub async fn request(&self, request: BridgeRequest) -> Result<Option<Value>> {
        let response_rx = self.request_channel(request)?;
        Ok(response_rx.await??)
    }

    /// Sends a request and waits at most `request_timeout` for its response.
    ///
    /// Expiry only stops the wait; the request itself stays in flight.
    ///
    /// # Errors
    ///
    /// Same as [`request`](Self::request), plus [`Error::Timeout`].
    pub async fn request_with_timeout(
        &self,
        request: BridgeRequest,
        request_timeout: Duration,
    ) -> Result<Option<Value>> {
        let name = request.name.clone();
        let response_rx = self.request_channel(request)?;

        match timeout(request_timeout, response_rx).await {
            Ok(result) => Ok(result??),
            Err(_) => {
                debug!(label = %self.label(), %name, "Stopped waiting for response");
                Err(Error::timeout(
                    format!("request {name}"),
                    saturating_millis(request_timeout),
                ))
            }
        }
    }

    fn request_channel(
        &self,
        request: BridgeRequest,
    ) -> Result<oneshot::Receiver<ResponseResult>> {
        let (response_tx, response_rx) = oneshot::channel();
        self.send_request(request, move |result| {
            let _ = response_tx.send(result);
        })?;
        Ok(response_rx)
    }
}

// ============================================================================
// BridgeHolder - Registration API
// ============================================================================

impl BridgeHolder {
    /// Binds a request handler closure to `name`.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedOperation`] if `name` is blank
    /// - [`Error::DuplicateHandler`] if `name` already has a handler
    pub fn register_request_handler<F>(&self, name: impl Into<String>, handler: F) -> Result<()>
    where
        F: Fn(BridgeRequest, Completion) + Send + Sync + 'static,
    {
        self.register_shared_handler(name, Arc::new(handler))
    }

    /// Binds a shared [`RequestHandler`] to `name`.
    ///
    /// The uniqueness check happens now, whether or not the transport is
    /// attached; the transport-side binding is queued like any other call.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedOperation`] if `name` is blank
    /// - [`Error::DuplicateHandler`] if `name` already has a handler
    pub fn register_shared_handler(
        &self,
        name: impl Into<String>,
        handler: Arc<dyn RequestHandler>,
    ) -> Result<()> {
        let name = name.into();
        validate_name("handler", &name)?;

        if let Err(e) = self
            .inner
            .registry
            .write()
            .bind_handler(&name, Arc::clone(&handler))
        {
            warn!(label = %self.label(), %name, "Request handler already registered");
            return Err(e);
        }

        debug!(label = %self.label(), %name, "Request handler registered");
        self.submit(Operation::RegisterHandler { name, handler });
        Ok(())
    }

    /// Adds an event listener closure under `name`.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedOperation`] if `name` is blank
    pub fn add_event_listener<F>(&self, name: impl Into<String>, listener: F) -> Result<ListenerId>
    where
        F: Fn(&BridgeEvent) + Send + Sync + 'static,
    {
        self.add_shared_listener(name, Arc::new(listener))
    }

    /// Adds a shared [`EventListener`] under `name`.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedOperation`] if `name` is blank
    pub fn add_shared_listener(
        &self,
        name: impl Into<String>,
        listener: Arc<dyn EventListener>,
    ) -> Result<ListenerId> {
        let name = name.into();
        validate_name("listener", &name)?;

        let id = ListenerId::generate();
        self.inner
            .registry
            .write()
            .add_listener(&name, id, Arc::clone(&listener));

        debug!(label = %self.label(), %name, %id, "Event listener added");
        self.submit(Operation::AddListener { name, id, listener });
        Ok(id)
    }
}

// ============================================================================
// BridgeHolder - Inbound API
// ============================================================================

impl BridgeHolder {
    /// Delivers a remote event to every listener registered for its name.
    ///
    /// Returns how many listeners ran.
    pub fn dispatch_event(&self, event: &BridgeEvent) -> usize {
        let listeners = self.inner.registry.read().listeners(&event.name);

        if listeners.is_empty() {
            debug!(label = %self.label(), name = %event.name, "No listener for event");
            return 0;
        }

        for listener in &listeners {
            listener.on_event(event);
        }

        trace!(label = %self.label(), name = %event.name, count = listeners.len(), "Event dispatched");
        listeners.len()
    }

    /// Routes a remote request to the handler bound to its name.
    ///
    /// Without a handler the completion fails with
    /// [`BridgeFailure::NO_HANDLER`].
    pub fn dispatch_request(&self, request: BridgeRequest, completion: Completion) {
        let handler = self.inner.registry.read().handler(&request.name);

        match handler {
            Some(handler) => {
                trace!(label = %self.label(), name = %request.name, id = %request.id, "Request dispatched");
                handler.handle(request, completion);
            }
            None => {
                warn!(label = %self.label(), name = %request.name, "No request handler found");
                completion.fail(BridgeFailure::no_handler(&request.name));
            }
        }
    }
}

// ============================================================================
// BridgeHolder - Readiness
// ============================================================================

impl BridgeHolder {
    /// Attaches the transport and replays everything queued so far.
    ///
    /// The gate turns ready before the replay starts, so this returns once
    /// the queued batch is forwarded no matter how busy other callers are.
    /// Operations submitted meanwhile from other threads take the ready path
    /// and may reach the transport ahead of the batch's tail.
    ///
    /// If the transport panics mid-replay the holder stays ready; records not
    /// yet replayed are dropped, which fails queued requests with
    /// [`BridgeFailure::DROPPED`].
    ///
    /// # Errors
    ///
    /// - [`Error::TransportAlreadyBound`] on a second call under
    ///   [`RebindPolicy::Reject`]. Nothing is re-drained either way.
    pub fn set_transport(&self, transport: Arc<dyn Transport>) -> Result<()> {
        let mut batch = {
            let mut gate = self.inner.gate.lock();
            let Gate::NotReady(queue) = &mut *gate else {
                return self.reject_rebind();
            };
            let batch = queue.take();
            *gate = Gate::Ready(Arc::clone(&transport));
            batch
        };

        let pending = batch.len();
        debug!(label = %self.label(), pending, "Transport attached, draining queue");

        for operation in batch.drain() {
            trace!(label = %self.label(), kind = operation.kind(), name = operation.name(), "Replaying operation");
            operation.forward(transport.as_ref());
        }

        debug!(label = %self.label(), replayed = pending, "Drain complete");
        Ok(())
    }

    fn reject_rebind(&self) -> Result<()> {
        match self.inner.options.rebind_policy {
            RebindPolicy::Reject => {
                warn!(label = %self.label(), "Transport already bound, ignoring");
                Err(Error::transport_already_bound(self.label()))
            }
            RebindPolicy::Ignore => {
                debug!(label = %self.label(), "Transport already bound, ignoring");
                Ok(())
            }
        }
    }

    /// Forwards `operation` if ready, queues it otherwise.
    fn submit(&self, operation: Operation) {
        let transport = {
            let mut gate = self.inner.gate.lock();
            match &mut *gate {
                Gate::NotReady(queue) => {
                    trace!(
                        label = %self.label(),
                        kind = operation.kind(),
                        name = operation.name(),
                        pending = queue.len() + 1,
                        "Operation queued"
                    );
                    queue.push(operation);
                    return;
                }
                Gate::Ready(transport) => Arc::clone(transport),
            }
        };

        trace!(label = %self.label(), kind = operation.kind(), name = operation.name(), "Operation forwarded");
        operation.forward(transport.as_ref());
    }
}

// ============================================================================
// Tests
// ============================================================================
