//! Request handler and event listener registrations.
//!
//! A name maps to at most one [`RequestHandler`] and to any number of
//! [`EventListener`]s. Entries live as long as the table; there is no
//! unregister operation.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::identifiers::ListenerId;
use crate::protocol::{BridgeEvent, BridgeRequest, Completion};

// ============================================================================
// Traits
// ============================================================================

/// Handles requests arriving for one name.
///
/// The handler owns the [`Completion`] and must answer it, directly or
/// later from another thread.
///
/// Closures of the form `Fn(BridgeRequest, Completion)` implement this trait.
pub trait RequestHandler: Send + Sync {
    /// Handles one request.
    fn handle(&self, request: BridgeRequest, completion: Completion);
}

impl<F> RequestHandler for F
where
    F: Fn(BridgeRequest, Completion) + Send + Sync,
{
    fn handle(&self, request: BridgeRequest, completion: Completion) {
        self(request, completion);
    }
}

/// Receives events arriving for one name.
///
/// Closures of the form `Fn(&BridgeEvent)` implement this trait.
pub trait EventListener: Send + Sync {
    /// Called once per matching event.
    fn on_event(&self, event: &BridgeEvent);
}

impl<F> EventListener for F
where
    F: Fn(&BridgeEvent) + Send + Sync,
{
    fn on_event(&self, event: &BridgeEvent) {
        self(event);
    }
}

// ============================================================================
// RegistrationTable
// ============================================================================

/// Name → handler and name → listeners mappings.
///
/// Not synchronized on its own; the holder keeps it behind a lock so the
/// duplicate check and the insert happen atomically.
#[derive(Default)]
pub struct RegistrationTable {
    /// At most one handler per name.
    handlers: FxHashMap<String, Arc<dyn RequestHandler>>,
    /// Every listener per name.
    listeners: FxHashMap<String, Vec<(ListenerId, Arc<dyn EventListener>)>>,
}

impl RegistrationTable {
    /// Creates an empty table.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handler` to `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateHandler`] if `name` already has a handler.
    /// The existing handler is kept.
    pub fn bind_handler(&mut self, name: &str, handler: Arc<dyn RequestHandler>) -> Result<()> {
        if self.handlers.contains_key(name) {
            return Err(Error::duplicate_handler(name));
        }
        self.handlers.insert(name.to_string(), handler);
        Ok(())
    }

    /// Adds `listener` under `name` with a caller-chosen ID.
    pub fn add_listener(&mut self, name: &str, id: ListenerId, listener: Arc<dyn EventListener>) {
        self.listeners
            .entry(name.to_string())
            .or_default()
            .push((id, listener));
    }

    /// Returns the handler bound to `name`.
    #[must_use]
    pub fn handler(&self, name: &str) -> Option<Arc<dyn RequestHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Returns a snapshot of the listeners for `name`.
    ///
    /// The snapshot lets callers invoke listeners without holding a lock.
    #[must_use]
    pub fn listeners(&self, name: &str) -> Vec<Arc<dyn EventListener>> {
        self.listeners
            .get(name)
            .map(|entries| entries.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default()
    }

    /// Returns `true` if `name` has a handler.
    #[inline]
    #[must_use]
    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Returns the number of bound handlers.
    #[inline]
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Returns the number of listeners for `name`.
    #[inline]
    #[must_use]
    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.get(name).map_or(0, Vec::len)
    }
}

impl fmt::Debug for RegistrationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationTable")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field(
                "listeners",
                &self
                    .listeners
                    .iter()
                    .map(|(name, l)| (name, l.len()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
