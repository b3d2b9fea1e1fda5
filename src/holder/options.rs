//! Holder configuration options.
//!
//! # Example
//!
//! ```ignore
//! use bridge_holder::{BridgeOptions, RebindPolicy};
//!
//! let options = BridgeOptions::new()
//!     .with_label("checkout")
//!     .with_rebind_policy(RebindPolicy::Ignore);
//! ```

// ============================================================================
// Constants
// ============================================================================

/// Label used when none is configured.
pub const DEFAULT_LABEL: &str = "bridge";

/// Initial allocation of the pending queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

// ============================================================================
// RebindPolicy
// ============================================================================

/// What a second `set_transport` call does.
///
/// Neither policy re-drains, swaps the transport, or touches registrations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RebindPolicy {
    /// Return [`Error::TransportAlreadyBound`](crate::Error::TransportAlreadyBound).
    #[default]
    Reject,
    /// Return `Ok(())` and keep the first transport.
    Ignore,
}

// ============================================================================
// BridgeOptions
// ============================================================================

/// Holder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeOptions {
    /// Instance name attached to every log line.
    pub label: String,

    /// Behavior of a second `set_transport`.
    pub rebind_policy: RebindPolicy,

    /// Initial pending queue allocation. Not a bound.
    pub queue_capacity: usize,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            rebind_policy: RebindPolicy::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Sets the label.
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the rebind policy.
    #[inline]
    #[must_use]
    pub fn with_rebind_policy(mut self, policy: RebindPolicy) -> Self {
        self.rebind_policy = policy;
        self
    }

    /// Sets the initial queue allocation.
    #[inline]
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = BridgeOptions::default();
        assert_eq!(options.label, DEFAULT_LABEL);
        assert_eq!(options.rebind_policy, RebindPolicy::Reject);
        assert_eq!(options.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_builder_methods() {
        let options = BridgeOptions::new()
            .with_label("checkout")
            .with_rebind_policy(RebindPolicy::Ignore)
            .with_queue_capacity(8);

        assert_eq!(options.label, "checkout");
        assert_eq!(options.rebind_policy, RebindPolicy::Ignore);
        assert_eq!(options.queue_capacity, 8);
    }
}
