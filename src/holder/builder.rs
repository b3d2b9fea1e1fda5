//! Builder pattern for holder configuration.
//!
//! Provides a fluent API for configuring and creating [`BridgeHolder`] instances.
//!
//! # Example
//!
//! ```
//! use bridge_holder::{BridgeHolder, RebindPolicy};
//!
//! # fn example() -> bridge_holder::Result<()> {
//! let holder = BridgeHolder::builder()
//!     .label("checkout")
//!     .rebind_policy(RebindPolicy::Ignore)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};

use super::core::BridgeHolder;
use super::options::{BridgeOptions, RebindPolicy};

// ============================================================================
// BridgeHolderBuilder
// ============================================================================

/// Builder for configuring a [`BridgeHolder`] instance.
///
/// Use [`BridgeHolder::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct BridgeHolderBuilder {
    /// Options being assembled.
    options: BridgeOptions,
}

// ============================================================================
// BridgeHolderBuilder Implementation
// ============================================================================

impl BridgeHolderBuilder {
    /// Creates a new builder with default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the instance label used in log output.
    #[inline]
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.options.label = label.into();
        self
    }

    /// Sets what a second `set_transport` call does.
    #[inline]
    #[must_use]
    pub fn rebind_policy(mut self, policy: RebindPolicy) -> Self {
        self.options.rebind_policy = policy;
        self
    }

    /// Sets the initial pending queue allocation.
    #[inline]
    #[must_use]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.options.queue_capacity = capacity;
        self
    }

    /// Replaces all options at once.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: BridgeOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the holder with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the label is empty
    pub fn build(self) -> Result<BridgeHolder> {
        if self.options.label.trim().is_empty() {
            return Err(Error::config("Holder label cannot be empty"));
        }
        Ok(BridgeHolder::from_options(self.options))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_default() {
        let holder = BridgeHolderBuilder::new().build().expect("build");
        assert_eq!(holder.label(), "bridge");
        assert!(!holder.is_ready());
    }

    #[test]
    fn test_builder_options() {
        let holder = BridgeHolder::builder()
            .label("checkout")
            .rebind_policy(RebindPolicy::Ignore)
            .queue_capacity(4)
            .build()
            .expect("build");

        assert_eq!(holder.label(), "checkout");
        assert_eq!(holder.options().rebind_policy, RebindPolicy::Ignore);
        assert_eq!(holder.options().queue_capacity, 4);
    }

    #[test]
    fn test_builder_rejects_empty_label() {
        let result = BridgeHolder::builder().label("  ").build();
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_builder_from_options() {
        let options = BridgeOptions::new().with_label("settings");
        let holder = BridgeHolder::builder()
            .options(options)
            .build()
            .expect("build");
        assert_eq!(holder.label(), "settings");
    }
}
