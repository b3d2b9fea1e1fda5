//! Queue-until-ready holder.
//!
//! This module provides the main entry point: a facade that accepts bridge
//! traffic before the transport exists and replays it once it does.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`BridgeHolder`] | The coordinator |
//! | [`BridgeHolderBuilder`] | Fluent configuration builder |
//! | [`BridgeOptions`] | Holder configuration |
//! | [`RebindPolicy`] | Second `set_transport` behavior |
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use bridge_holder::{BridgeHolder, BridgeRequest, RecordingTransport, Result};
//!
//! # fn example() -> Result<()> {
//! let holder = BridgeHolder::builder().label("checkout").build()?;
//!
//! holder.register_request_handler("cart.total", |_request, completion| {
//!     completion.succeed(Some(42.into()));
//! })?;
//! holder.send_request(BridgeRequest::new("user.get"), |result| {
//!     println!("user: {result:?}");
//! })?;
//!
//! holder.set_transport(Arc::new(RecordingTransport::new()))?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for holder configuration.
pub mod builder;

/// Core holder implementation.
pub mod core;

/// Deferred operations and the pending queue.
pub(crate) mod operation;

/// Holder options.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::BridgeHolderBuilder;
pub use self::core::BridgeHolder;
pub use options::{BridgeOptions, DEFAULT_LABEL, DEFAULT_QUEUE_CAPACITY, RebindPolicy};
