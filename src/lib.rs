//! Bridge Holder - Queue-until-ready facade for a cross-runtime message bridge.
//!
//! Native code often needs to talk to another runtime (a JavaScript engine,
//! a scripting VM) whose bridge comes up later than the code that wants to
//! use it. This crate lets that code send events, issue requests and
//! register handlers immediately; everything is queued and replayed in
//! order once the transport is attached.
//!
//! # Architecture
//!
//! ```text
//! caller ──► BridgeHolder ──► gate? ──ready──► Transport
//!                               │
//!                               └─not ready──► PendingQueue ──drain on set_transport──┘
//! ```
//!
//! Key guarantees:
//!
//! - Queued operations reach the transport exactly once, in submission order
//! - Each accepted request's completion runs exactly once
//! - A request name has at most one handler
//! - The transport is attached once; a second attach never re-drains
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use bridge_holder::{BridgeEvent, BridgeHolder, RecordingTransport, Result};
//!
//! fn main() -> Result<()> {
//!     let holder = BridgeHolder::new();
//!
//!     // Before the bridge exists: queued
//!     holder.send_event(BridgeEvent::new("app.started"))?;
//!     holder.add_event_listener("user.loggedIn", |event| {
//!         println!("logged in: {:?}", event.data);
//!     })?;
//!
//!     // Bridge comes up: queue drains in order
//!     let transport = Arc::new(RecordingTransport::new());
//!     holder.set_transport(transport.clone())?;
//!     assert_eq!(transport.names(), vec!["app.started", "user.loggedIn"]);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`holder`] | [`BridgeHolder`] and its configuration |
//! | [`protocol`] | Events, requests, failures, completions |
//! | [`registry`] | Handler and listener registrations |
//! | [`transport`] | [`Transport`] trait and adapters |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Queue-until-ready holder.
///
/// Use [`BridgeHolder::new()`] or [`BridgeHolder::builder()`].
pub mod holder;

/// Type-safe identifiers for messages and listeners.
pub mod identifiers;

/// Bridge payload types.
pub mod protocol;

/// Request handler and event listener registrations.
pub mod registry;

/// Transport boundary.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Holder types
pub use holder::{BridgeHolder, BridgeHolderBuilder, BridgeOptions, RebindPolicy};

// Payload types
pub use protocol::{BridgeEvent, BridgeFailure, BridgeRequest, Completion, ResponseResult};

// Registration types
pub use registry::{EventListener, RequestHandler};

// Transport types
pub use transport::{ChannelTransport, Outbound, RecordingTransport, Transport, TransportCall};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ListenerId, MessageId};
