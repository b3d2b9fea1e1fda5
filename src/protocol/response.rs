//! Response failures and one-shot completions.
//!
//! Every accepted request is answered through a [`Completion`]. A completion
//! runs its callback at most once because completing consumes it, and at
//! least once because dropping an uncompleted one reports
//! [`BridgeFailure::DROPPED`].

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::result::Result as StdResult;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

// ============================================================================
// Types
// ============================================================================

/// Outcome delivered to a request's completion.
pub type ResponseResult = StdResult<Option<Value>, BridgeFailure>;

/// Boxed response callback.
type Callback = Box<dyn FnOnce(ResponseResult) + Send + 'static>;

// ============================================================================
// BridgeFailure
// ============================================================================

/// Failure side of a response.
///
/// # Format
///
/// ```json
/// {
///   "code": "NO_HANDLER",
///   "message": "No request handler registered for: user.get"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeFailure {
    /// Failure code.
    pub code: String,

    /// Human readable description.
    pub message: String,
}

impl BridgeFailure {
    /// The request was rejected before forwarding.
    pub const MALFORMED: &'static str = "MALFORMED";

    /// No handler is bound for the request name.
    pub const NO_HANDLER: &'static str = "NO_HANDLER";

    /// The completion was dropped without a response.
    pub const DROPPED: &'static str = "DROPPED";

    /// The transport closed while the request was in flight.
    pub const CLOSED: &'static str = "CLOSED";

    /// Creates a failure with an arbitrary code.
    #[inline]
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a failure for a request that could not be forwarded.
    #[inline]
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(Self::MALFORMED, message)
    }

    /// Creates a failure for a request nobody handles.
    #[inline]
    #[must_use]
    pub fn no_handler(name: &str) -> Self {
        Self::new(
            Self::NO_HANDLER,
            format!("No request handler registered for: {name}"),
        )
    }

    /// Creates a failure for a completion dropped without a response.
    #[inline]
    #[must_use]
    pub fn dropped() -> Self {
        Self::new(Self::DROPPED, "Completion dropped without a response")
    }

    /// Creates a failure for a transport that went away.
    #[inline]
    #[must_use]
    pub fn closed() -> Self {
        Self::new(Self::CLOSED, "Transport closed")
    }
}

impl fmt::Display for BridgeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

// ============================================================================
// Completion
// ============================================================================

/// One-shot response callback.
///
/// Travels with its request from the caller, through the pending queue, to
/// the transport. Whoever holds it last answers it.
///
/// # Example
///
/// ```ignore
/// let completion = Completion::new(|result| match result {
///     Ok(data) => println!("got {data:?}"),
///     Err(failure) => eprintln!("failed: {failure}"),
/// });
/// completion.succeed(None);
/// ```
pub struct Completion {
    callback: Option<Callback>,
}

impl Completion {
    /// Wraps a response callback.
    #[must_use]
    pub fn new<F>(callback: F) -> Self
    where
        F: FnOnce(ResponseResult) + Send + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// Answers with a success value.
    #[inline]
    pub fn succeed(self, data: Option<Value>) {
        self.complete(Ok(data));
    }

    /// Answers with a failure.
    #[inline]
    pub fn fail(self, failure: BridgeFailure) {
        self.complete(Err(failure));
    }

    /// Answers with `result`.
    pub fn complete(mut self, result: ResponseResult) {
        if let Some(callback) = self.callback.take() {
            callback(result);
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            warn!("Completion dropped without a response");
            callback(Err(BridgeFailure::dropped()));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use serde_json::json;

    fn recording() -> (Completion, Arc<Mutex<Vec<ResponseResult>>>) {
        let results = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&results);
        let completion = Completion::new(move |result| sink.lock().push(result));
        (completion, results)
    }

    #[test]
    fn test_succeed_runs_once() {
        let (completion, results) = recording();
        completion.succeed(Some(json!(1)));

        let results = results.lock();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0], Ok(Some(json!(1))));
    }

    #[test]
    fn test_fail_runs_once() {
        let (completion, results) = recording();
        completion.fail(BridgeFailure::new("E1", "boom"));

        let results = results.lock();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0], Err(BridgeFailure::new("E1", "boom")));
    }

    #[test]
    fn test_drop_reports_dropped() {
        let (completion, results) = recording();
        drop(completion);

        let results = results.lock();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].as_ref().unwrap_err().code,
            BridgeFailure::DROPPED
        );
    }

    #[test]
    fn test_complete_then_drop_is_single_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let completion = Completion::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        completion.succeed(None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_display() {
        let failure = BridgeFailure::no_handler("user.get");
        assert_eq!(
            failure.to_string(),
            "NO_HANDLER: No request handler registered for: user.get"
        );
    }

    #[test]
    fn test_failure_deserialization() {
        let failure: BridgeFailure =
            serde_json::from_str(r#"{"code": "E9", "message": "nope"}"#).expect("parse");
        assert_eq!(failure, BridgeFailure::new("E9", "nope"));
    }
}
