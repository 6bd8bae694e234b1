//! Event message types.
//!
//! Targets push notifications (`Runtime.consoleAPICalled`,
//! `Runtime.executionContextCreated`, ...) on the same socket as replies.
//! Injection does not subscribe to any domain, but a target may still emit
//! events; they are only logged.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// Event
// ============================================================================

/// A notification from a debug target.
///
/// # Format
///
/// ```json
/// { "method": "Domain.event", "params": { ... } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Event name in `Domain.event` format.
    pub method: String,

    /// Event payload.
    #[serde(default)]
    pub params: Value,
}

impl Event {
    /// Returns the domain part of the event name.
    #[inline]
    #[must_use]
    pub fn domain(&self) -> &str {
        self.method
            .split_once('.')
            .map_or(self.method.as_str(), |(domain, _)| domain)
    }
}

// ============================================================================
// Tests
// ============================================================================
