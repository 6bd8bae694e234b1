//! Request and Response message types.
//!
//! Defines the message format for commands sent to a debug target and the
//! replies it sends back over the same socket.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

use super::Command;

// ============================================================================
// Constants
// ============================================================================

/// Message id carried by every injected command.
///
/// Injection never correlates replies, so all commands share one id.
pub const INJECTION_REQUEST_ID: u64 = 1;

// ============================================================================
// Request
// ============================================================================

/// A command request sent to a debug target.
///
/// # Format
///
/// ```json
/// {
///   "id": 1,
///   "method": "Domain.method",
///   "params": { ... }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Request {
    /// Message id echoed back in the response.
    pub id: u64,

    /// Command with method and params.
    #[serde(flatten)]
    pub command: Command,
}

impl Request {
    /// Creates a request with the injection id.
    #[inline]
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self::with_id(INJECTION_REQUEST_ID, command)
    }

    /// Creates a request with a specific id.
    #[inline]
    #[must_use]
    pub fn with_id(id: u64, command: Command) -> Self {
        Self { id, command }
    }

    /// Serializes the request into the text frame sent on the socket.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_text(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// Response
// ============================================================================

/// A reply from a debug target.
///
/// # Format
///
/// Success:
/// ```json
/// { "id": 1, "result": { "result": { ... }, "exceptionDetails": { ... } } }
/// ```
///
/// Error:
/// ```json
/// { "id": 1, "error": { "code": -32000, "message": "..." } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// Matches the request `id`.
    pub id: u64,

    /// Result data (if success).
    #[serde(default)]
    pub result: Option<Value>,

    /// Error object (if error).
    #[serde(default)]
    pub error: Option<ResponseError>,
}

/// Error object of a failed command.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseError {
    /// Numeric error code.
    #[serde(default)]
    pub code: i64,

    /// Error message.
    #[serde(default)]
    pub message: String,
}

impl Response {
    /// Returns `true` if this is an error response.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Extracts the result value, returning error if response was error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the response was an error.
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            Some(err) => Err(Error::protocol(format!("{} ({})", err.message, err.code))),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }

    /// Returns the description of an exception thrown by an evaluated script.
    ///
    /// Prefers the exception's own description, falling back to the
    /// summary text of `exceptionDetails`.
    #[must_use]
    pub fn exception_text(&self) -> Option<String> {
        let details = self.result.as_ref()?.get("exceptionDetails")?;

        details
            .get("exception")
            .and_then(|e| e.get("description"))
            .and_then(Value::as_str)
            .or_else(|| details.get("text").and_then(Value::as_str))
            .map(str::to_string)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::RuntimeCommand;

    #[test]
    fn test_request_wire_format() {
        let request = Request::new(Command::Runtime(RuntimeCommand::evaluate("a()")));
        let text = request.to_text().expect("serialize");

        assert_eq!(
            text,
            r#"{"id":1,"method":"Runtime.evaluate","params":{"contextId":1,"doNotPauseOnExceptionsAndMuteConsole":false,"expression":"a()","generatePreview":false,"includeCommandLineAPI":true,"objectGroup":"console","returnByValue":false,"userGesture":true}}"#
        );
    }

    #[test]
    fn test_request_with_id() {
        let request = Request::with_id(7, Command::Runtime(RuntimeCommand::evaluate("x")));
        assert_eq!(request.id, 7);
    }

    #[test]
    fn test_success_response() {
        let json_str = r#"{"id":1,"result":{"result":{"type":"undefined"}}}"#;

        let response: Response = serde_json::from_str(json_str).expect("parse");
        assert!(!response.is_error());
        assert!(response.exception_text().is_none());

        let value = response.into_result().expect("should succeed");
        assert_eq!(value["result"]["type"], "undefined");
    }

    #[test]
    fn test_error_response() {
        let json_str = r#"{"id":1,"error":{"code":-32000,"message":"Cannot find context with specified id"}}"#;

        let response: Response = serde_json::from_str(json_str).expect("parse");
        assert!(response.is_error());

        let err = response.into_result().unwrap_err();
        assert!(err.to_string().contains("Cannot find context"));
    }

    #[test]
    fn test_exception_text_prefers_description() {
        let json_str = r#"{
            "id": 1,
            "result": {
                "result": {"type": "object", "subtype": "error"},
                "exceptionDetails": {
                    "text": "Uncaught",
                    "exception": {"description": "ReferenceError: foo is not defined"}
                }
            }
        }"#;

        let response: Response = serde_json::from_str(json_str).expect("parse");
        assert_eq!(
            response.exception_text().as_deref(),
            Some("ReferenceError: foo is not defined")
        );
    }

    #[test]
    fn test_exception_text_falls_back_to_summary() {
        let json_str = r#"{"id":1,"result":{"exceptionDetails":{"text":"Uncaught SyntaxError"}}}"#;

        let response: Response = serde_json::from_str(json_str).expect("parse");
        assert_eq!(response.exception_text().as_deref(), Some("Uncaught SyntaxError"));
    }
}
