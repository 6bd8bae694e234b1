//! Debug target descriptors returned by the listing endpoint.
//!
//! `GET /json/list` answers with one descriptor per inspectable target:
//!
//! ```json
//! [
//!   {
//!     "id": "E3B0C442...",
//!     "type": "page",
//!     "title": "Slack",
//!     "url": "app://resources/index.html",
//!     "webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/page/E3B0C442..."
//!   }
//! ]
//! ```
//!
//! Only `page` targets with a socket URL can receive injected scripts;
//! service workers, iframes and targets already attached to another
//! debugger (which drop `webSocketDebuggerUrl`) are filtered out.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

use crate::error::{Error, Result};
use crate::identifiers::TargetId;

// ============================================================================
// Constants
// ============================================================================

/// Target kind of a top-level window.
pub const PAGE_KIND: &str = "page";

// ============================================================================
// DebugTarget
// ============================================================================

/// One entry of the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DebugTarget {
    /// Target id.
    pub id: TargetId,

    /// Target kind (`page`, `service_worker`, `iframe`, ...).
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Socket address for protocol commands.
    #[serde(rename = "webSocketDebuggerUrl", default)]
    pub web_socket_debugger_url: Option<String>,

    /// Window title, for logging.
    #[serde(default)]
    pub title: String,

    /// Loaded document URL, for logging.
    #[serde(default)]
    pub url: String,
}

impl DebugTarget {
    /// Returns `true` if the target is a top-level page.
    #[inline]
    #[must_use]
    pub fn is_page(&self) -> bool {
        self.kind == PAGE_KIND
    }

    /// Returns the socket URL if present and non-empty.
    #[inline]
    #[must_use]
    pub fn socket_url(&self) -> Option<&str> {
        self.web_socket_debugger_url
            .as_deref()
            .filter(|url| !url.is_empty())
    }

    /// Returns `true` if scripts can be injected into this target.
    #[inline]
    #[must_use]
    pub fn is_injectable(&self) -> bool {
        self.is_page() && self.socket_url().is_some()
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parses a listing body into target descriptors.
///
/// The body must be a JSON array. Individual entries that are not valid
/// descriptors (e.g. `null`, or missing `id`) are skipped rather than
/// failing the whole listing.
///
/// # Errors
///
/// - [`Error::Json`] if the body is not JSON
/// - [`Error::Endpoint`] if the body is JSON but not an array
pub fn parse_listing(body: &str) -> Result<Vec<DebugTarget>> {
    let value: Value = serde_json::from_str(body)?;

    let Value::Array(entries) = value else {
        return Err(Error::endpoint("listing is not a JSON array"));
    };

    let targets = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<DebugTarget>(entry) {
            Ok(target) => Some(target),
            Err(e) => {
                trace!(error = %e, "Skipping malformed listing entry");
                None
            }
        })
        .collect();

    Ok(targets)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_mixed_kinds() {
        let body = r#"[
            {"id":"A","type":"page","webSocketDebuggerUrl":"ws://127.0.0.1:1/devtools/page/A"},
            {"id":"B","type":"service_worker","webSocketDebuggerUrl":"ws://127.0.0.1:1/devtools/page/B"},
            {"id":"C","type":"page"},
            {"id":"D","type":"page","webSocketDebuggerUrl":""}
        ]"#;

        let targets = parse_listing(body).expect("parse");
        assert_eq!(targets.len(), 4);

        let injectable: Vec<_> = targets
            .iter()
            .filter(|t| t.is_injectable())
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(injectable, vec!["A"]);
    }

    #[test]
    fn test_parse_listing_empty_array() {
        assert!(parse_listing("[]").expect("parse").is_empty());
    }

    #[test]
    fn test_parse_listing_skips_bad_entries() {
        let body = r#"[null, {"type":"page"}, {"id":"A","type":"page","webSocketDebuggerUrl":"ws://x"}]"#;
        let targets = parse_listing(body).expect("parse");
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id.as_str(), "A");
    }

    #[test]
    fn test_parse_listing_rejects_non_array() {
        let err = parse_listing(r#"{"id":"A"}"#).unwrap_err();
        assert!(err.is_endpoint_error());
    }

    #[test]
    fn test_parse_listing_rejects_garbage() {
        let err = parse_listing("<html>").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_socket_url_ignores_empty() {
        let target = DebugTarget {
            id: TargetId::new("A"),
            kind: PAGE_KIND.to_string(),
            web_socket_debugger_url: Some(String::new()),
            title: String::new(),
            url: String::new(),
        };
        assert!(target.socket_url().is_none());
        assert!(!target.is_injectable());
    }
}
