//! Type-safe identifiers for debug targets.
//!
//! The debugging interface assigns each inspectable page an opaque string id
//! (e.g. `"E3B0C44298FC1C149AFBF4C8996FB924"`). Wrapping it keeps target ids
//! from being confused with script names or socket URLs in the maps that
//! discovery and dispatch pass around.

// ============================================================================
// Imports
// ============================================================================

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// TargetId
// ============================================================================

/// Identifier of one debug target (window/page).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    /// Creates a target id from any string-like value.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    #[inline]
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TargetId {
    #[inline]
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for TargetId {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Tests
// ============================================================================
