//! DevTools protocol message types.
//!
//! This module defines the messages exchanged with a debug target and the
//! descriptors returned by the HTTP listing endpoint.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `DebugTarget` | HTTP `/json/list` | Target discovery |
//! | `Request` | Local → Target | Command request |
//! | `Response` | Target → Local | Command response |
//! | `Event` | Target → Local | Notification |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Command definitions by domain |
//! | `event` | Event type |
//! | `request` | Request and Response types |
//! | `target` | Listing descriptors |

// ============================================================================
// Submodules
// ============================================================================

/// Command definitions organized by domain.
pub mod command;

/// Event message types.
pub mod event;

/// Request and Response message types.
pub mod request;

/// Listing endpoint descriptors.
pub mod target;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{Command, EvaluateParams, RuntimeCommand};
pub use event::Event;
pub use request::{INJECTION_REQUEST_ID, Request, Response, ResponseError};
pub use target::{DebugTarget, PAGE_KIND, parse_listing};
