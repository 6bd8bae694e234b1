//! Network transport layer.
//!
//! This module handles every socket the injector touches: the transient
//! listener used to find a free debugging port, the HTTP listing endpoint
//! and the per-target debugger WebSockets.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────────┐
//! │  Injector       │   bind/release (probe)       │                     │
//! │                 │─────────────► 127.0.0.1:PORT │  Target application │
//! │  HttpListing    │   GET /json/list?t=...       │  (remote debugging  │
//! │                 │─────────────────────────────►│   interface)        │
//! │  WsConnector    │   ws://.../devtools/page/ID  │                     │
//! │                 │◄────────────────────────────►│  one socket / page  │
//! └─────────────────┘                              └─────────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `listing` | HTTP client for `/json/list` |
//! | `port` | Free-port allocation |
//! | `socket` | Debugger WebSocket connections |

// ============================================================================
// Submodules
// ============================================================================

/// HTTP client for the listing endpoint.
pub mod listing;

/// Free-port allocation.
pub mod port;

/// Debugger WebSocket connections.
pub mod socket;

// ============================================================================
// Re-exports
// ============================================================================

pub use listing::{HttpListing, ListingSource};
pub use port::{MAX_PORT, MIN_PORT, PortAllocator, PortProbe, TcpProbe};
pub use socket::{CommandSink, SocketConnector, WsConnector, WsSink};
