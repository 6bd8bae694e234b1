//! Error types for devtools-inject.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use devtools_inject::{PortAllocator, Result};
//!
//! async fn example() -> Result<u16> {
//!     let port = PortAllocator::new().allocate_default().await?;
//!     Ok(port)
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants | Handling |
//! |----------|----------|----------|
//! | Startup | [`Error::Config`], [`Error::PortExhausted`], [`Error::BinaryNotFound`], [`Error::InstallNotFound`], [`Error::ProcessLaunchFailed`] | Fatal |
//! | Listing | [`Error::Endpoint`], [`Error::Http`] | Swallowed per poll attempt |
//! | Socket | [`Error::Connection`], [`Error::ConnectionClosed`], [`Error::Protocol`], [`Error::WebSocket`] | Isolated per target / per script |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::Url`] | Context dependent |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Startup Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when injector configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Invalid argument passed to an operation.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// No free TCP port in the probed range.
    ///
    /// Terminal: the caller cannot open the debugging interface.
    #[error("No free port between {start} and {end}")]
    PortExhausted {
        /// First port probed.
        start: u16,
        /// Last port probed.
        end: u16,
    },

    /// Explicit target binary does not exist.
    #[error("Target binary not found at: {path}")]
    BinaryNotFound {
        /// Path where the binary was expected.
        path: PathBuf,
    },

    /// No installation of the target application could be located.
    #[error("Unable to locate target install under: {root}")]
    InstallNotFound {
        /// Directory that was searched.
        root: PathBuf,
    },

    /// Failed to launch the target process.
    #[error("Failed to launch target: {message}")]
    ProcessLaunchFailed {
        /// Description of the launch failure.
        message: String,
    },

    // ========================================================================
    // Listing Errors
    // ========================================================================
    /// Listing endpoint answered with something unusable.
    #[error("Listing endpoint error: {message}")]
    Endpoint {
        /// Description of the failure.
        message: String,
    },

    /// HTTP transport error talking to the listing endpoint.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // ========================================================================
    // Socket Errors
    // ========================================================================
    /// WebSocket connection failed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// WebSocket connection closed before the operation completed.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Debugger answered a command with a protocol error.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Error message reported by the debugger.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// URL parse error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a port exhausted error.
    #[inline]
    pub fn port_exhausted(start: u16, end: u16) -> Self {
        Self::PortExhausted { start, end }
    }

    /// Creates a binary not found error.
    #[inline]
    pub fn binary_not_found(path: impl Into<PathBuf>) -> Self {
        Self::BinaryNotFound { path: path.into() }
    }

    /// Creates an install not found error.
    #[inline]
    pub fn install_not_found(root: impl Into<PathBuf>) -> Self {
        Self::InstallNotFound { root: root.into() }
    }

    /// Creates a process launch failed error.
    #[inline]
    pub fn process_launch_failed(err: IoError) -> Self {
        Self::ProcessLaunchFailed {
            message: err.to_string(),
        }
    }

    /// Creates a listing endpoint error.
    #[inline]
    pub fn endpoint(message: impl Into<String>) -> Self {
        Self::Endpoint {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error must abort startup.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::InvalidArgument { .. }
                | Self::PortExhausted { .. }
                | Self::BinaryNotFound { .. }
                | Self::InstallNotFound { .. }
                | Self::ProcessLaunchFailed { .. }
        )
    }

    /// Returns `true` if this is a debugger socket error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionClosed | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this came from talking to the listing endpoint.
    ///
    /// Discovery treats these as an empty poll.
    #[inline]
    #[must_use]
    pub fn is_endpoint_error(&self) -> bool {
        matches!(self, Self::Endpoint { .. } | Self::Http(_) | Self::Json(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
