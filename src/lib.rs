//! DevTools Inject - user scripts for Electron apps.
//!
//! This library launches a desktop application with its remote debugging
//! interface enabled, finds every page it exposes and injects user scripts
//! into each one.
//!
//! # Architecture
//!
//! The injector talks to the target over two channels:
//!
//! - **Listing (HTTP)**: `GET /json/list` returns the debuggable targets
//! - **Debugger (WebSocket)**: one socket per page receives `Runtime.evaluate`
//!
//! Key design principles:
//!
//! - Startup is strict: no port, no binary or no spawn is fatal
//! - Discovery is bounded: a fixed number of polls, failures count as empty
//! - Dispatch is isolated: one target or script failing never stops another
//!
//! # Quick Start
//!
//! ```no_run
//! use devtools_inject::{Injector, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let injector = Injector::builder()
//!         .scripts_dir("./custom")
//!         .min_targets(2)
//!         .build()?;
//!
//!     // Launches the app, injects, then waits for it to exit
//!     let code = injector.run().await?;
//!     std::process::exit(code);
//! }
//! ```
//!
//! The pieces can also be driven one by one against an app that is already
//! running with `--remote-debugging-port=9222`:
//!
//! ```no_run
//! use devtools_inject::{
//!     DiscoveryOptions, EndpointDiscovery, HttpListing, InjectionDispatcher, Result,
//!     load_scripts,
//! };
//!
//! # async fn example() -> Result<()> {
//! let scripts = load_scripts("./custom")?;
//! let discovery = EndpointDiscovery::new(HttpListing::new()?, DiscoveryOptions::default());
//! let targets = discovery.discover(9222).await;
//! let report = InjectionDispatcher::new().dispatch(&targets, &scripts).await;
//! println!("{} scripts sent", report.sent_count());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`inject`] | Discovery, dispatch and script loading |
//! | [`launcher`] | Target process lifecycle and [`Injector`] |
//! | [`protocol`] | DevTools message types |
//! | [`transport`] | Port probing, HTTP listing, WebSockets |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Script injection.
///
/// - [`EndpointDiscovery`] - Bounded polling for page targets
/// - [`InjectionDispatcher`] - Concurrent per-target script dispatch
pub mod inject;

/// Target application lifecycle.
///
/// Use [`Injector::builder()`] to create a configured injector.
pub mod launcher;

/// DevTools protocol message types.
pub mod protocol;

/// Network transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::TargetId;

// Injection types
pub use inject::{
    DiscoveryOptions, DiscoveryOutcome, DiscoveryReport, DiscoveryState, DispatchReport,
    EndpointDiscovery, InjectionDispatcher, InjectionOutcome, PollStatus, ScriptOutcome,
    ScriptPayload, TargetReport, load_scripts,
};

// Launcher types
pub use launcher::{
    InstallLocator, Injector, InjectorBuilder, LaunchOptions, TargetProcess,
};

// Protocol types
pub use protocol::DebugTarget;

// Transport types
pub use transport::{
    CommandSink, HttpListing, ListingSource, PortAllocator, PortProbe, SocketConnector,
    TcpProbe, WsConnector,
};
