//! Script injection.
//!
//! Everything between "a debugging port is open" and "every window has been
//! sent every script".
//!
//! # Flow
//!
//! ```text
//! load_scripts(dir) ──► Vec<ScriptPayload>
//!                                │
//! EndpointDiscovery::discover ──►│ FxHashMap<TargetId, ws url>
//!                                ▼
//!                 InjectionDispatcher::dispatch ──► DispatchReport
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `discovery` | Polls the listing endpoint for page targets |
//! | `dispatcher` | Sends scripts to every target concurrently |
//! | `scripts` | Loads `.js` files from disk |

// ============================================================================
// Submodules
// ============================================================================

/// Debug target discovery.
pub mod discovery;

/// Concurrent script dispatch.
pub mod dispatcher;

/// Script loading.
pub mod scripts;

// ============================================================================
// Re-exports
// ============================================================================

pub use discovery::{
    DiscoveryOptions, DiscoveryOutcome, DiscoveryReport, DiscoveryState, EndpointDiscovery,
    PollStatus,
};
pub use dispatcher::{
    DispatchReport, InjectionDispatcher, InjectionOutcome, ScriptOutcome, TargetReport,
};
pub use scripts::{ScriptPayload, load_scripts};
