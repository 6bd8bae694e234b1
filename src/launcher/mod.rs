//! Target application lifecycle and orchestration.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `builder` | [`InjectorBuilder`] with validation |
//! | `core` | [`Injector`], the end-to-end flow |
//! | `locate` | Finds the target executable |
//! | `options` | Target command-line arguments |
//! | `process` | Terminates, spawns and awaits the target |

// ============================================================================
// Submodules
// ============================================================================

/// Injector builder.
pub mod builder;

/// Injector orchestration.
pub mod core;

/// Install lookup.
pub mod locate;

/// Launch options.
pub mod options;

/// Process lifecycle.
pub mod process;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::{DEFAULT_SCRIPTS_DIR, InjectorBuilder};
pub use core::Injector;
pub use locate::{DEFAULT_APP_NAME, InstallLocator, parse_app_version, resolve_binary};
pub use options::LaunchOptions;
pub use process::{TargetProcess, terminate_existing};
