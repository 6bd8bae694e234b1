//! Builder pattern for injector configuration.
//!
//! Provides a fluent API for configuring and creating [`Injector`] instances.
//!
//! # Example
//!
//! ```no_run
//! use devtools_inject::Injector;
//!
//! # fn example() -> devtools_inject::Result<()> {
//! let injector = Injector::builder()
//!     .scripts_dir("./custom")
//!     .max_attempts(20)
//!     .min_targets(2)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::inject::DiscoveryOptions;
use crate::transport::MIN_PORT;

use super::core::Injector;
use super::locate::DEFAULT_APP_NAME;

// ============================================================================
// Constants
// ============================================================================

/// Default scripts directory, relative to the working directory.
pub const DEFAULT_SCRIPTS_DIR: &str = "custom";

// ============================================================================
// InjectorBuilder
// ============================================================================

/// Builder for configuring an [`Injector`] instance.
///
/// Use [`Injector::builder()`] to create a new builder.
#[derive(Debug, Clone)]
pub struct InjectorBuilder {
    /// Fixed debugging port; allocated when unset.
    port: Option<u16>,
    /// Explicit target binary; located when unset.
    binary: Option<PathBuf>,
    /// Install root searched for `app-X.Y.Z` directories.
    install_dir: Option<PathBuf>,
    /// Directory holding `.js` scripts.
    scripts_dir: PathBuf,
    /// Name of the target process and executable.
    process_name: String,
    /// Terminate running instances before launching.
    kill_existing: bool,
    /// Forward target output to the log.
    debug: bool,
    /// Extra target arguments.
    extra_args: Vec<String>,
    /// Discovery polling policy.
    discovery: DiscoveryOptions,
    /// Inject into an already-running target instead of launching one.
    attach: bool,
}

impl Default for InjectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// InjectorBuilder Implementation
// ============================================================================

impl InjectorBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            port: None,
            binary: None,
            install_dir: None,
            scripts_dir: PathBuf::from(DEFAULT_SCRIPTS_DIR),
            process_name: DEFAULT_APP_NAME.to_string(),
            kill_existing: true,
            debug: false,
            extra_args: Vec::new(),
            discovery: DiscoveryOptions::default(),
            attach: false,
        }
    }

    /// Uses a fixed debugging port instead of allocating one.
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the target executable, skipping install lookup.
    #[inline]
    #[must_use]
    pub fn binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary = Some(path.into());
        self
    }

    /// Sets the install root searched for versioned app directories.
    #[inline]
    #[must_use]
    pub fn install_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.install_dir = Some(path.into());
        self
    }

    /// Sets the scripts directory.
    #[inline]
    #[must_use]
    pub fn scripts_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.scripts_dir = path.into();
        self
    }

    /// Sets the target process name.
    #[inline]
    #[must_use]
    pub fn process_name(mut self, name: impl Into<String>) -> Self {
        self.process_name = name.into();
        self
    }

    /// Enables or disables terminating running instances.
    #[inline]
    #[must_use]
    pub fn kill_existing(mut self, kill: bool) -> Self {
        self.kill_existing = kill;
        self
    }

    /// Enables or disables target output forwarding.
    #[inline]
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Adds an extra target argument.
    #[inline]
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Adds extra target arguments.
    #[inline]
    #[must_use]
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Replaces the discovery policy.
    #[inline]
    #[must_use]
    pub fn discovery(mut self, options: DiscoveryOptions) -> Self {
        self.discovery = options;
        self
    }

    /// Sets the discovery attempt budget.
    #[inline]
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.discovery = self.discovery.with_max_attempts(max_attempts);
        self
    }

    /// Sets the delay between discovery attempts.
    #[inline]
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.discovery = self.discovery.with_poll_interval(interval);
        self
    }

    /// Sets how many targets end discovery early.
    #[inline]
    #[must_use]
    pub fn min_targets(mut self, min_targets: usize) -> Self {
        self.discovery = self.discovery.with_min_targets(min_targets);
        self
    }

    /// Attaches to an already-running target on the fixed port.
    #[inline]
    #[must_use]
    pub fn attach(mut self, attach: bool) -> Self {
        self.attach = attach;
        self
    }

    /// Builds the injector with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the port, discovery policy, process name or
    ///   scripts directory is invalid
    /// - [`Error::BinaryNotFound`] if an explicit binary doesn't exist
    pub fn build(self) -> Result<Injector> {
        self.validate_port()?;
        self.validate_discovery()?;
        self.validate_process_name()?;
        self.validate_binary()?;
        self.validate_scripts_dir()?;

        Ok(Injector {
            port: self.port,
            binary: self.binary,
            install_dir: self.install_dir,
            scripts_dir: self.scripts_dir,
            process_name: self.process_name,
            kill_existing: self.kill_existing,
            debug: self.debug,
            extra_args: self.extra_args,
            discovery: self.discovery,
            attach: self.attach,
        })
    }
}

// ============================================================================
// Validation
// ============================================================================

impl InjectorBuilder {
    /// Validates the port configuration.
    fn validate_port(&self) -> Result<()> {
        match self.port {
            Some(port) if port < MIN_PORT => Err(Error::config(format!(
                "Port {port} is reserved. Use a port of at least {MIN_PORT}."
            ))),
            None if self.attach => Err(Error::config(
                "Attaching requires the target's debugging port. Use .port() to set it.",
            )),
            _ => Ok(()),
        }
    }

    /// Validates the discovery policy.
    fn validate_discovery(&self) -> Result<()> {
        if self.discovery.max_attempts == 0 {
            return Err(Error::config("Discovery needs at least one attempt"));
        }
        if self.discovery.min_targets == 0 {
            return Err(Error::config("Discovery must wait for at least one target"));
        }
        Ok(())
    }

    /// Validates the process name.
    fn validate_process_name(&self) -> Result<()> {
        if self.process_name.trim().is_empty() {
            return Err(Error::config("Process name must not be empty"));
        }
        Ok(())
    }

    /// Validates the explicit binary path.
    fn validate_binary(&self) -> Result<()> {
        if let Some(binary) = &self.binary
            && !binary.exists()
        {
            return Err(Error::binary_not_found(binary));
        }
        Ok(())
    }

    /// Validates the scripts directory.
    fn validate_scripts_dir(&self) -> Result<()> {
        if !self.scripts_dir.is_dir() {
            return Err(Error::config(format!(
                "Scripts directory not found at: {}\n\
                 Create it and place .js files inside.",
                self.scripts_dir.display()
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
