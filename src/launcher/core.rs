//! Injector orchestration.
//!
//! The [`Injector`] runs the whole flow:
//!
//! ```text
//! port ─► binary ─► scripts ─► terminate ─► spawn ─┬─► discover ─► dispatch
//!                                                  │
//!                                                  └─► wait for exit ─► code
//! ```
//!
//! Injection races the target's lifetime: if the target exits first the run
//! ends with its exit code. After injection the run keeps waiting so the
//! debugger sockets stay open.

// ============================================================================
// Imports
// ============================================================================

use std::path::{Path, PathBuf};

use tokio::pin;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::inject::{
    DiscoveryOptions, DispatchReport, EndpointDiscovery, InjectionDispatcher, ScriptPayload,
    load_scripts,
};
use crate::transport::{HttpListing, PortAllocator};

use super::builder::InjectorBuilder;
use super::locate::{InstallLocator, resolve_binary};
use super::options::LaunchOptions;
use super::process::{TargetProcess, terminate_existing};

// ============================================================================
// Constants
// ============================================================================

/// Exit code reported after an interrupted attach session.
const INTERRUPTED_EXIT_CODE: i32 = 0;

// ============================================================================
// Injector
// ============================================================================

/// Launches the target application and injects scripts into its windows.
///
/// # Example
///
/// ```no_run
/// use devtools_inject::Injector;
///
/// # async fn example() -> devtools_inject::Result<()> {
/// let injector = Injector::builder().scripts_dir("./custom").build()?;
/// let code = injector.run().await?;
/// std::process::exit(code);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Injector {
    pub(super) port: Option<u16>,
    pub(super) binary: Option<PathBuf>,
    pub(super) install_dir: Option<PathBuf>,
    pub(super) scripts_dir: PathBuf,
    pub(super) process_name: String,
    pub(super) kill_existing: bool,
    pub(super) debug: bool,
    pub(super) extra_args: Vec<String>,
    pub(super) discovery: DiscoveryOptions,
    pub(super) attach: bool,
}

// ============================================================================
// Injector - Public API
// ============================================================================

impl Injector {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> InjectorBuilder {
        InjectorBuilder::new()
    }

    /// Returns the fixed debugging port, if any.
    #[inline]
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns the scripts directory.
    #[inline]
    #[must_use]
    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    /// Returns the discovery policy.
    #[inline]
    #[must_use]
    pub fn discovery(&self) -> &DiscoveryOptions {
        &self.discovery
    }

    /// Returns `true` if the injector attaches instead of launching.
    #[inline]
    #[must_use]
    pub fn is_attach(&self) -> bool {
        self.attach
    }

    /// Runs the full flow and returns the exit code to report.
    ///
    /// # Errors
    ///
    /// Returns an error if startup fails: no free port, no binary, an
    /// unreadable scripts directory or a failed spawn.
    pub async fn run(&self) -> Result<i32> {
        if self.attach {
            return self.run_attached().await;
        }

        let port = self.resolve_port().await?;
        let binary = self.resolve_binary()?;
        let scripts = load_scripts(&self.scripts_dir)?;

        if self.kill_existing {
            terminate_existing(&self.process_name).await;
        }

        let options = LaunchOptions::new(port)
            .with_debug(self.debug)
            .with_args(self.extra_args.iter().cloned());
        let mut process = TargetProcess::spawn(&binary, &options)?;

        let injection = self.inject(port, &scripts);
        pin!(injection);
        let mut injected = false;

        loop {
            tokio::select! {
                code = process.wait() => return code,

                result = &mut injection, if !injected => {
                    injected = true;
                    if let Err(e) = result {
                        error!(error = %e, "Injection failed");
                        process.kill().await?;
                        return Err(e);
                    }
                    debug!("Injection finished, waiting for target to exit");
                }
            }
        }
    }

    /// Discovers the targets behind `port` and sends them `scripts`.
    ///
    /// Discovery giving up is not an error; whatever was found is injected.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub async fn inject(&self, port: u16, scripts: &[ScriptPayload]) -> Result<DispatchReport> {
        let discovery = EndpointDiscovery::new(HttpListing::new()?, self.discovery.clone());
        let targets = discovery.discover(port).await;

        if targets.is_empty() {
            warn!(port, "No debug targets to inject into");
        }

        let report = InjectionDispatcher::new().dispatch(&targets, scripts).await;

        info!(
            port,
            targets = report.len(),
            sent = report.sent_count(),
            "Injection complete"
        );

        Ok(report)
    }
}

// ============================================================================
// Injector - Internal
// ============================================================================

impl Injector {
    /// Injects into an already-running target, then holds the sockets open
    /// until interrupted.
    async fn run_attached(&self) -> Result<i32> {
        let port = self
            .port
            .ok_or_else(|| Error::config("Attaching requires a debugging port"))?;
        let scripts = load_scripts(&self.scripts_dir)?;

        info!(port, "Attaching to running target");
        self.inject(port, &scripts).await?;

        info!("Press Ctrl+C to detach");
        tokio::signal::ctrl_c().await?;
        info!("Detached");

        Ok(INTERRUPTED_EXIT_CODE)
    }

    /// Returns the fixed port or allocates a free one.
    async fn resolve_port(&self) -> Result<u16> {
        match self.port {
            Some(port) => Ok(port),
            None => {
                let port = PortAllocator::new().allocate_default().await?;
                info!(port, "Using free debugging port");
                Ok(port)
            }
        }
    }

    /// Returns the explicit binary or locates the install.
    fn resolve_binary(&self) -> Result<PathBuf> {
        let locator = match &self.install_dir {
            Some(root) => InstallLocator::new(root, self.process_name.as_str()),
            None => InstallLocator::for_app(self.process_name.as_str())?,
        };

        if self.binary.is_none() {
            debug!(root = %locator.root().display(), "Searching for target install");
        }

        resolve_binary(self.binary.as_deref(), &locator)
    }
}

// ============================================================================
// Tests
// ============================================================================
