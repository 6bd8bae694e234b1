//! DevTools Inject command-line entry point.
//!
//! Launches the target application with remote debugging enabled, injects
//! every `.js` file from the scripts directory into each of its windows and
//! exits with the target's exit code.

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use devtools_inject::inject::discovery::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MIN_TARGETS, DEFAULT_POLL_INTERVAL,
};
use devtools_inject::launcher::{DEFAULT_APP_NAME, DEFAULT_SCRIPTS_DIR};
use devtools_inject::{Injector, InjectorBuilder};
use tracing::error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Cli
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "devtools-inject",
    version,
    about = "Inject user scripts into every window of an Electron app"
)]
struct Cli {
    /// Remote debugging port (default: first free port from 1024)
    #[arg(long)]
    port: Option<u16>,

    /// Target executable (default: newest install under the local data dir)
    #[arg(long)]
    binary: Option<PathBuf>,

    /// Install root holding app-X.Y.Z directories
    #[arg(long)]
    install_dir: Option<PathBuf>,

    /// Directory of .js scripts to inject
    #[arg(long, default_value = DEFAULT_SCRIPTS_DIR)]
    scripts: PathBuf,

    /// Target process and executable name
    #[arg(long, default_value = DEFAULT_APP_NAME)]
    process_name: String,

    /// Do not terminate already-running instances
    #[arg(long)]
    no_kill: bool,

    /// Inject into an already-running target on --port instead of launching
    #[arg(long, requires = "port")]
    attach: bool,

    /// Verbose logging and target output forwarding
    #[arg(long)]
    debug: bool,

    /// Listing polls before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Delay between listing polls, in milliseconds
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
    poll_interval_ms: u64,

    /// Stop polling once this many windows are known
    #[arg(long, default_value_t = DEFAULT_MIN_TARGETS)]
    min_targets: usize,

    /// Extra arguments passed to the target
    #[arg(last = true)]
    target_args: Vec<String>,
}

impl Cli {
    /// Converts the parsed flags into a builder.
    fn into_builder(self) -> InjectorBuilder {
        let mut builder = Injector::builder()
            .scripts_dir(self.scripts)
            .process_name(self.process_name)
            .kill_existing(!self.no_kill)
            .attach(self.attach)
            .debug(self.debug)
            .max_attempts(self.max_attempts)
            .poll_interval(Duration::from_millis(self.poll_interval_ms))
            .min_targets(self.min_targets)
            .args(self.target_args);

        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        if let Some(binary) = self.binary {
            builder = builder.binary(binary);
        }
        if let Some(dir) = self.install_dir {
            builder = builder.install_dir(dir);
        }

        builder
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(cli).await {
        Ok(code) => exit_code(code),
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Builds the injector and runs it to completion.
async fn run(cli: Cli) -> anyhow::Result<i32> {
    let injector = cli
        .into_builder()
        .build()
        .context("invalid configuration")?;

    let code = injector.run().await.context("injection run failed")?;
    Ok(code)
}

/// Initializes tracing; `RUST_LOG` overrides the default filter.
fn init_logging(debug: bool) {
    let default = if debug {
        "devtools_inject=debug"
    } else {
        "devtools_inject=info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Maps the target's exit code onto the process exit code.
fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
}
