//! Target process lifecycle.
//!
//! Already-running instances are terminated first so the new process is the
//! one that owns the debugging port. The spawned process's output is either
//! forwarded to the log line by line or discarded.

// ============================================================================
// Imports
// ============================================================================

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};

use super::options::LaunchOptions;

// ============================================================================
// Constants
// ============================================================================

/// Time given to terminated instances to release their resources.
const TERMINATE_GRACE: Duration = Duration::from_millis(500);

/// Exit code reported when the process ended without one (killed by signal).
const SIGNALLED_EXIT_CODE: i32 = 1;

// ============================================================================
// Termination
// ============================================================================

/// Kills every running process named `process_name`.
///
/// Best effort: a missing kill utility, no matching process or a permission
/// error are all logged and otherwise ignored. Returns `true` if something
/// was terminated.
pub async fn terminate_existing(process_name: &str) -> bool {
    let mut cmd = kill_command(process_name);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    let killed = match cmd.status().await {
        Ok(status) => status.success(),
        Err(e) => {
            debug!(process = process_name, error = %e, "Kill utility unavailable");
            false
        }
    };

    if killed {
        info!(process = process_name, "Terminated running instances");
        tokio::time::sleep(TERMINATE_GRACE).await;
    } else {
        debug!(process = process_name, "No running instances terminated");
    }

    killed
}

/// Builds the platform kill command.
fn kill_command(process_name: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("taskkill");
        cmd.arg("/IM").arg(format!("{process_name}.exe")).arg("/F");
        cmd
    } else {
        let mut cmd = Command::new("pkill");
        cmd.args(["-x", process_name]);
        cmd
    }
}

// ============================================================================
// TargetProcess
// ============================================================================

/// A spawned target application.
#[derive(Debug)]
pub struct TargetProcess {
    /// Child handle.
    child: Child,
    /// OS process id, if still known.
    pid: Option<u32>,
}

impl TargetProcess {
    /// Spawns `binary` with the given options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProcessLaunchFailed`] if the process cannot be
    /// started.
    pub fn spawn(binary: &Path, options: &LaunchOptions) -> Result<Self> {
        let mut cmd = Command::new(binary);
        cmd.args(options.to_args()).stdin(Stdio::null());

        if options.debug {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let mut child = cmd.spawn().map_err(Error::process_launch_failed)?;
        let pid = child.id();

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_output(stdout, OutputStream::Stdout));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_output(stderr, OutputStream::Stderr));
        }

        info!(
            pid,
            binary = %binary.display(),
            port = options.port,
            "Target process spawned"
        );

        Ok(Self { child, pid })
    }

    /// Returns the process id.
    #[inline]
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Waits for the process to exit and returns its exit code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if waiting fails.
    pub async fn wait(&mut self) -> Result<i32> {
        let status = self.child.wait().await?;
        let code = status.code().unwrap_or(SIGNALLED_EXIT_CODE);

        warn!(pid = self.pid, code, "Child process exited");
        Ok(code)
    }

    /// Kills the process and waits for it to exit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the process cannot be killed.
    pub async fn kill(&mut self) -> Result<()> {
        self.child.kill().await?;
        debug!(pid = self.pid, "Target process killed");
        Ok(())
    }
}

// ============================================================================
// Output Forwarding
// ============================================================================

/// Which output stream is being forwarded.
#[derive(Debug, Clone, Copy)]
enum OutputStream {
    Stdout,
    Stderr,
}

/// Logs every line of `reader` until it closes.
async fn forward_output<R>(reader: R, stream: OutputStream)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match stream {
                OutputStream::Stdout => info!(target: "devtools_inject::target", "{line}"),
                OutputStream::Stderr => error!(target: "devtools_inject::target", "{line}"),
            },
            Ok(None) => break,
            Err(e) => {
                debug!(error = %e, "Output forwarding stopped");
                break;
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
