//! Injection dispatcher.
//!
//! Opens one connection per discovered target and sends one
//! `Runtime.evaluate` command per script, in load order. Targets are driven
//! concurrently as independent futures on the caller's task; they share
//! nothing but the read-only script list.
//!
//! # Failure Isolation
//!
//! | Failure | Effect |
//! |---------|--------|
//! | Connection cannot open | Target gets zero sends, others unaffected |
//! | One send fails | Recorded, remaining scripts still sent |
//!
//! Sends are fire-and-forget: a command counts as sent once its frame is
//! written. Nothing is retried.

// ============================================================================
// Imports
// ============================================================================

use futures_util::future::join_all;
use rustc_hash::FxHashMap;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::identifiers::TargetId;
use crate::protocol::{Command, Request, RuntimeCommand};
use crate::transport::{CommandSink, SocketConnector, WsConnector};

use super::scripts::ScriptPayload;

// ============================================================================
// Outcomes
// ============================================================================

/// Result of sending one script to one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectionOutcome {
    /// Command frame was written.
    Sent,
    /// Command frame could not be written.
    Failed {
        /// Why the send failed.
        reason: String,
    },
}

impl InjectionOutcome {
    /// Returns `true` if the command was sent.
    #[inline]
    #[must_use]
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

/// Outcome of one script, keyed by script name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOutcome {
    /// Script name.
    pub name: String,
    /// What happened.
    pub outcome: InjectionOutcome,
}

/// What happened to one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetReport {
    /// Connection opened; one entry per script, in load order.
    Connected {
        /// Per-script outcomes.
        sends: Vec<ScriptOutcome>,
    },
    /// Connection failed to open; nothing was sent.
    ConnectFailed {
        /// Why the connection failed.
        reason: String,
    },
}

impl TargetReport {
    /// Returns the per-script outcomes (empty if the connection failed).
    #[inline]
    #[must_use]
    pub fn sends(&self) -> &[ScriptOutcome] {
        match self {
            Self::Connected { sends } => sends,
            Self::ConnectFailed { .. } => &[],
        }
    }

    /// Returns `true` if the connection opened.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

// ============================================================================
// DispatchReport
// ============================================================================

/// Outcomes of a dispatch, per target.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// Report per target id.
    targets: FxHashMap<TargetId, TargetReport>,
}

impl DispatchReport {
    /// Returns the report of one target.
    #[inline]
    #[must_use]
    pub fn target(&self, id: &str) -> Option<&TargetReport> {
        self.targets.get(id)
    }

    /// Returns the outcome of one (target, script) pair.
    #[must_use]
    pub fn outcome(&self, id: &str, script: &str) -> Option<&InjectionOutcome> {
        self.target(id)?
            .sends()
            .iter()
            .find(|s| s.name == script)
            .map(|s| &s.outcome)
    }

    /// Iterates over every (target, script, outcome) triple.
    pub fn outcomes(&self) -> impl Iterator<Item = (&TargetId, &str, &InjectionOutcome)> {
        self.targets.iter().flat_map(|(id, report)| {
            report
                .sends()
                .iter()
                .map(move |s| (id, s.name.as_str(), &s.outcome))
        })
    }

    /// Number of targets in the report.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns `true` if no targets were dispatched to.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Number of targets whose connection opened.
    #[must_use]
    pub fn connected_count(&self) -> usize {
        self.targets.values().filter(|r| r.is_connected()).count()
    }

    /// Number of commands sent across all targets.
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.outcomes().filter(|(_, _, o)| o.is_sent()).count()
    }

    /// Number of failed sends across all targets.
    #[must_use]
    pub fn failed_send_count(&self) -> usize {
        self.outcomes().filter(|(_, _, o)| !o.is_sent()).count()
    }
}

impl FromIterator<(TargetId, TargetReport)> for DispatchReport {
    fn from_iter<I: IntoIterator<Item = (TargetId, TargetReport)>>(iter: I) -> Self {
        Self {
            targets: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// InjectionDispatcher
// ============================================================================

/// Sends scripts to debug targets.
///
/// # Example
///
/// ```no_run
/// use devtools_inject::{InjectionDispatcher, ScriptPayload, TargetId};
/// use rustc_hash::FxHashMap;
///
/// # async fn example() {
/// let mut targets = FxHashMap::default();
/// targets.insert(
///     TargetId::new("A"),
///     "ws://127.0.0.1:9222/devtools/page/A".to_string(),
/// );
/// let scripts = vec![ScriptPayload::new("hello.js", "console.log('hello')")];
///
/// let report = InjectionDispatcher::new().dispatch(&targets, &scripts).await;
/// println!("{} commands sent", report.sent_count());
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InjectionDispatcher<C = WsConnector> {
    /// Opens target connections.
    connector: C,
}

impl InjectionDispatcher<WsConnector> {
    /// Creates a dispatcher using WebSocket connections.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_connector(WsConnector::new())
    }
}

impl<C: SocketConnector> InjectionDispatcher<C> {
    /// Creates a dispatcher with a custom connector.
    #[inline]
    #[must_use]
    pub fn with_connector(connector: C) -> Self {
        Self { connector }
    }

    /// Injects every script into every target.
    ///
    /// Returns once every target has either failed to connect or had all
    /// scripts sent. A target whose connection never opens keeps this
    /// future pending.
    pub async fn dispatch(
        &self,
        targets: &FxHashMap<TargetId, String>,
        scripts: &[ScriptPayload],
    ) -> DispatchReport {
        let per_target = targets
            .iter()
            .map(|(id, url)| self.inject_target(id, url, scripts));

        let report: DispatchReport = join_all(per_target).await.into_iter().collect();

        info!(
            targets = report.len(),
            connected = report.connected_count(),
            sent = report.sent_count(),
            failed = report.failed_send_count(),
            "Injection dispatched"
        );

        report
    }

    /// Connects to one target and sends every script to it.
    async fn inject_target(
        &self,
        id: &TargetId,
        url: &str,
        scripts: &[ScriptPayload],
    ) -> (TargetId, TargetReport) {
        let mut sink = match self.connector.connect(url).await {
            Ok(sink) => sink,
            Err(e) => {
                warn!(target_id = %id, error = %e, "Socket for window returned error");
                let report = TargetReport::ConnectFailed {
                    reason: e.to_string(),
                };
                return (id.clone(), report);
            }
        };

        debug!(target_id = %id, url, "Connected to window");

        let mut sends = Vec::with_capacity(scripts.len());

        for script in scripts {
            info!(target_id = %id, script = %script.name, "Injecting user script");

            let outcome = match send_script(&mut sink, script).await {
                Ok(()) => InjectionOutcome::Sent,
                Err(e) => {
                    error!(target_id = %id, script = %script.name, error = %e, "Failed to send script");
                    InjectionOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };

            sends.push(ScriptOutcome {
                name: script.name.clone(),
                outcome,
            });
        }

        (id.clone(), TargetReport::Connected { sends })
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Sends the evaluation command for one script.
async fn send_script<S: CommandSink>(sink: &mut S, script: &ScriptPayload) -> Result<()> {
    let command = Command::Runtime(RuntimeCommand::evaluate(script.content.as_str()));
    let text = Request::new(command).to_text()?;
    sink.send_text(text).await
}

// ============================================================================
// Tests
// ============================================================================
