//! Endpoint discovery.
//!
//! The target application opens its debugging listener some time after
//! launch, and opens its windows some time after that. Discovery polls the
//! listing endpoint on a fixed interval and accumulates injectable targets
//! until enough are known or the attempt budget runs out.
//!
//! # State Machine
//!
//! ```text
//!          ┌─────────────── sleep(poll_interval) ───────────────┐
//!          ▼                                                     │
//! Idle ─► Polling ─┬─► Satisfied     (count >= min_targets)      │
//!                  ├─► RetryPending  (attempts remain) ──────────┘
//!                  └─► GiveUp        (attempts exhausted)
//! ```
//!
//! `Satisfied` and `GiveUp` both return whatever was accumulated. A poll
//! that fails (refused connection, bad status, malformed body) counts as an
//! attempt that found nothing.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use rustc_hash::FxHashMap;
use tokio::time::sleep;
use tracing::{debug, info, trace, warn};

use crate::identifiers::TargetId;
use crate::protocol::DebugTarget;
use crate::transport::{HttpListing, ListingSource};

// ============================================================================
// Constants
// ============================================================================

/// Default number of listing polls.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default pause between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Default number of targets that ends discovery early.
pub const DEFAULT_MIN_TARGETS: usize = 1;

// ============================================================================
// DiscoveryOptions
// ============================================================================

/// Retry policy for discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Maximum number of listing polls.
    pub max_attempts: u32,

    /// Pause between consecutive polls.
    pub poll_interval: Duration,

    /// Stop as soon as at least this many targets are known.
    pub min_targets: usize,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            min_targets: DEFAULT_MIN_TARGETS,
        }
    }
}

impl DiscoveryOptions {
    /// Sets the maximum number of polls.
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the pause between polls.
    #[inline]
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Sets the target count that ends discovery early.
    #[inline]
    #[must_use]
    pub fn with_min_targets(mut self, min_targets: usize) -> Self {
        self.min_targets = min_targets;
        self
    }
}

// ============================================================================
// DiscoveryState
// ============================================================================

/// Where the poll loop goes after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    /// Enough targets are known.
    Satisfied,
    /// Not enough targets yet, attempts remain.
    RetryPending,
    /// Not enough targets and no attempts left.
    GiveUp,
}

/// Accumulator of one discovery run.
///
/// Merges are additive: an id already present keeps its first socket URL.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryState {
    /// Known targets, id to socket URL.
    targets: FxHashMap<TargetId, String>,
    /// Polls performed so far.
    attempt_count: u32,
    /// Poll budget.
    max_attempts: u32,
}

impl DiscoveryState {
    /// Creates an empty state with the given poll budget.
    #[inline]
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            targets: FxHashMap::default(),
            attempt_count: 0,
            max_attempts,
        }
    }

    /// Merges one listing, returning how many new targets were added.
    ///
    /// Non-injectable entries are dropped; known ids are left untouched.
    pub fn merge(&mut self, listing: impl IntoIterator<Item = DebugTarget>) -> usize {
        let mut added = 0;

        for target in listing {
            let Some(url) = target.socket_url() else {
                continue;
            };

            if !target.is_page() || self.targets.contains_key(&target.id) {
                continue;
            }

            debug!(target_id = %target.id, title = %target.title, "Discovered page");
            let url = url.to_string();
            self.targets.insert(target.id, url);
            added += 1;
        }

        added
    }

    /// Records that a poll was performed.
    #[inline]
    pub fn record_attempt(&mut self) {
        self.attempt_count += 1;
    }

    /// Classifies the state against a target count.
    #[must_use]
    pub fn status(&self, min_targets: usize) -> PollStatus {
        if self.targets.len() >= min_targets {
            PollStatus::Satisfied
        } else if self.attempt_count < self.max_attempts {
            PollStatus::RetryPending
        } else {
            PollStatus::GiveUp
        }
    }

    /// Returns the known targets.
    #[inline]
    #[must_use]
    pub fn targets(&self) -> &FxHashMap<TargetId, String> {
        &self.targets
    }

    /// Consumes the state, returning the known targets.
    #[inline]
    #[must_use]
    pub fn into_targets(self) -> FxHashMap<TargetId, String> {
        self.targets
    }

    /// Returns the number of polls performed.
    #[inline]
    #[must_use]
    pub const fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// Returns the poll budget.
    #[inline]
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

// ============================================================================
// DiscoveryReport
// ============================================================================

/// How a discovery run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    /// Reached `min_targets`.
    Satisfied,
    /// Ran out of attempts first.
    GiveUp,
}

/// Result of a discovery run.
#[derive(Debug, Clone)]
pub struct DiscoveryReport {
    /// Accumulated targets, id to socket URL. May be empty.
    pub targets: FxHashMap<TargetId, String>,
    /// Terminal state reached.
    pub outcome: DiscoveryOutcome,
    /// Polls performed.
    pub attempts: u32,
}

// ============================================================================
// EndpointDiscovery
// ============================================================================

/// Polls a listing source until enough debug targets are known.
///
/// # Example
///
/// ```no_run
/// use devtools_inject::{DiscoveryOptions, EndpointDiscovery, HttpListing};
///
/// # async fn example() -> devtools_inject::Result<()> {
/// let discovery = EndpointDiscovery::new(HttpListing::new()?, DiscoveryOptions::default());
/// let targets = discovery.discover(9222).await;
/// for (id, url) in &targets {
///     println!("{id} -> {url}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct EndpointDiscovery<L = HttpListing> {
    /// Where listings come from.
    listing: L,
    /// Retry policy.
    options: DiscoveryOptions,
}

impl<L: ListingSource> EndpointDiscovery<L> {
    /// Creates a discovery over the given listing source.
    #[inline]
    #[must_use]
    pub fn new(listing: L, options: DiscoveryOptions) -> Self {
        Self { listing, options }
    }

    /// Returns the retry policy.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    /// Runs discovery and returns only the targets.
    pub async fn discover(&self, port: u16) -> FxHashMap<TargetId, String> {
        self.run(port).await.targets
    }

    /// Runs discovery to a terminal state.
    ///
    /// Never fails: unreachable listings are empty polls, and running out of
    /// attempts returns whatever was found.
    pub async fn run(&self, port: u16) -> DiscoveryReport {
        let mut state = DiscoveryState::new(self.options.max_attempts);

        if self.options.max_attempts == 0 {
            return Self::finish(state, DiscoveryOutcome::GiveUp, port);
        }

        loop {
            let added = self.poll_once(port, &mut state).await;

            match state.status(self.options.min_targets) {
                PollStatus::Satisfied => {
                    return Self::finish(state, DiscoveryOutcome::Satisfied, port);
                }

                PollStatus::GiveUp => {
                    return Self::finish(state, DiscoveryOutcome::GiveUp, port);
                }

                PollStatus::RetryPending => {
                    trace!(
                        attempt = state.attempt_count(),
                        added,
                        known = state.targets().len(),
                        "Retrying discovery"
                    );
                    sleep(self.options.poll_interval).await;
                }
            }
        }
    }

    /// Performs one poll and merges its result into `state`.
    ///
    /// Returns the number of new targets. A failed poll is logged and
    /// merges nothing.
    pub async fn poll_once(&self, port: u16, state: &mut DiscoveryState) -> usize {
        state.record_attempt();

        match self.listing.list_targets(port).await {
            Ok(listing) => state.merge(listing),
            Err(e) => {
                debug!(
                    port,
                    attempt = state.attempt_count(),
                    error = %e,
                    "Listing endpoint unreachable"
                );
                0
            }
        }
    }

    /// Logs the terminal state and builds the report.
    fn finish(state: DiscoveryState, outcome: DiscoveryOutcome, port: u16) -> DiscoveryReport {
        let attempts = state.attempt_count();
        let max_attempts = state.max_attempts();
        let targets = state.into_targets();

        match outcome {
            DiscoveryOutcome::Satisfied => {
                info!(port, attempts, count = targets.len(), "Discovered debug targets");
            }
            DiscoveryOutcome::GiveUp => {
                warn!(
                    port,
                    attempts,
                    max_attempts,
                    count = targets.len(),
                    "Gave up waiting for debug targets"
                );
            }
        }

        DiscoveryReport {
            targets,
            outcome,
            attempts,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::time::Instant;

    use crate::error::{Error, Result};

    /// Listing source replaying scripted polls, then repeating a fallback.
    struct FakeListing {
        polls: Mutex<VecDeque<Result<Vec<DebugTarget>>>>,
        fallback: Vec<DebugTarget>,
        calls: Arc<Mutex<Vec<Instant>>>,
    }

    impl FakeListing {
        fn new(polls: Vec<Result<Vec<DebugTarget>>>) -> Self {
            Self {
                polls: Mutex::new(polls.into()),
                fallback: Vec::new(),
                calls: Arc::default(),
            }
        }

        fn always_empty() -> Self {
            Self::new(Vec::new())
        }
    }

    #[async_trait]
    impl ListingSource for FakeListing {
        async fn list_targets(&self, _port: u16) -> Result<Vec<DebugTarget>> {
            self.calls.lock().push(Instant::now());
            self.polls
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(self.fallback.clone()))
        }
    }

    fn page(id: &str, url: &str) -> DebugTarget {
        DebugTarget {
            id: TargetId::new(id),
            kind: "page".to_string(),
            web_socket_debugger_url: Some(url.to_string()),
            title: String::new(),
            url: String::new(),
        }
    }

    fn worker(id: &str) -> DebugTarget {
        DebugTarget {
            kind: "service_worker".to_string(),
            ..page(id, "ws://127.0.0.1:1/devtools/page/worker")
        }
    }

    fn options(max_attempts: u32, min_targets: usize) -> DiscoveryOptions {
        DiscoveryOptions::default()
            .with_max_attempts(max_attempts)
            .with_min_targets(min_targets)
            .with_poll_interval(Duration::from_millis(1000))
    }

    #[test]
    fn test_merge_is_first_write_wins() {
        let mut state = DiscoveryState::new(3);

        assert_eq!(state.merge([page("A", "ws://first")]), 1);
        assert_eq!(state.merge([page("A", "ws://second"), page("B", "ws://b")]), 1);

        assert_eq!(state.targets().get("A").map(String::as_str), Some("ws://first"));
        assert_eq!(state.targets().len(), 2);
    }

    #[test]
    fn test_merge_filters_non_injectable() {
        let mut state = DiscoveryState::new(1);
        let mut no_url = page("C", "");
        no_url.web_socket_debugger_url = None;

        let added = state.merge([worker("W"), no_url, page("D", "")]);
        assert_eq!(added, 0);
        assert!(state.targets().is_empty());
    }

    #[test]
    fn test_status_transitions() {
        let mut state = DiscoveryState::new(2);
        state.record_attempt();
        assert_eq!(state.status(1), PollStatus::RetryPending);

        state.record_attempt();
        assert_eq!(state.status(1), PollStatus::GiveUp);

        state.merge([page("A", "ws://a")]);
        assert_eq!(state.status(1), PollStatus::Satisfied);
        assert_eq!(state.status(2), PollStatus::GiveUp);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_listing_gives_up_after_budget() {
        let listing = FakeListing::always_empty();
        let calls = Arc::clone(&listing.calls);
        let discovery = EndpointDiscovery::new(listing, options(10, 1));

        let started = Instant::now();
        let report = discovery.run(9222).await;

        assert!(report.targets.is_empty());
        assert_eq!(report.outcome, DiscoveryOutcome::GiveUp);
        assert_eq!(report.attempts, 10);
        assert_eq!(calls.lock().len(), 10);
        assert!(started.elapsed() >= Duration::from_millis(9000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_are_separated_by_interval() {
        let listing = FakeListing::always_empty();
        let calls = Arc::clone(&listing.calls);
        let discovery = EndpointDiscovery::new(listing, options(5, 1));

        discovery.run(9222).await;

        let calls = calls.lock();
        for pair in calls.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(1000));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_polls_do_not_abort() {
        let listing = FakeListing::new(vec![
            Err(Error::endpoint("connection refused")),
            Err(Error::endpoint("malformed")),
            Ok(vec![page("A", "ws://a")]),
        ]);
        let discovery = EndpointDiscovery::new(listing, options(10, 1));

        let report = discovery.run(9222).await;

        assert_eq!(report.outcome, DiscoveryOutcome::Satisfied);
        assert_eq!(report.attempts, 3);
        assert_eq!(report.targets.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_early_when_satisfied() {
        let listing = FakeListing::new(vec![Ok(vec![page("A", "ws://a"), page("B", "ws://b")])]);
        let calls = Arc::clone(&listing.calls);
        let discovery = EndpointDiscovery::new(listing, options(10, 2));

        let report = discovery.run(9222).await;

        assert_eq!(report.outcome, DiscoveryOutcome::Satisfied);
        assert_eq!(calls.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accumulates_across_polls() {
        let listing = FakeListing::new(vec![
            Ok(vec![page("A", "ws://a")]),
            Ok(vec![page("A", "ws://a-moved"), worker("W")]),
            Ok(vec![page("B", "ws://b")]),
        ]);
        let discovery = EndpointDiscovery::new(listing, options(10, 2));

        let targets = discovery.discover(9222).await;

        assert_eq!(targets.len(), 2);
        assert_eq!(targets.get("A").map(String::as_str), Some("ws://a"));
        assert_eq!(targets.get("B").map(String::as_str), Some("ws://b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_give_up_keeps_partial_result() {
        let listing = FakeListing::new(vec![Ok(vec![page("A", "ws://a")])]);
        let discovery = EndpointDiscovery::new(listing, options(3, 2));

        let report = discovery.run(9222).await;

        assert_eq!(report.outcome, DiscoveryOutcome::GiveUp);
        assert_eq!(report.attempts, 3);
        assert_eq!(report.targets.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_never_polls() {
        let listing = FakeListing::always_empty();
        let calls = Arc::clone(&listing.calls);
        let discovery = EndpointDiscovery::new(listing, options(0, 1));

        let report = discovery.run(9222).await;

        assert_eq!(report.attempts, 0);
        assert!(calls.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_once_counts_attempt_on_failure() {
        let listing = FakeListing::new(vec![Err(Error::endpoint("down"))]);
        let discovery = EndpointDiscovery::new(listing, options(5, 1));
        let mut state = DiscoveryState::new(5);

        let added = discovery.poll_once(9222, &mut state).await;

        assert_eq!(added, 0);
        assert_eq!(state.attempt_count(), 1);
        assert_eq!(state.max_attempts(), 5);
    }
}
