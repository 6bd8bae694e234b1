//! Free-port allocation for the remote debugging interface.
//!
//! The target application is told which port to open its debugging listener
//! on, so the port has to be picked before launch. A port counts as free
//! when a transient listener can be bound to it; the listener is dropped
//! immediately so the target can take the port over.
//!
//! # Probe Order
//!
//! Probing is strictly sequential: port `N + 1` is only tried after the bind
//! on port `N` has completed. Binding is exclusive OS state, so overlapping
//! probes could both succeed on the same port or hide each other's errors.

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use async_trait::async_trait;
use tokio::net::TcpListener;
use tracing::{debug, trace};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Lowest port handed out (first non-privileged port).
pub const MIN_PORT: u16 = 1024;

/// Highest port handed out.
pub const MAX_PORT: u16 = u16::MAX;

/// Address the probe listener binds to.
const PROBE_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

// ============================================================================
// PortProbe
// ============================================================================

/// Checks whether a single port can currently be bound.
#[async_trait]
pub trait PortProbe: Send + Sync {
    /// Returns `true` if `port` is free.
    ///
    /// Any bind failure (in use, permission denied) means not free.
    async fn is_free(&self, port: u16) -> bool;
}

/// Probe that binds a tokio [`TcpListener`] and releases it right away.
#[derive(Debug, Clone, Copy)]
pub struct TcpProbe {
    /// Address to bind on.
    ip: IpAddr,
}

impl TcpProbe {
    /// Creates a probe binding on the given address.
    #[inline]
    #[must_use]
    pub const fn new(ip: IpAddr) -> Self {
        Self { ip }
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(PROBE_IP)
    }
}

#[async_trait]
impl PortProbe for TcpProbe {
    async fn is_free(&self, port: u16) -> bool {
        match TcpListener::bind(SocketAddr::new(self.ip, port)).await {
            Ok(listener) => {
                drop(listener);
                true
            }
            Err(e) => {
                trace!(port, error = %e, "Port unavailable");
                false
            }
        }
    }
}

// ============================================================================
// PortAllocator
// ============================================================================

/// Finds the first free port in a range.
///
/// Keeps no state between calls; two allocations may return the same port
/// if nothing took it in between.
///
/// # Example
///
/// ```no_run
/// use devtools_inject::PortAllocator;
///
/// # async fn example() -> devtools_inject::Result<()> {
/// let port = PortAllocator::new().allocate(9222, 9322).await?;
/// println!("--remote-debugging-port={port}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct PortAllocator<P = TcpProbe> {
    /// Availability check for one port.
    probe: P,
}

impl PortAllocator<TcpProbe> {
    /// Creates an allocator that probes by binding on localhost.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_probe(TcpProbe::default())
    }
}

impl<P: PortProbe> PortAllocator<P> {
    /// Creates an allocator with a custom probe.
    #[inline]
    #[must_use]
    pub fn with_probe(probe: P) -> Self {
        Self { probe }
    }

    /// Returns the first free port in `start..=max`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `start` is below [`MIN_PORT`] or above `max`
    /// - [`Error::PortExhausted`] if every port in the range is unavailable
    pub async fn allocate(&self, start: u16, max: u16) -> Result<u16> {
        if start < MIN_PORT {
            return Err(Error::invalid_argument(format!(
                "start port {start} is below {MIN_PORT}"
            )));
        }

        if start > max {
            return Err(Error::invalid_argument(format!(
                "start port {start} is above max port {max}"
            )));
        }

        for port in start..=max {
            if self.probe.is_free(port).await {
                debug!(port, skipped = port - start, "Allocated free port");
                return Ok(port);
            }
        }

        Err(Error::port_exhausted(start, max))
    }

    /// Returns the first free port in `MIN_PORT..=MAX_PORT`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PortExhausted`] if no port is free.
    pub async fn allocate_default(&self) -> Result<u16> {
        self.allocate(MIN_PORT, MAX_PORT).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeSet;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use proptest::prelude::*;

    /// Probe backed by a fixed set of occupied ports, recording probe order.
    #[derive(Default)]
    struct FakeProbe {
        occupied: BTreeSet<u16>,
        probed: Arc<Mutex<Vec<u16>>>,
    }

    impl FakeProbe {
        fn occupied(ports: impl IntoIterator<Item = u16>) -> Self {
            Self {
                occupied: ports.into_iter().collect(),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl PortProbe for FakeProbe {
        async fn is_free(&self, port: u16) -> bool {
            self.probed.lock().push(port);
            !self.occupied.contains(&port)
        }
    }

    #[tokio::test]
    async fn test_skips_occupied_ports() {
        let allocator = PortAllocator::with_probe(FakeProbe::occupied(1024..=1030));
        let port = allocator.allocate_default().await.expect("port");
        assert_eq!(port, 1031);
    }

    #[tokio::test]
    async fn test_probes_sequentially_from_start() {
        let probe = FakeProbe::occupied(1024..=1030);
        let probed = Arc::clone(&probe.probed);
        let allocator = PortAllocator::with_probe(probe);

        allocator.allocate(1024, 2000).await.expect("port");
        assert_eq!(*probed.lock(), (1024..=1031).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_exhausted_when_all_occupied() {
        let allocator = PortAllocator::with_probe(FakeProbe::occupied(5000..=5010));
        let err = allocator.allocate(5000, 5010).await.unwrap_err();

        assert!(matches!(err, Error::PortExhausted { start: 5000, end: 5010 }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_full_range_does_not_overflow() {
        let allocator = PortAllocator::with_probe(FakeProbe::occupied(65530..=65535));
        let err = allocator.allocate(65530, MAX_PORT).await.unwrap_err();
        assert!(matches!(err, Error::PortExhausted { .. }));
    }

    #[tokio::test]
    async fn test_rejects_privileged_start() {
        let allocator = PortAllocator::with_probe(FakeProbe::default());
        let err = allocator.allocate(80, 2000).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_rejects_inverted_range() {
        let allocator = PortAllocator::with_probe(FakeProbe::default());
        assert!(allocator.allocate(3000, 2000).await.is_err());
    }

    #[tokio::test]
    async fn test_tcp_probe_sees_bound_port() {
        let held = TcpListener::bind(SocketAddr::new(PROBE_IP, 0))
            .await
            .expect("bind should succeed");
        let port = held.local_addr().expect("local addr").port();

        assert!(!TcpProbe::default().is_free(port).await);
    }

    #[tokio::test]
    async fn test_real_allocator_skips_held_port() {
        let held = TcpListener::bind(SocketAddr::new(PROBE_IP, 0))
            .await
            .expect("bind should succeed");
        let port = held.local_addr().expect("local addr").port();

        if port >= MIN_PORT {
            let err = PortAllocator::new().allocate(port, port).await.unwrap_err();
            assert!(matches!(err, Error::PortExhausted { .. }));
        }
    }

    proptest! {
        #[test]
        fn prop_returns_first_free_port_in_range(
            start in MIN_PORT..60000u16,
            len in 0u16..40,
            occupied in proptest::collection::btree_set(0u16..40, 0..40),
        ) {
            let max = start + len;
            let occupied: BTreeSet<u16> = occupied.into_iter().map(|o| start + o).collect();
            let expected = (start..=max).find(|p| !occupied.contains(p));

            let allocator = PortAllocator::with_probe(FakeProbe::occupied(occupied));
            let result = tokio_test::block_on(allocator.allocate(start, max));

            match expected {
                Some(port) => {
                    let got = result.expect("a free port exists");
                    prop_assert_eq!(got, port);
                    prop_assert!((MIN_PORT..=MAX_PORT).contains(&got));
                }
                None => prop_assert!(
                    matches!(result, Err(Error::PortExhausted { .. })),
                    "expected exhaustion, got {:?}",
                    result
                ),
            }
        }
    }
}
