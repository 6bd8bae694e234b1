//! HTTP client for the target listing endpoint.
//!
//! The debugging interface publishes its inspectable targets at
//! `http://127.0.0.1:<port>/json/list`. Each request carries a `t=<millis>`
//! query parameter so no intermediate cache can serve a stale listing while
//! the application is still opening windows.

// ============================================================================
// Imports
// ============================================================================

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::Client;
use tracing::trace;
use url::Url;

use crate::error::{Error, Result};
use crate::protocol::{DebugTarget, parse_listing};

// ============================================================================
// Constants
// ============================================================================

/// Host the debugging interface listens on.
pub const LISTING_HOST: &str = "127.0.0.1";

/// Path of the listing endpoint.
pub const LISTING_PATH: &str = "/json/list";

/// Upper bound for a single listing request.
///
/// A listener that accepts but never answers counts as an unreachable
/// attempt instead of stalling discovery.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// ListingSource
// ============================================================================

/// Source of target listings for a debugging port.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetches the current target list.
    ///
    /// # Errors
    ///
    /// Any failure to obtain or parse the listing.
    async fn list_targets(&self, port: u16) -> Result<Vec<DebugTarget>>;
}

// ============================================================================
// HttpListing
// ============================================================================

/// [`ListingSource`] that queries the real listing endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpListing {
    /// Shared HTTP client.
    client: Client,
}

impl HttpListing {
    /// Creates a listing client with [`DEFAULT_REQUEST_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Creates a listing client with a custom per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).no_proxy().build()?;
        Ok(Self { client })
    }

    /// Builds the listing URL for a port with the given cache-buster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Url`] if the URL cannot be built.
    pub fn listing_url(port: u16, cache_buster: u128) -> Result<Url> {
        let mut url = Url::parse(&format!("http://{LISTING_HOST}:{port}{LISTING_PATH}"))?;
        url.query_pairs_mut()
            .append_pair("t", &cache_buster.to_string());
        Ok(url)
    }
}

#[async_trait]
impl ListingSource for HttpListing {
    async fn list_targets(&self, port: u16) -> Result<Vec<DebugTarget>> {
        let url = Self::listing_url(port, cache_buster())?;
        trace!(%url, "Requesting target listing");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::endpoint(format!("HTTP status {status}")));
        }

        let body = response.text().await?;
        parse_listing(&body)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Milliseconds since the Unix epoch.
fn cache_buster() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================
