//! Enrichment of crawled pages with IP and geolocation facts
//!
//! This module handles:
//! - Resolving a page's host to an IP address
//! - Looking that IP up in a remote geolocation service
//! - Retrying the remote lookup with a fixed backoff before degrading to
//!   [`COUNTRY_NOT_FOUND`]
//!
//! Nothing here fails: every outcome is a best-effort [`Enrichment`].

mod geo;
mod resolver;

pub use geo::{GeoLookup, GeoResponse, IpApiClient};
pub use resolver::{DnsResolver, HostResolver};

use crate::crawler::RetryPolicy;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Geolocation label recorded when the country could not be determined
pub const COUNTRY_NOT_FOUND: &str = "Country Not Found";

/// Errors from a single geolocation attempt
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("Lookup request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Lookup reported status '{0}'")]
    Unsuccessful(String),

    #[error("Lookup returned no country")]
    MissingCountry,
}

/// IP and geolocation facts for one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    /// Resolved address, empty when resolution failed
    pub ip: String,

    /// Country name, or [`COUNTRY_NOT_FOUND`]
    pub geolocation: String,
}

impl Enrichment {
    pub fn is_located(&self) -> bool {
        self.geolocation != COUNTRY_NOT_FOUND
    }
}

/// Resolves and geolocates crawled URLs
pub struct Enricher {
    resolver: Arc<dyn HostResolver>,
    geo: Arc<dyn GeoLookup>,
    retry: RetryPolicy,
}

impl Enricher {
    pub fn new(
        resolver: Arc<dyn HostResolver>,
        geo: Arc<dyn GeoLookup>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            resolver,
            geo,
            retry,
        }
    }

    /// Produces the IP and geolocation of `url`
    pub async fn enrich(&self, url: &Url) -> Enrichment {
        let ip = self.resolve_ip(url).await;
        let geolocation = self.locate(&ip).await;
        Enrichment { ip, geolocation }
    }

    /// Resolves the host of `url`, returning an empty string on failure
    pub async fn resolve_ip(&self, url: &Url) -> String {
        let Some(host) = url.host_str() else {
            return String::new();
        };

        match self.resolver.resolve(host).await {
            Some(ip) => ip.to_string(),
            None => String::new(),
        }
    }

    /// Looks up the country of `ip` under the retry policy
    ///
    /// An empty IP short-circuits to [`COUNTRY_NOT_FOUND`] without a request.
    pub async fn locate(&self, ip: &str) -> String {
        if ip.is_empty() {
            return COUNTRY_NOT_FOUND.to_string();
        }

        let geo = &self.geo;
        let label = format!("Geolocation lookup for {}", ip);
        let result = self
            .retry
            .run(&label, |_| async move { geo.lookup(ip).await?.into_country() })
            .await;

        result.unwrap_or_else(|_| COUNTRY_NOT_FOUND.to_string())
    }
}
