//! Crawl statistics
//!
//! Workers bump lock-free counters as they go; the coordinator takes a
//! [`CrawlSummary`] snapshot once the pool has stopped.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Live counters shared by every worker
#[derive(Debug, Default)]
pub struct CrawlStats {
    pages_recorded: AtomicU64,
    fetch_failures: AtomicU64,
    geo_fallbacks: AtomicU64,
    sink_errors: AtomicU64,
    links_seen: AtomicU64,
    links_admitted: AtomicU64,
    malformed_links: AtomicU64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page(&self) {
        self.pages_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_geo_fallback(&self) {
        self.geo_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sink_error(&self) {
        self.sink_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one page's link expansion
    pub fn record_links(&self, seen: u64, admitted: u64, malformed: u64) {
        self.links_seen.fetch_add(seen, Ordering::Relaxed);
        self.links_admitted.fetch_add(admitted, Ordering::Relaxed);
        self.malformed_links.fetch_add(malformed, Ordering::Relaxed);
    }

    pub fn pages_recorded(&self) -> u64 {
        self.pages_recorded.load(Ordering::Relaxed)
    }

    /// Takes a point-in-time copy of every counter
    pub fn snapshot(&self, seeded: usize, elapsed: Duration) -> CrawlSummary {
        CrawlSummary {
            seeded,
            pages_recorded: self.pages_recorded.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            geo_fallbacks: self.geo_fallbacks.load(Ordering::Relaxed),
            sink_errors: self.sink_errors.load(Ordering::Relaxed),
            links_seen: self.links_seen.load(Ordering::Relaxed),
            links_admitted: self.links_admitted.load(Ordering::Relaxed),
            malformed_links: self.malformed_links.load(Ordering::Relaxed),
            elapsed,
        }
    }
}

/// Final statistics of a crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Seed URLs admitted at start
    pub seeded: usize,

    /// Records written to the sink
    pub pages_recorded: u64,

    /// URLs abandoned because the page could not be fetched
    pub fetch_failures: u64,

    /// Pages whose geolocation fell back to "Country Not Found"
    pub geo_fallbacks: u64,

    /// Records the sink failed to persist
    pub sink_errors: u64,

    /// Raw href candidates extracted
    pub links_seen: u64,

    /// Candidates admitted to the frontier
    pub links_admitted: u64,

    /// Candidates rejected as malformed or non-http(s)
    pub malformed_links: u64,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl CrawlSummary {
    /// Pages that reached the fetch step, successfully or not
    pub fn pages_attempted(&self) -> u64 {
        self.pages_recorded + self.fetch_failures
    }

    /// Share of recorded pages that were geolocated, in percent
    pub fn geolocated_rate(&self) -> f64 {
        if self.pages_recorded == 0 {
            return 0.0;
        }
        let located = self.pages_recorded.saturating_sub(self.geo_fallbacks);
        (located as f64 / self.pages_recorded as f64) * 100.0
    }
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Crawl Statistics ===")?;
        writeln!(f)?;
        writeln!(f, "Overview:")?;
        writeln!(f, "  Seed URLs: {}", self.seeded)?;
        writeln!(f, "  Pages attempted: {}", self.pages_attempted())?;
        writeln!(f, "  Pages recorded: {}", self.pages_recorded)?;
        writeln!(f, "  Fetch failures: {}", self.fetch_failures)?;
        if self.sink_errors > 0 {
            writeln!(f, "  Unwritten records: {}", self.sink_errors)?;
        }
        writeln!(f, "  Duration: {:.1}s", self.elapsed.as_secs_f64())?;
        writeln!(f)?;
        writeln!(f, "Links:")?;
        writeln!(f, "  Seen: {}", self.links_seen)?;
        writeln!(f, "  Admitted: {}", self.links_admitted)?;
        writeln!(f, "  Malformed: {}", self.malformed_links)?;
        writeln!(f)?;
        write!(
            f,
            "Geolocated: {:.1}% ({} fell back to Country Not Found)",
            self.geolocated_rate(),
            self.geo_fallbacks
        )
    }
}
