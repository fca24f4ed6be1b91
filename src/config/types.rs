use serde::Deserialize;

/// Main configuration structure for Geo-Ripple
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of workers draining the frontier
    pub workers: u32,

    /// Maximum number of URLs ever admitted to the frontier and visited set
    #[serde(default)]
    pub limit: Option<usize>,

    /// Pause after each processed URL (milliseconds)
    #[serde(rename = "pacing-delay", default)]
    pub pacing_delay: u64,

    /// Page fetch timeout (seconds)
    #[serde(rename = "fetch-timeout", default = "default_fetch_timeout")]
    pub fetch_timeout: u64,

    /// Order in which the frontier hands out URLs
    #[serde(rename = "frontier-order", default)]
    pub frontier_order: FrontierOrder,
}

/// Pop order of the frontier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontierOrder {
    /// Oldest URL first (breadth-first)
    #[default]
    Fifo,
    /// Newest URL first (depth-first)
    Lifo,
}

/// Geolocation lookup configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    /// Base URL of the lookup service; the IP is appended as a path segment
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Attempts made against the lookup service before giving up
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed pause between attempts (milliseconds)
    #[serde(default = "default_backoff")]
    pub backoff: u64,

    /// Per-request timeout (seconds)
    #[serde(default = "default_lookup_timeout")]
    pub timeout: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            max_attempts: default_max_attempts(),
            backoff: default_backoff(),
            timeout: default_lookup_timeout(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// File the crawl records are appended to (truncated at start)
    #[serde(rename = "results-path")]
    pub results_path: String,

    /// File of seed URLs, one per line
    #[serde(rename = "seed-path")]
    pub seed_path: String,
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_endpoint() -> String {
    "http://ip-api.com/json".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff() -> u64 {
    1000
}

fn default_lookup_timeout() -> u64 {
    10
}
