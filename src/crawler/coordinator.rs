//! Crawler coordinator - worker pool orchestration
//!
//! This module wires the crawl together:
//! - Building the shared frontier, visited registry, sink and enrichment
//! - Seeding the frontier
//! - Running a fixed pool of workers until the frontier is drained
//! - Propagating cancellation and reporting the final statistics

use crate::config::Config;
use crate::crawler::worker::{Worker, WorkerContext};
use crate::crawler::{
    build_http_client, Frontier, HtmlLinkExtractor, HttpFetcher, LinkExtractor, PageFetcher,
    RetryPolicy, VisitedRegistry,
};
use crate::enrichment::{DnsResolver, Enricher, GeoLookup, HostResolver, IpApiClient};
use crate::output::{CrawlStats, CrawlSummary, ResultSink};
use crate::url::normalize_url;
use crate::RippleError;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

/// External collaborators of a crawl
pub struct CrawlParts {
    pub fetcher: Arc<dyn PageFetcher>,
    pub extractor: Arc<dyn LinkExtractor>,
    pub resolver: Arc<dyn HostResolver>,
    pub geo: Arc<dyn GeoLookup>,
    pub sink: ResultSink,
}

impl CrawlParts {
    /// Builds the production collaborators described by `config`
    ///
    /// Creates (or truncates) the result file.
    pub fn from_config(config: &Config) -> Result<Self, RippleError> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.fetch_timeout),
        )?;
        let geo = IpApiClient::from_config(&config.enrichment, &config.user_agent)?;
        let sink = ResultSink::create(&config.output.results_path)?;

        Ok(Self {
            fetcher: Arc::new(HttpFetcher::new(client)),
            extractor: Arc::new(HtmlLinkExtractor),
            resolver: Arc::new(DnsResolver),
            geo: Arc::new(geo),
            sink,
        })
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    workers: usize,
    ctx: WorkerContext,
    seeded: usize,
}

impl Coordinator {
    /// Creates a coordinator with real HTTP, DNS and geolocation collaborators
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to be seeded
    /// * `Err(RippleError)` - The HTTP client or the result file could not be set up
    pub fn new(config: Config) -> Result<Self, RippleError> {
        let parts = CrawlParts::from_config(&config)?;
        Ok(Self::from_parts(config, parts))
    }

    /// Creates a coordinator around the given collaborators
    pub fn from_parts(config: Config, parts: CrawlParts) -> Self {
        let crawler = &config.crawler;
        let retry = RetryPolicy::from_config(&config.enrichment);

        let ctx = WorkerContext {
            frontier: Arc::new(Frontier::new(crawler.limit, crawler.frontier_order)),
            visited: Arc::new(VisitedRegistry::new(crawler.limit)),
            fetcher: parts.fetcher,
            extractor: parts.extractor,
            enricher: Arc::new(Enricher::new(parts.resolver, parts.geo, retry)),
            sink: Arc::new(parts.sink),
            stats: Arc::new(CrawlStats::new()),
            pacing: Duration::from_millis(crawler.pacing_delay),
            cancel: CancellationToken::new(),
        };

        Self {
            workers: crawler.workers.max(1) as usize,
            ctx,
            seeded: 0,
        }
    }

    /// Admits seed URLs to the frontier and the visited registry
    ///
    /// Malformed seeds are skipped with a warning and duplicates count once.
    ///
    /// # Returns
    ///
    /// The number of seeds admitted.
    pub fn seed<I, S>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique = HashSet::new();
        let mut fresh: Vec<Url> = Vec::new();

        for raw in urls {
            let raw = raw.as_ref();
            match normalize_url(raw) {
                Ok(url) => {
                    if !self.ctx.visited.contains(&url) && unique.insert(url.clone()) {
                        fresh.push(url);
                    }
                }
                Err(e) => tracing::warn!("Skipping seed {:?}: {}", raw, e),
            }
        }

        self.ctx.visited.batch_insert(&fresh);
        let admitted = self.ctx.frontier.batch_insert(fresh);
        self.seeded += admitted;

        tracing::info!("Seeded frontier with {} URL(s)", admitted);
        admitted
    }

    /// Runs the worker pool until the frontier is drained or the crawl is cancelled
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - Every worker finished
    /// * `Err(RippleError)` - A worker task panicked or the sink could not be flushed
    pub async fn run(&self) -> Result<CrawlSummary, RippleError> {
        let start = Instant::now();

        if self.ctx.frontier.is_empty() {
            tracing::warn!("Frontier is empty, nothing to crawl");
        }
        tracing::info!(
            "Starting crawl with {} worker(s), {} URL(s) queued",
            self.workers,
            self.ctx.frontier.len()
        );

        let handles: Vec<_> = (0..self.workers)
            .map(|id| tokio::spawn(Worker::new(id, self.ctx.clone()).run()))
            .collect();

        let mut failure = None;
        for handle in handles {
            match handle.await {
                Ok(handled) => tracing::trace!("Worker joined after {} task(s)", handled),
                Err(e) => {
                    tracing::error!("Worker task failed: {}", e);
                    failure.get_or_insert(e);
                }
            }
        }

        self.ctx.sink.flush()?;
        if let Some(e) = failure {
            return Err(e.into());
        }

        let summary = self.ctx.stats.snapshot(self.seeded, start.elapsed());
        if self.ctx.cancel.is_cancelled() {
            tracing::info!(
                "Crawl cancelled: {} page(s) recorded, {} URL(s) left queued",
                summary.pages_recorded,
                self.ctx.frontier.len()
            );
        } else {
            tracing::info!(
                "Crawl complete: {} page(s) recorded in {:.1}s",
                summary.pages_recorded,
                summary.elapsed.as_secs_f64()
            );
        }

        Ok(summary)
    }

    /// Token that stops the crawl when cancelled
    ///
    /// Workers stop taking new URLs; tasks already in flight finish and
    /// record their page.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.ctx.cancel.clone()
    }

    pub fn frontier(&self) -> &Frontier {
        &self.ctx.frontier
    }

    pub fn visited(&self) -> &VisitedRegistry {
        &self.ctx.visited
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}
