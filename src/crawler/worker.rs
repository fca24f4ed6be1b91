//! Crawl worker
//!
//! A worker repeatedly acquires a task from the frontier and walks it through
//! `Fetching → Enriching → Recording → Expanding` before going back to
//! `Idle`. It stops (`Done`) once the frontier reports the crawl drained or
//! the crawl is cancelled. No single URL's failure ends the loop.

use crate::crawler::{FetchResult, Frontier, LinkExtractor, PageFetcher, VisitedRegistry};
use crate::enrichment::Enricher;
use crate::output::{CrawlRecord, CrawlStats, ResultSink};
use crate::state::WorkerState;
use crate::url::parse_candidate;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Shared collaborators handed to every worker
#[derive(Clone)]
pub struct WorkerContext {
    pub frontier: Arc<Frontier>,
    pub visited: Arc<VisitedRegistry>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub extractor: Arc<dyn LinkExtractor>,
    pub enricher: Arc<Enricher>,
    pub sink: Arc<ResultSink>,
    pub stats: Arc<CrawlStats>,

    /// Pause after each processed URL
    pub pacing: Duration,

    pub cancel: CancellationToken,
}

/// One member of the worker pool
pub struct Worker {
    id: usize,
    state: WorkerState,
    ctx: WorkerContext,
}

impl Worker {
    pub fn new(id: usize, ctx: WorkerContext) -> Self {
        Self {
            id,
            state: WorkerState::Idle,
            ctx,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Processes tasks until the crawl is drained or cancelled
    ///
    /// Returns the number of tasks this worker took from the frontier.
    pub async fn run(mut self) -> usize {
        tracing::debug!("Worker {} started", self.id);
        let frontier = Arc::clone(&self.ctx.frontier);
        let mut handled = 0;

        loop {
            let Some(permit) = frontier.acquire(&self.ctx.cancel).await else {
                break;
            };

            self.process(permit.url()).await;
            handled += 1;

            // Links found by this task are already queued; releasing the
            // permit only now keeps idle workers from seeing a false drain.
            drop(permit);

            if !self.ctx.pacing.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.ctx.pacing) => {}
                    _ = self.ctx.cancel.cancelled() => {}
                }
            }
        }

        self.transition(WorkerState::Done);
        tracing::debug!("Worker {} finished after {} task(s)", self.id, handled);
        handled
    }

    async fn process(&mut self, url: &Url) {
        self.transition(WorkerState::Fetching);
        tracing::debug!("Worker {} fetching {}", self.id, url);

        let (body, elapsed) = match self.ctx.fetcher.fetch(url).await {
            FetchResult::Success {
                final_url,
                status_code,
                body,
                elapsed,
            } => {
                tracing::debug!("Fetched {} ({}) in {:?}", url, status_code, elapsed);
                if final_url != url.as_str() {
                    tracing::trace!("{} redirected to {}", url, final_url);
                }
                (body, elapsed)
            }
            FetchResult::NetworkError { error, elapsed } => {
                tracing::warn!("Abandoning {} after {:?}: {}", url, elapsed, error);
                self.ctx.stats.record_fetch_failure();
                self.transition(WorkerState::Idle);
                return;
            }
        };

        self.transition(WorkerState::Enriching);
        let enrichment = self.ctx.enricher.enrich(url).await;
        if !enrichment.is_located() {
            self.ctx.stats.record_geo_fallback();
        }

        self.transition(WorkerState::Recording);
        let record = CrawlRecord::new(
            url.clone(),
            enrichment.ip,
            enrichment.geolocation,
            elapsed,
        );
        match self.ctx.sink.append(&record) {
            Ok(()) => self.ctx.stats.record_page(),
            Err(e) => {
                tracing::error!("{}", e);
                self.ctx.stats.record_sink_error();
            }
        }

        self.transition(WorkerState::Expanding);
        self.expand(url, &body);

        self.transition(WorkerState::Idle);
    }

    /// Admits every unseen, well-formed link found in `body`
    fn expand(&self, url: &Url, body: &str) {
        let candidates = self.ctx.extractor.extract_links(body);
        let mut admitted = 0;
        let mut malformed = 0;

        for href in &candidates {
            let Some(link) = parse_candidate(href) else {
                malformed += 1;
                continue;
            };
            if self.ctx.visited.check_and_insert(&link) && self.ctx.frontier.insert(link) {
                admitted += 1;
            }
        }

        tracing::debug!(
            "{}: {} link(s), {} admitted, {} malformed",
            url,
            candidates.len(),
            admitted,
            malformed
        );
        self.ctx
            .stats
            .record_links(candidates.len() as u64, admitted, malformed);
    }

    fn transition(&mut self, next: WorkerState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal worker transition {} -> {}",
            self.state,
            next
        );
        tracing::trace!("Worker {}: {} -> {}", self.id, self.state, next);
        self.state = next;
    }
}
