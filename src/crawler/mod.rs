//! Crawler module for concurrent fetching and link expansion
//!
//! This module contains the core crawling logic, including:
//! - The bounded frontier and its in-flight task accounting
//! - At-most-once admission through the visited registry
//! - HTTP fetching and HTML link extraction
//! - The worker state machine and the pool coordinator

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod retry;
mod visited;
mod worker;

pub use coordinator::{Coordinator, CrawlParts};
pub use fetcher::{
    build_http_client, fetch_url, user_agent_string, FetchResult, HttpFetcher, PageFetcher,
};
pub use frontier::{Frontier, TaskPermit};
pub use parser::{extract_hrefs, HtmlLinkExtractor, LinkExtractor};
pub use retry::RetryPolicy;
pub use visited::VisitedRegistry;
pub use worker::{Worker, WorkerContext};
