//! Output module for crawl results and run statistics
//!
//! This module handles:
//! - Appending one result line per crawled page
//! - Counting crawl events and summarizing the run

mod sink;
pub mod stats;

pub use sink::{CrawlRecord, ResultSink};
pub use stats::{CrawlStats, CrawlSummary};
