//! Line-oriented result sink
//!
//! Each crawled page becomes one line:
//!
//! ```text
//! {latency_seconds:.2}, {geolocation}, {ip}, {url}
//! ```

use crate::RippleError;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use url::Url;

/// The outcome of crawling one URL
///
/// Built once, right before it is handed to the sink.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlRecord {
    url: Url,
    ip: String,
    geolocation: String,
    latency: Duration,
}

impl CrawlRecord {
    pub fn new(
        url: Url,
        ip: impl Into<String>,
        geolocation: impl Into<String>,
        latency: Duration,
    ) -> Self {
        Self {
            url,
            ip: ip.into(),
            geolocation: geolocation.into(),
            latency,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn geolocation(&self) -> &str {
        &self.geolocation
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

impl fmt::Display for CrawlRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}, {}, {}, {}",
            self.latency.as_secs_f64(),
            self.geolocation,
            self.ip,
            self.url
        )
    }
}

/// Appends records to a shared writer
///
/// A single mutex covers formatting, writing and flushing a record, so lines
/// from concurrent workers never interleave.
pub struct ResultSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ResultSink {
    /// Creates (or truncates) the result file at `path`
    pub fn create(path: impl AsRef<Path>) -> Result<Self, RippleError> {
        let file = File::create(path.as_ref())?;
        Ok(Self::from_writer(BufWriter::new(file)))
    }

    /// Wraps an arbitrary writer
    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Writes `record` as one line and flushes it
    pub fn append(&self, record: &CrawlRecord) -> Result<(), RippleError> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let line = format!("{}\n", record);

        writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| RippleError::Sink(format!("Failed to append {}: {}", record.url, e)))
    }

    pub fn flush(&self) -> Result<(), RippleError> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer
            .flush()
            .map_err(|e| RippleError::Sink(format!("Failed to flush results: {}", e)))
    }
}

impl fmt::Debug for ResultSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSink").finish_non_exhaustive()
    }
}
