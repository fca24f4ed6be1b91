//! Crawl frontier and the termination protocol
//!
//! The frontier is the shared queue of pending URLs. It also owns the count of
//! in-flight tasks so that "queue empty" and "nobody is still working" are
//! decided under the same lock. A worker that finds the queue empty while
//! another worker is mid-task parks on a [`Notify`] instead of exiting, so
//! links produced by the last in-flight page are never lost.

use crate::config::FrontierOrder;
use crate::RippleError;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use url::Url;

#[derive(Debug, Default)]
struct FrontierState {
    /// URLs waiting to be handed out
    queue: VecDeque<Url>,

    /// Total admissions over the lifetime of the crawl (never decremented)
    admitted: usize,

    /// Tasks handed out whose permit has not been dropped yet
    in_flight: usize,
}

impl FrontierState {
    fn admit(&mut self, url: Url, limit: Option<usize>) -> bool {
        if limit.is_some_and(|limit| self.admitted >= limit) {
            tracing::trace!("Frontier full, dropping {}", url);
            return false;
        }
        self.admitted += 1;
        self.queue.push_back(url);
        true
    }

    fn take(&mut self, order: FrontierOrder) -> Option<Url> {
        match order {
            FrontierOrder::Fifo => self.queue.pop_front(),
            FrontierOrder::Lifo => self.queue.pop_back(),
        }
    }
}

/// Capacity-bounded, thread-safe queue of pending URLs
///
/// All operations take the same mutex and never hold it across an `.await`.
/// The capacity bounds the number of admissions, so `len() <= limit` holds at
/// all times and a URL popped from a full frontier does not make room for
/// another one.
#[derive(Debug)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    limit: Option<usize>,
    order: FrontierOrder,
    wake: Notify,
}

/// Proof that a worker owns one in-flight task
///
/// Dropping the permit marks the task finished and wakes parked workers, so
/// the in-flight count cannot leak even if the task bails out early.
#[derive(Debug)]
pub struct TaskPermit<'a> {
    frontier: &'a Frontier,
    url: Url,
}

impl TaskPermit<'_> {
    /// The URL this task is processing
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Drop for TaskPermit<'_> {
    fn drop(&mut self) {
        self.frontier.release();
    }
}

impl Frontier {
    /// Creates a new frontier
    ///
    /// # Arguments
    ///
    /// * `limit` - Maximum number of admissions, `None` for unbounded
    /// * `order` - Whether the oldest or the newest URL is handed out first
    pub fn new(limit: Option<usize>, order: FrontierOrder) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            limit,
            order,
            wake: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admits a URL if capacity remains
    ///
    /// Returns false when the frontier is full; the URL is silently dropped.
    pub fn insert(&self, url: Url) -> bool {
        let admitted = self.lock().admit(url, self.limit);
        if admitted {
            self.wake.notify_waiters();
        }
        admitted
    }

    /// Admits several URLs under a single lock hold
    ///
    /// Honors the same capacity rule as repeated [`insert`](Self::insert)
    /// calls. Returns the number of URLs admitted.
    pub fn batch_insert<I>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = Url>,
    {
        let mut admitted = 0;
        {
            let mut state = self.lock();
            for url in urls {
                if state.admit(url, self.limit) {
                    admitted += 1;
                }
            }
        }
        if admitted > 0 {
            self.wake.notify_waiters();
        }
        admitted
    }

    /// Removes and returns one URL
    ///
    /// This does not register an in-flight task; workers use
    /// [`acquire`](Self::acquire) instead.
    ///
    /// # Errors
    ///
    /// Returns [`RippleError::EmptyFrontier`] when nothing is queued.
    pub fn pop(&self) -> Result<Url, RippleError> {
        self.lock()
            .take(self.order)
            .ok_or(RippleError::EmptyFrontier)
    }

    /// Snapshot of queue emptiness; not enough on its own to decide termination
    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    /// Number of URLs waiting to be handed out
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    /// Number of tasks currently being processed
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Total number of URLs ever admitted
    pub fn admitted(&self) -> usize {
        self.lock().admitted
    }

    /// Returns true once the queue is empty and no task is in flight
    pub fn is_drained(&self) -> bool {
        let state = self.lock();
        state.queue.is_empty() && state.in_flight == 0
    }

    /// Waits for the next task
    ///
    /// Pops a URL and counts it as in flight in one critical section. When the
    /// queue is empty but other tasks are still in flight, parks until one of
    /// them inserts a URL or finishes.
    ///
    /// # Returns
    ///
    /// * `Some(TaskPermit)` - A URL to process
    /// * `None` - The crawl is drained or `cancel` fired
    pub async fn acquire(&self, cancel: &CancellationToken) -> Option<TaskPermit<'_>> {
        loop {
            if cancel.is_cancelled() {
                return None;
            }

            // Register interest before inspecting state so a wake-up sent
            // between the check and the await is not lost.
            let notified = self.wake.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(url) = state.take(self.order) {
                    state.in_flight += 1;
                    return Some(TaskPermit {
                        frontier: self,
                        url,
                    });
                }
                if state.in_flight == 0 {
                    drop(state);
                    self.wake.notify_waiters();
                    return None;
                }
                tracing::trace!(
                    "Frontier empty with {} task(s) in flight, waiting",
                    state.in_flight
                );
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = cancel.cancelled() => return None,
            }
        }
    }

    fn release(&self) {
        {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.wake.notify_waiters();
    }
}
