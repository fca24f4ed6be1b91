//! Registry of every URL ever admitted to the frontier

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

/// Thread-safe set of admitted URLs, used for at-most-once admission
///
/// [`check_and_insert`](Self::check_and_insert) is the only admission
/// primitive: testing membership and inserting happen in one critical section,
/// so two workers discovering the same link can never both admit it.
#[derive(Debug)]
pub struct VisitedRegistry {
    urls: Mutex<HashSet<Url>>,
    limit: Option<usize>,
}

impl VisitedRegistry {
    /// Creates an empty registry holding at most `limit` URLs
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            urls: Mutex::new(HashSet::new()),
            limit,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<Url>> {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn has_room(&self, len: usize) -> bool {
        self.limit.map_or(true, |limit| len < limit)
    }

    /// Atomically admits `url` if it is new and capacity remains
    ///
    /// # Returns
    ///
    /// * `true` - The URL was newly admitted; the caller should enqueue it
    /// * `false` - Already seen, or the registry is full
    pub fn check_and_insert(&self, url: &Url) -> bool {
        let mut urls = self.lock();
        if !self.has_room(urls.len()) || urls.contains(url) {
            return false;
        }
        urls.insert(url.clone())
    }

    /// Seeds the registry before workers start
    ///
    /// Duplicates in `urls` are counted once. Returns the number of distinct
    /// URLs newly inserted.
    pub fn batch_insert<'a, I>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = &'a Url>,
    {
        let mut set = self.lock();
        let mut inserted = 0;
        for url in urls {
            if !self.has_room(set.len()) {
                break;
            }
            if set.insert(url.clone()) {
                inserted += 1;
            }
        }
        inserted
    }

    /// Returns true if `url` has been admitted
    ///
    /// For inspection only; do not pair with a later insert to admit URLs.
    pub fn contains(&self, url: &Url) -> bool {
        self.lock().contains(url)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
