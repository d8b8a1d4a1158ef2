use crate::output::traits::{CrawlSummary, PageResult, ResultSink};
use futures::future::{self, BoxFuture, FutureExt};
use std::sync::{Mutex, PoisonError};

/// Collects one seed's results in memory
///
/// Appends may arrive from any number of concurrent branches of the seed's
/// traversal. The summary is taken once the traversal has finished.
#[derive(Debug)]
pub struct Aggregator {
    seed_url: String,
    results: Mutex<Vec<PageResult>>,
}

impl Aggregator {
    /// Creates an empty aggregator for a seed
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            results: Mutex::new(Vec::new()),
        }
    }

    /// Appends a result
    pub fn push(&self, result: PageResult) {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result);
    }

    /// Number of results collected so far
    pub fn len(&self) -> usize {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing has been collected
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Takes the collected results as the seed's final summary
    pub fn finish(&self) -> CrawlSummary {
        let results = std::mem::take(
            &mut *self
                .results
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );

        tracing::debug!(
            "Summary for {} finalized with {} results",
            self.seed_url,
            results.len()
        );

        CrawlSummary {
            seed_url: self.seed_url.clone(),
            results,
        }
    }
}

impl ResultSink for Aggregator {
    fn accept(&self, result: PageResult) -> BoxFuture<'_, ()> {
        self.push(result);
        future::ready(()).boxed()
    }
}
