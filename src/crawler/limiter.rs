//! Counting permit pools
//!
//! The crawler owns two of these: one bounding how many seed traversals run at
//! once, one bounding how many page fetches are in flight across all seeds.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// A counting permit pool shared by every holder of a clone
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    name: &'static str,
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyLimiter {
    /// Creates a pool with `capacity` permits (at least one)
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name,
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits for a permit
    ///
    /// The permit is returned to the pool when dropped, including when the
    /// holding task fails or panics.
    pub async fn acquire(&self) -> OwnedSemaphorePermit {
        if self.permits.available_permits() == 0 {
            tracing::trace!("{} limiter saturated, waiting for a permit", self.name);
        }

        // The semaphore is never closed, so acquisition only ends with a permit
        match Arc::clone(&self.permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => unreachable!("{} limiter semaphore closed", self.name),
        }
    }

    /// Number of permits currently free
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Total number of permits
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
