//! Webhook delivery of page results
//!
//! Each result is posted as JSON to the configured endpoint. A URL is posted at
//! most once per `SentLinkRegistry`; duplicates are dropped without a request.
//! Delivery failures are logged and never reach the traversal.

use crate::crawler::SentLinkRegistry;
use crate::output::traits::{PageResult, ResultSink};
use crate::SiftError;
use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Outcome of one dispatch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The endpoint answered with a success status
    Delivered,
    /// The URL was already delivered; nothing was sent
    Duplicate,
    /// The endpoint answered with a non-success status
    Rejected(u16),
    /// The request could not be sent
    Failed,
}

/// Per-outcome delivery counts of one dispatcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    pub delivered: usize,
    pub duplicates: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl DeliveryStats {
    /// Results that reached the endpoint or were attempted
    pub fn attempted(&self) -> usize {
        self.delivered + self.rejected + self.failed
    }
}

#[derive(Debug, Default)]
struct DeliveryCounters {
    delivered: AtomicUsize,
    duplicates: AtomicUsize,
    rejected: AtomicUsize,
    failed: AtomicUsize,
}

impl DeliveryCounters {
    fn record(&self, delivery: Delivery) {
        let counter = match delivery {
            Delivery::Delivered => &self.delivered,
            Delivery::Duplicate => &self.duplicates,
            Delivery::Rejected(_) => &self.rejected,
            Delivery::Failed => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> DeliveryStats {
        DeliveryStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Posts page results to a webhook endpoint
///
/// Clones share the delivery counters.
#[derive(Debug, Clone)]
pub struct WebhookDispatcher {
    client: Client,
    endpoint: Url,
    delay: Duration,
    sent: Arc<SentLinkRegistry>,
    counters: Arc<DeliveryCounters>,
}

impl WebhookDispatcher {
    /// Creates a dispatcher
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for the POST requests
    /// * `endpoint` - The webhook URL
    /// * `delay` - Pacing delay slept before each delivery (zero for none)
    /// * `sent` - Registry of already delivered URLs; share it to dedup across requests
    pub fn new(client: Client, endpoint: Url, delay: Duration, sent: Arc<SentLinkRegistry>) -> Self {
        Self {
            client,
            endpoint,
            delay,
            sent,
            counters: Arc::default(),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Counts of every dispatch outcome so far
    pub fn stats(&self) -> DeliveryStats {
        self.counters.snapshot()
    }

    /// Delivers a result unless its URL was delivered before
    ///
    /// The pacing delay applies to this delivery only; concurrent deliveries
    /// each wait their own delay.
    pub async fn dispatch(&self, result: &PageResult) -> Delivery {
        let delivery = self.deliver(result).await;
        self.counters.record(delivery);
        delivery
    }

    async fn deliver(&self, result: &PageResult) -> Delivery {
        if !self.sent.try_admit(&result.url) {
            tracing::debug!("Skipping duplicate webhook delivery for {}", result.url);
            return Delivery::Duplicate;
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.post(result).await {
            Ok(status) if status.is_success() => {
                tracing::info!(
                    "Delivered result for {} to webhook {}",
                    result.url,
                    self.endpoint
                );
                Delivery::Delivered
            }
            Ok(status) => {
                tracing::warn!(
                    "Webhook {} rejected result for {}: {}",
                    self.endpoint,
                    result.url,
                    status
                );
                Delivery::Rejected(status.as_u16())
            }
            Err(e) => {
                tracing::error!("Failed to deliver result for {}: {}", result.url, e);
                Delivery::Failed
            }
        }
    }

    async fn post(&self, result: &PageResult) -> Result<reqwest::StatusCode, SiftError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(result)
            .send()
            .await
            .map_err(|source| SiftError::Http {
                url: self.endpoint.to_string(),
                source,
            })?;

        Ok(response.status())
    }
}

impl ResultSink for WebhookDispatcher {
    fn accept(&self, result: PageResult) -> BoxFuture<'_, ()> {
        async move {
            self.dispatch(&result).await;
        }
        .boxed()
    }
}
