//! Output module: where page results go
//!
//! This module handles:
//! - The `ResultSink` trait shared by both output modes
//! - In-memory aggregation of results into per-seed summaries
//! - Webhook delivery of individual results with cross-run deduplication

mod aggregator;
mod traits;
mod webhook;

pub use aggregator::Aggregator;
pub use traits::{CrawlSummary, PageResult, ResultSink, EXTERNAL_RESOURCE, NO_INFORMATION};
pub use webhook::{Delivery, DeliveryStats, WebhookDispatcher};
