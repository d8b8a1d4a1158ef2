//! Crawler module for page fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with outcome classification
//! - HTML link and text extraction
//! - Concurrency limiting and the visited/delivered registries
//! - Recursive traversal of every seed

mod engine;
mod extract;
mod fetcher;
mod limiter;
mod registry;

pub use engine::{Admission, CrawlConfig, CrawlOutcome, Crawler};
pub use extract::{extract_text, LinkExtractor};
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use limiter::ConcurrencyLimiter;
pub use registry::{SentLinkRegistry, VisitedRegistry};
