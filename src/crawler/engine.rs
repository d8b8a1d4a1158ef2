//! Crawl engine - recursive traversal of each seed's reachable pages
//!
//! A request submits its seeds to the seed limiter. Each admitted seed is
//! traversed depth-first with concurrent fan-out: a page's own result is
//! handed to the sink, then every discovered link is visited in its own task.
//! The request completes only after every branch of every seed has finished.

use crate::config::{resolve_exclusions, validate, Config, DedupScope};
use crate::crawler::extract::{extract_text, LinkExtractor};
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchResult};
use crate::crawler::limiter::ConcurrencyLimiter;
use crate::crawler::registry::{SentLinkRegistry, VisitedRegistry};
use crate::output::{
    Aggregator, CrawlSummary, DeliveryStats, PageResult, ResultSink, WebhookDispatcher,
    NO_INFORMATION,
};
use crate::url::{normalize_parsed, normalize_url, parse_absolute, DomainMatcher};
use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use url::Url;

/// Per-request crawl options
///
/// Immutable for the duration of a request and passed explicitly to every
/// traversal branch.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Deliver results to this endpoint instead of aggregating them
    pub webhook_url: Option<Url>,

    /// Stop expanding a seed once it has produced this many results (0 = unbounded)
    ///
    /// Checked against a snapshot of the seed's result count before each
    /// fetch, so concurrent branches may overshoot it slightly.
    pub max_links_per_seed: usize,

    /// Emit extracted text (true) or the raw page content (false)
    pub clean_text: bool,

    /// Wait this long before each webhook delivery
    pub dispatch_delay: Duration,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            max_links_per_seed: 0,
            clean_text: true,
            dispatch_delay: Duration::ZERO,
        }
    }
}

impl CrawlConfig {
    pub fn with_webhook(mut self, endpoint: Url) -> Self {
        self.webhook_url = Some(endpoint);
        self
    }

    pub fn with_max_links(mut self, max_links_per_seed: usize) -> Self {
        self.max_links_per_seed = max_links_per_seed;
        self
    }

    pub fn with_clean_text(mut self, clean_text: bool) -> Self {
        self.clean_text = clean_text;
        self
    }

    pub fn with_dispatch_delay(mut self, delay: Duration) -> Self {
        self.dispatch_delay = delay;
        self
    }
}

/// What a request hands back to its caller
#[derive(Debug, Clone)]
pub enum CrawlOutcome {
    /// Aggregate mode: one summary per seed, in submission order
    Summaries(Vec<CrawlSummary>),

    /// Webhook mode: every delivery for every seed has been attempted
    Dispatched {
        seeds: usize,
        endpoint: Url,
        deliveries: DeliveryStats,
    },
}

impl CrawlOutcome {
    pub fn summaries(&self) -> Option<&[CrawlSummary]> {
        match self {
            Self::Summaries(summaries) => Some(summaries),
            Self::Dispatched { .. } => None,
        }
    }

    pub fn into_summaries(self) -> Option<Vec<CrawlSummary>> {
        match self {
            Self::Summaries(summaries) => Some(summaries),
            Self::Dispatched { .. } => None,
        }
    }
}

/// How the traversal treats a URL, decided in this order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Not an absolute HTTP(S) URL
    Invalid,
    /// The seed's result cap was reached
    LimitReached,
    /// Already scheduled earlier in this request
    AlreadyVisited,
    /// Outside the seed's domain; recorded as a leaf, never fetched
    OutOfScope { normalized: String },
    /// To be fetched and expanded
    Fetch { url: Url, normalized: String },
}

/// State shared by every request a crawler serves
#[derive(Debug)]
struct Shared {
    client: Client,
    matcher: DomainMatcher,
    links: LinkExtractor,
    seeds: ConcurrencyLimiter,
    fetches: ConcurrencyLimiter,
    sent: Arc<SentLinkRegistry>,
    dedup_scope: DedupScope,
}

/// Bounded-concurrency site crawler
///
/// Cheap to clone; clones share the HTTP client, both limiters and the
/// process-wide delivery registry.
#[derive(Debug, Clone)]
pub struct Crawler {
    shared: Arc<Shared>,
}

impl Crawler {
    /// Builds a crawler from validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to serve requests
    /// * `Err(SiftError)` - Invalid configuration, unreadable exclusion file,
    ///   or HTTP client construction failure
    pub fn new(config: &Config) -> crate::Result<Self> {
        validate(config)?;

        let matcher = DomainMatcher::new(config.filter.domain_name_pattern.as_deref())?;
        let excluded = resolve_exclusions(&config.filter)?;
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.limits.request_timeout_secs),
        )?;

        let sent = match config.webhook.dedup_ttl_secs {
            Some(secs) => SentLinkRegistry::with_ttl(Duration::from_secs(secs)),
            None => SentLinkRegistry::new(),
        };

        let seeds = ConcurrencyLimiter::new("seed", config.limits.max_concurrent_seeds as usize);
        let fetches =
            ConcurrencyLimiter::new("fetch", config.limits.max_concurrent_fetches as usize);

        tracing::debug!(
            "Crawler ready: {} seed permits, {} fetch permits, {} exclusions, domain pattern: {}",
            seeds.capacity(),
            fetches.capacity(),
            excluded.len(),
            matcher.has_pattern()
        );

        Ok(Self {
            shared: Arc::new(Shared {
                client,
                matcher,
                links: LinkExtractor::new(excluded),
                seeds,
                fetches,
                sent: Arc::new(sent),
                dedup_scope: config.webhook.dedup_scope,
            }),
        })
    }

    /// Crawls every seed and returns once all traversals have finished
    ///
    /// Individual page failures surface as result payloads; this never fails.
    pub async fn run(&self, seeds: &[String], options: &CrawlConfig) -> CrawlOutcome {
        tracing::info!(
            "Crawl request for {} seed(s): {}",
            seeds.len(),
            seeds.join(", ")
        );

        let visited = Arc::new(VisitedRegistry::new());

        let outcome = match &options.webhook_url {
            None => {
                let aggregators: Vec<Arc<Aggregator>> = seeds
                    .iter()
                    .map(|seed| Arc::new(Aggregator::new(seed.clone())))
                    .collect();

                let handles = seeds
                    .iter()
                    .zip(&aggregators)
                    .map(|(seed, aggregator)| {
                        let sink: Arc<dyn ResultSink> = aggregator.clone();
                        self.spawn_seed(seed.clone(), sink, &visited, options)
                    })
                    .collect();
                join_seeds(handles).await;

                let summaries: Vec<CrawlSummary> =
                    aggregators.iter().map(|aggregator| aggregator.finish()).collect();
                tracing::info!("Crawl request finished with {} summaries", summaries.len());
                CrawlOutcome::Summaries(summaries)
            }
            Some(endpoint) => {
                tracing::info!("Delivering results to webhook {}", endpoint);

                let sent = match self.shared.dedup_scope {
                    DedupScope::Process => Arc::clone(&self.shared.sent),
                    DedupScope::Request => Arc::new(SentLinkRegistry::new()),
                };
                let dispatcher = Arc::new(WebhookDispatcher::new(
                    self.shared.client.clone(),
                    endpoint.clone(),
                    options.dispatch_delay,
                    sent,
                ));

                let handles = seeds
                    .iter()
                    .map(|seed| {
                        let sink: Arc<dyn ResultSink> = dispatcher.clone();
                        self.spawn_seed(seed.clone(), sink, &visited, options)
                    })
                    .collect();
                join_seeds(handles).await;

                let deliveries = dispatcher.stats();
                tracing::info!(
                    "Crawl request finished: {} delivered, {} duplicates skipped, {} rejected, {} failed",
                    deliveries.delivered,
                    deliveries.duplicates,
                    deliveries.rejected,
                    deliveries.failed
                );
                CrawlOutcome::Dispatched {
                    seeds: seeds.len(),
                    endpoint: dispatcher.endpoint().clone(),
                    deliveries,
                }
            }
        };

        tracing::debug!("{} distinct URLs scheduled in this request", visited.len());
        outcome
    }

    /// Forgets every URL delivered through the process-wide registry
    pub fn reset_delivery_history(&self) {
        self.shared.sent.clear();
    }

    fn spawn_seed(
        &self,
        seed: String,
        sink: Arc<dyn ResultSink>,
        visited: &Arc<VisitedRegistry>,
        options: &CrawlConfig,
    ) -> JoinHandle<()> {
        let matcher = &self.shared.matcher;
        let seed_domain = normalize_url(&seed)
            .map(|normalized| matcher.domain_of(&normalized))
            .unwrap_or_else(|_| matcher.domain_of(&seed));

        let traversal = Arc::new(Traversal {
            shared: Arc::clone(&self.shared),
            visited: Arc::clone(visited),
            sink,
            seed_domain,
            max_links: options.max_links_per_seed,
            clean_text: options.clean_text,
            emitted: AtomicUsize::new(0),
        });
        let limiter = self.shared.seeds.clone();

        tokio::spawn(async move {
            let _permit = limiter.acquire().await;
            tracing::info!(
                "Starting traversal of {} (domain '{}')",
                seed,
                traversal.seed_domain
            );

            Arc::clone(&traversal).visit(seed.clone()).await;

            tracing::info!(
                "Finished traversal of {}: {} results",
                seed,
                traversal.emitted()
            );
        })
    }
}

async fn join_seeds(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        if let Err(e) = handle.await {
            tracing::error!("Seed traversal aborted: {}", e);
        }
    }
}

/// One seed's traversal context
struct Traversal {
    shared: Arc<Shared>,
    visited: Arc<VisitedRegistry>,
    sink: Arc<dyn ResultSink>,
    seed_domain: String,
    max_links: usize,
    clean_text: bool,
    emitted: AtomicUsize,
}

impl Traversal {
    fn emitted(&self) -> usize {
        self.emitted.load(Ordering::SeqCst)
    }

    /// Classifies a URL; admission into the visited registry happens here
    fn admit(&self, url: &str) -> Admission {
        let parsed = match parse_absolute(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid URL {}: {}", url, e);
                return Admission::Invalid;
            }
        };
        let normalized = normalize_parsed(&parsed);

        // A capped URL stays unclaimed so another seed can still fetch it
        if self.max_links > 0 && self.emitted() >= self.max_links {
            return Admission::LimitReached;
        }

        if !self.visited.try_admit(&normalized) {
            return Admission::AlreadyVisited;
        }

        let candidate = self.shared.matcher.domain_of(&normalized);
        if !DomainMatcher::in_scope(&self.seed_domain, &candidate) {
            return Admission::OutOfScope { normalized };
        }

        Admission::Fetch {
            url: parsed,
            normalized,
        }
    }

    fn visit(self: Arc<Self>, url: String) -> BoxFuture<'static, ()> {
        async move {
            match self.admit(&url) {
                Admission::Invalid => {
                    self.emit(PageResult::error(url, "Invalid URL")).await;
                }
                Admission::AlreadyVisited => {
                    tracing::debug!("URL {} already visited, skipping", url);
                }
                Admission::LimitReached => {
                    tracing::debug!(
                        "Result limit {} reached for seed domain '{}', skipping {}",
                        self.max_links,
                        self.seed_domain,
                        url
                    );
                }
                Admission::OutOfScope { normalized } => {
                    tracing::debug!(
                        "URL {} is outside domain '{}', recording as external",
                        normalized,
                        self.seed_domain
                    );
                    self.emit(PageResult::external(normalized)).await;
                }
                Admission::Fetch { url, normalized } => {
                    let links = self.fetch_and_emit(&url, &normalized).await;
                    self.expand(&normalized, links).await;
                }
            }
        }
        .boxed()
    }

    /// Fetches a page, emits its result and returns its outgoing links
    async fn fetch_and_emit(&self, url: &Url, normalized: &str) -> Vec<String> {
        let fetched = {
            let _permit = self.shared.fetches.acquire().await;
            tracing::debug!("Fetching {}", url);
            fetch_url(&self.shared.client, url).await
        };

        match fetched {
            FetchResult::Success {
                final_url,
                status_code,
                body,
            } => {
                tracing::debug!("Fetched {} ({} from {})", normalized, status_code, final_url);

                let links = self.shared.links.extract(&body, url);
                let data = if self.clean_text {
                    extract_text(&body)
                } else {
                    body
                };
                let data = if data.trim().is_empty() {
                    NO_INFORMATION.to_string()
                } else {
                    data
                };

                self.emit(PageResult::new(normalized, data)).await;
                links
            }
            failed => {
                let message = failed.failure_message().unwrap_or_default();
                tracing::error!("Failed to fetch {}: {}", normalized, message);
                self.emit(PageResult::error(normalized, message)).await;
                Vec::new()
            }
        }
    }

    /// Visits every link concurrently and waits for all of them
    async fn expand(self: Arc<Self>, parent: &str, links: Vec<String>) {
        if links.is_empty() {
            tracing::debug!("No links found on {}, branch complete", parent);
            return;
        }

        let mut branches = JoinSet::new();
        for link in links {
            branches.spawn(Arc::clone(&self).visit(link));
        }

        while let Some(joined) = branches.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Traversal branch under {} aborted: {}", parent, e);
            }
        }
    }

    async fn emit(&self, result: PageResult) {
        self.emitted.fetch_add(1, Ordering::SeqCst);
        self.sink.accept(result).await;
    }
}
