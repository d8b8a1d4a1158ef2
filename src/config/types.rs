use serde::Deserialize;

/// Main configuration structure for Site-Sift
///
/// Every section is optional; a missing file section falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// Process-wide concurrency and timeout limits
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum number of seed traversals running at once
    #[serde(rename = "max-concurrent-seeds", default = "default_max_concurrent_seeds")]
    pub max_concurrent_seeds: u32,

    /// Maximum number of page fetches in flight at once, across all seeds
    #[serde(
        rename = "max-concurrent-fetches",
        default = "default_max_concurrent_fetches"
    )]
    pub max_concurrent_fetches: u32,

    /// Per-request timeout for fetches and webhook deliveries (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_seeds: default_max_concurrent_seeds(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_max_concurrent_seeds() -> u32 {
    10
}

fn default_max_concurrent_fetches() -> u32 {
    32
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

fn default_crawler_name() -> String {
    "site-sift".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Link filtering and domain scope configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    /// Regular expression whose first capture group is the domain identifier
    #[serde(rename = "domain-name-pattern", default)]
    pub domain_name_pattern: Option<String>,

    /// File with one excluded substring per line
    #[serde(rename = "exclusion-file", default)]
    pub exclusion_file: Option<String>,

    /// Additional excluded substrings
    #[serde(default)]
    pub excluded: Vec<String>,
}

/// Lifetime of the delivered-URL registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupScope {
    /// One registry shared by every request the crawler serves
    #[default]
    Process,
    /// A fresh registry for each request
    Request,
}

/// Webhook delivery configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookConfig {
    #[serde(rename = "dedup-scope", default)]
    pub dedup_scope: DedupScope,

    /// Forget delivered URLs after this many seconds (process scope only)
    #[serde(rename = "dedup-ttl-secs", default)]
    pub dedup_ttl_secs: Option<u64>,
}
