//! Result sink trait and the data it carries
//!
//! Every visited page produces exactly one `PageResult`, which is handed to the
//! request's `ResultSink`. Aggregate mode collects them into a `CrawlSummary`
//! per seed; webhook mode delivers them individually.

use futures::future::BoxFuture;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Payload of a leaf result for a link outside the seed's domain
pub const EXTERNAL_RESOURCE: &str = "external resource";

/// Payload of a fetched page whose extracted text is empty
pub const NO_INFORMATION: &str = "No information found";

/// The result for one visited URL
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageResult {
    /// The normalized URL of the page
    pub url: String,

    /// Extracted text, raw content, or a sentinel/error payload
    pub data: String,
}

impl PageResult {
    /// Creates a result with the given payload
    pub fn new(url: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            data: data.into(),
        }
    }

    /// Creates a leaf result for an out-of-scope link
    pub fn external(url: impl Into<String>) -> Self {
        Self::new(url, EXTERNAL_RESOURCE)
    }

    /// Creates a result whose payload describes a failure
    pub fn error(url: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::new(url, format!("Error: {}", message))
    }

    /// Number of whitespace-separated words in the payload
    pub fn word_count(&self) -> usize {
        self.data.split_whitespace().count()
    }

    /// Returns true if this is an out-of-scope leaf
    pub fn is_external(&self) -> bool {
        self.data == EXTERNAL_RESOURCE
    }
}

// wordCount is derived on every serialization rather than stored
impl Serialize for PageResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PageResult", 3)?;
        state.serialize_field("url", &self.url)?;
        state.serialize_field("data", &self.data)?;
        state.serialize_field("wordCount", &self.word_count())?;
        state.end()
    }
}

/// All results collected for one seed URL in aggregate mode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSummary {
    /// The seed URL as submitted
    pub seed_url: String,

    /// Results in arrival order; the order carries no meaning
    pub results: Vec<PageResult>,
}

impl CrawlSummary {
    /// Creates an empty summary for a seed
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            results: Vec::new(),
        }
    }

    /// Finds the result for a URL
    pub fn get(&self, url: &str) -> Option<&PageResult> {
        self.results.iter().find(|r| r.url == url)
    }

    /// Total words across all results
    pub fn total_words(&self) -> usize {
        self.results.iter().map(PageResult::word_count).sum()
    }
}

/// Destination for page results
///
/// Implementations are shared across concurrently running traversal branches
/// and must be thread-safe. Accepting a result never fails from the caller's
/// point of view; delivery problems are handled inside the sink.
pub trait ResultSink: Send + Sync {
    /// Takes ownership of a page result
    fn accept(&self, result: PageResult) -> BoxFuture<'_, ()>;
}
