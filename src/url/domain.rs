use crate::ConfigError;
use regex::{Regex, RegexBuilder};
use url::Url;

/// Derives domain identifiers from URLs and decides crawl scope
///
/// With a configured pattern, the identifier is the first capture group of the
/// first match (case-insensitive). Without one, it is the lowercased host.
#[derive(Debug, Clone, Default)]
pub struct DomainMatcher {
    pattern: Option<Regex>,
}

impl DomainMatcher {
    /// Builds a matcher from an optional regular expression
    ///
    /// # Returns
    ///
    /// * `Ok(DomainMatcher)` - The pattern compiled and has a capture group
    /// * `Err(ConfigError::InvalidPattern)` - The pattern is unusable
    ///
    /// # Examples
    ///
    /// ```
    /// use site_sift::url::DomainMatcher;
    ///
    /// let matcher = DomainMatcher::new(Some(r"https?://(?:www\.)?([^/:]+)")).unwrap();
    /// assert_eq!(matcher.domain_of("https://www.Example.com/a"), "Example.com");
    /// assert!(DomainMatcher::new(Some("no-group")).is_err());
    /// ```
    pub fn new(pattern: Option<&str>) -> Result<Self, ConfigError> {
        let pattern = match pattern.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => p,
            None => return Ok(Self::default()),
        };

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;

        // Group 0 is the whole match
        if regex.captures_len() < 2 {
            return Err(ConfigError::InvalidPattern(format!(
                "'{}' must contain a capture group for the domain name",
                pattern
            )));
        }

        Ok(Self {
            pattern: Some(regex),
        })
    }

    /// Returns the domain identifier of a URL, or an empty string if none
    pub fn domain_of(&self, url: &str) -> String {
        match &self.pattern {
            Some(regex) => regex
                .captures(url)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            None => Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
                .unwrap_or_default(),
        }
    }

    /// Checks whether a candidate domain stays within the seed's scope
    ///
    /// An empty identifier on either side means the scope cannot be decided,
    /// which is treated as in scope.
    pub fn in_scope(seed_domain: &str, candidate_domain: &str) -> bool {
        seed_domain.is_empty() || candidate_domain.is_empty() || seed_domain == candidate_domain
    }

    /// Returns true if a pattern is configured
    pub fn has_pattern(&self) -> bool {
        self.pattern.is_some()
    }
}
