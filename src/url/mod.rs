//! URL handling module for Site-Sift
//!
//! This module provides URL normalization and the domain matcher that decides
//! whether a discovered link stays within a seed's crawl scope.

mod domain;
mod normalize;

pub use domain::DomainMatcher;
pub use normalize::{normalize_parsed, normalize_url, parse_absolute};
