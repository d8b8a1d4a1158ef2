//! Configuration module for Site-Sift
//!
//! This module handles loading, parsing, and validating the TOML configuration
//! file and the exclusion-substring list.
//!
//! # Example
//!
//! ```no_run
//! use site_sift::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("site-sift.toml")).unwrap();
//! println!("Fetch limit: {}", config.limits.max_concurrent_fetches);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DedupScope, FilterConfig, LimitsConfig, UserAgentConfig, WebhookConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, load_exclusions, resolve_exclusions,
};
pub use validation::validate;
