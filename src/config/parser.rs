use crate::config::types::{Config, FilterConfig};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use site_sift::config::load_config;
///
/// let config = load_config(Path::new("site-sift.toml")).unwrap();
/// println!("Seed limit: {}", config.limits.max_concurrent_seeds);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Reads an exclusion file: one case-insensitive substring per line
///
/// Lines are trimmed (including a leading byte-order mark or zero-width space);
/// blank lines and lines starting with `#` are skipped.
pub fn load_exclusions(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_exclusions(&content))
}

fn parse_exclusions(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.trim().trim_start_matches(['\u{feff}', '\u{200b}']).trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Collects the inline exclusions and those from the exclusion file, in order
pub fn resolve_exclusions(filter: &FilterConfig) -> Result<Vec<String>, ConfigError> {
    let mut excluded = filter.excluded.clone();

    if let Some(file) = &filter.exclusion_file {
        let from_file = load_exclusions(Path::new(file))?;
        tracing::debug!("Loaded {} exclusions from {}", from_file.len(), file);
        excluded.extend(from_file);
    }

    Ok(excluded)
}
