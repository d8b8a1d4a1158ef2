use crate::config::types::{Config, FilterConfig, LimitsConfig, UserAgentConfig, WebhookConfig};
use crate::config::DedupScope;
use crate::url::DomainMatcher;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_limits(&config.limits)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_filter_config(&config.filter)?;
    validate_webhook_config(&config.webhook)?;
    Ok(())
}

/// Validates concurrency limits
fn validate_limits(config: &LimitsConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_seeds < 1 || config.max_concurrent_seeds > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_seeds must be between 1 and 100, got {}",
            config.max_concurrent_seeds
        )));
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 256 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 256, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates the domain pattern and exclusion entries
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    DomainMatcher::new(config.domain_name_pattern.as_deref())?;

    if config.excluded.iter().any(|s| s.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "excluded substrings cannot be blank".to_string(),
        ));
    }

    Ok(())
}

/// Validates webhook dedup settings
fn validate_webhook_config(config: &WebhookConfig) -> Result<(), ConfigError> {
    match (config.dedup_scope, config.dedup_ttl_secs) {
        (_, Some(0)) => Err(ConfigError::Validation(
            "dedup_ttl_secs must be >= 1".to_string(),
        )),
        (DedupScope::Request, Some(_)) => Err(ConfigError::Validation(
            "dedup_ttl_secs only applies to the process dedup scope".to_string(),
        )),
        _ => Ok(()),
    }
}
