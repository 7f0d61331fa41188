use crate::config::types::{Config, CrawlerConfig, StoreConfig};
use crate::ConfigError;

/// Upper bound on pending pages loaded per scheduling decision
const MAX_CANDIDATE_LIMIT: u32 = 1_000_000;

/// Upper bound on the redirect chain length
const MAX_REDIRECTS: u32 = 20;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_store_config(&config.store)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.candidate_limit < 1 || config.candidate_limit > MAX_CANDIDATE_LIMIT {
        return Err(ConfigError::Validation(format!(
            "candidate-limit must be between 1 and {}, got {}",
            MAX_CANDIDATE_LIMIT, config.candidate_limit
        )));
    }

    if config.max_redirects > MAX_REDIRECTS {
        return Err(ConfigError::Validation(format!(
            "max-redirects must be <= {}, got {}",
            MAX_REDIRECTS, config.max_redirects
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates store configuration
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
