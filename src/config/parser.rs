use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Environment variable overriding `store.database-path`
pub const ENV_DATABASE: &str = "TAGCRAWL_DATABASE";

/// Environment variable overriding `crawler.user-agent`
pub const ENV_USER_AGENT: &str = "TAGCRAWL_USER_AGENT";

/// Loads the configuration
///
/// Defaults are used when `path` is `None`. Environment overrides are applied
/// after the file is parsed, then the result is validated.
///
/// # Arguments
///
/// * `path` - Optional path to a TOML configuration file
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
/// use tagcrawl::config::load_config;
///
/// let config = load_config(Some(Path::new("tagcrawl.toml"))).unwrap();
/// println!("Database: {}", config.store.database_path);
/// ```
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate(&config)?;

    Ok(config)
}

/// Parses and validates configuration from TOML text, without env overrides
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Applies environment overrides using the given variable lookup
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(ENV_DATABASE).filter(|v| !v.is_empty()) {
        tracing::debug!("{} overrides database path: {}", ENV_DATABASE, path);
        config.store.database_path = path;
    }

    if let Some(agent) = lookup(ENV_USER_AGENT).filter(|v| !v.is_empty()) {
        config.crawler.user_agent = agent;
    }
}
