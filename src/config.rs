//! Defines the configuration settings for the lead-sleuth application.

use anyhow::Context;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// TOML configuration file structure.
#[derive(Deserialize, Debug, Default)]
struct ConfigFile {
    network: Option<NetworkConfig>,
    search: Option<SearchConfig>,
    extraction: Option<ExtractionConfig>,
    cache: Option<CacheConfig>,
    storage: Option<StorageConfig>,
}

#[derive(Deserialize, Debug, Default)]
struct NetworkConfig {
    request_timeout: Option<u64>,
    min_sleep: Option<f32>,
    max_sleep: Option<f32>,
    user_agent: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct SearchConfig {
    serper_api_key: Option<String>,
    language: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct ExtractionConfig {
    min_phone_digits: Option<usize>,
    golden_intent_phrases: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
struct CacheConfig {
    ttl_secs: Option<u64>,
    max_entries: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
struct StorageConfig {
    leads_file: Option<String>,
}

/// Application configuration settings.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    /// Timeout for individual search-backend HTTP requests.
    pub request_timeout: Duration,
    /// Minimum and maximum sleep between outbound queries (seconds).
    pub sleep_between_requests: (f32, f32),
    /// User agent string for HTTP requests.
    pub user_agent: String,
    /// Serper API key; the Serper backend is skipped when absent.
    pub serper_api_key: Option<String>,
    /// Interface language hint passed to the search backend (Serper `hl`).
    pub search_language: String,
    /// Minimum digit count for a phone match to be kept.
    pub min_phone_digits: usize,
    /// How many customer-intent phrase templates the golden query uses.
    pub golden_intent_phrases: usize,
    /// How long a cached search response stays servable.
    pub cache_ttl: Duration,
    /// Size cap of the query response cache.
    pub cache_max_entries: usize,
    /// Path of the JSON lead store.
    pub leads_file: String,
}

impl Config {
    fn default() -> Self {
        Config {
            request_timeout: Duration::from_secs(10),
            sleep_between_requests: (0.1, 0.5),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36".to_string(),
            serper_api_key: None,
            search_language: "ar".to_string(),
            min_phone_digits: 8,
            golden_intent_phrases: 4,
            cache_ttl: Duration::from_secs(3600),
            cache_max_entries: 100,
            leads_file: "leads.json".to_string(),
        }
    }
}

/// Load configuration from a TOML file.
fn load_config_file(file_path: &str) -> anyhow::Result<ConfigFile> {
    let path = Path::new(file_path);
    if !path.exists() {
        tracing::warn!("Configuration file {} not found, using defaults", file_path);
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", file_path))?;

    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML configuration from {}", file_path))?;

    tracing::info!("Loaded configuration from {}", file_path);
    Ok(config)
}

fn apply_file_config(config: &mut Config, file_config: &ConfigFile) {
    if let Some(network) = &file_config.network {
        if let Some(timeout) = network.request_timeout {
            config.request_timeout = Duration::from_secs(timeout);
        }
        if let Some(min_sleep) = network.min_sleep {
            config.sleep_between_requests.0 = min_sleep;
        }
        if let Some(max_sleep) = network.max_sleep {
            config.sleep_between_requests.1 = max_sleep;
        }
        if let Some(user_agent) = &network.user_agent {
            config.user_agent = user_agent.clone();
        }
    }

    if let Some(search) = &file_config.search {
        if let Some(key) = &search.serper_api_key {
            config.serper_api_key = Some(key.clone());
        }
        if let Some(lang) = &search.language {
            config.search_language = lang.clone();
        }
    }

    if let Some(extraction) = &file_config.extraction {
        if let Some(digits) = extraction.min_phone_digits {
            config.min_phone_digits = digits;
        }
        if let Some(phrases) = extraction.golden_intent_phrases {
            config.golden_intent_phrases = phrases;
        }
    }

    if let Some(cache) = &file_config.cache {
        if let Some(ttl) = cache.ttl_secs {
            config.cache_ttl = Duration::from_secs(ttl);
        }
        if let Some(max) = cache.max_entries {
            config.cache_max_entries = max;
        }
    }

    if let Some(storage) = &file_config.storage {
        if let Some(file) = &storage.leads_file {
            config.leads_file = file.clone();
        }
    }
}

/// Apply environment variable overrides. Secrets come from the environment
/// so they never need to live in the config file.
fn apply_env(config: &mut Config) {
    if let Ok(key) = std::env::var("SERPER_API_KEY") {
        if !key.trim().is_empty() {
            config.serper_api_key = Some(key);
        }
    }
    if let Ok(file) = std::env::var("LEAD_SLEUTH_LEADS_FILE") {
        if !file.trim().is_empty() {
            config.leads_file = file;
        }
    }
}

fn validate_config(config: &mut Config) {
    if config.sleep_between_requests.0 > config.sleep_between_requests.1 {
        config.sleep_between_requests.1 = config.sleep_between_requests.0;
        tracing::warn!(
            "Min sleep was greater than max sleep. Setting both to {}",
            config.sleep_between_requests.0
        );
    }

    if config.min_phone_digits == 0 {
        config.min_phone_digits = 8;
        tracing::warn!("min_phone_digits was 0. Setting to default (8).");
    }

    if config.golden_intent_phrases == 0 {
        config.golden_intent_phrases = 1;
        tracing::warn!("golden_intent_phrases was 0. Setting to 1.");
    }

    if config.cache_max_entries == 0 {
        config.cache_max_entries = 1;
        tracing::warn!("cache_max_entries was 0. Setting to 1.");
    }
}

pub(crate) fn build_config() -> anyhow::Result<Config> {
    let mut config = Config::default();

    if let Ok(file_path) = std::env::var("LEAD_SLEUTH_CONFIG") {
        match load_config_file(&file_path) {
            Ok(file_config) => apply_file_config(&mut config, &file_config),
            Err(e) => {
                tracing::error!("Failed to load configuration file: {}", e);
            }
        }
    } else {
        for path in ["./lead-sleuth.toml", "./config.toml"].iter() {
            if Path::new(path).exists() {
                match load_config_file(path) {
                    Ok(file_config) => {
                        apply_file_config(&mut config, &file_config);
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load configuration from {}: {}", path, e);
                    }
                }
            }
        }
    }

    apply_env(&mut config);
    validate_config(&mut config);

    tracing::debug!("Final configuration: {:?}", config);

    Ok(config)
}

pub(crate) static CONFIG: Lazy<Config> = Lazy::new(|| match build_config() {
    Ok(config) => config,
    Err(e) => {
        eprintln!("ERROR: Failed to build configuration: {}", e);
        Config::default()
    }
});

/// Jittered pause between consecutive outbound queries within a hunt.
pub(crate) fn get_random_sleep_duration() -> Duration {
    use rand::Rng;
    let (min, max) = CONFIG.sleep_between_requests;
    if min >= max {
        return Duration::from_secs_f32(min);
    }
    let duration_secs = rand::thread_rng().gen_range(min..max);
    Duration::from_secs_f32(duration_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.min_phone_digits, 8);
        assert_eq!(config.golden_intent_phrases, 4);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.serper_api_key.is_none());
    }

    #[test]
    fn test_file_config_overrides() {
        let file_config: ConfigFile = toml::from_str(
            r#"
            [network]
            request_timeout = 5
            [extraction]
            min_phone_digits = 10
            [cache]
            max_entries = 7
            "#,
        )
        .unwrap();

        let mut config = Config::default();
        apply_file_config(&mut config, &file_config);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.min_phone_digits, 10);
        assert_eq!(config.cache_max_entries, 7);
        // Untouched sections keep their defaults.
        assert_eq!(config.search_language, "ar");
    }

    #[test]
    fn test_validation_repairs_bad_values() {
        let mut config = Config::default();
        config.sleep_between_requests = (2.0, 1.0);
        config.min_phone_digits = 0;
        config.cache_max_entries = 0;
        validate_config(&mut config);
        assert_eq!(config.sleep_between_requests, (2.0, 2.0));
        assert_eq!(config.min_phone_digits, 8);
        assert_eq!(config.cache_max_entries, 1);
    }
}
