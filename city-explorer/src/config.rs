use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::models::ResourceKind;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Reads an optional secret, treating an empty value as unset.
fn env_secret(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub providers: ProvidersConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub local_path: Option<String>,
    pub busy_timeout_ms: u64,
    pub journal_mode: String,
    pub synchronous: String,
}

impl DatabaseConfig {
    /// A local file (or `:memory:`) database with default pragmas.
    pub fn local(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_token: None,
            local_path: None,
            busy_timeout_ms: 5000,
            journal_mode: "WAL".to_string(),
            synchronous: "NORMAL".to_string(),
        }
    }
}

/// Credentials and endpoint of one upstream provider.
#[derive(Clone, Deserialize)]
pub struct ProviderEndpoint {
    pub base_url: String,
    pub api_key: Option<String>,
}

// Keys must never reach the logs, so Debug is written by hand.
impl std::fmt::Debug for ProviderEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEndpoint")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ProviderEndpoint {
    fn from_env(base_url_var: &str, default_base_url: &str, api_key_var: &str) -> Self {
        Self {
            base_url: env::var(base_url_var)
                .unwrap_or_else(|_| default_base_url.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: env_secret(api_key_var),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    pub geocode: ProviderEndpoint,
    pub weather: ProviderEndpoint,
    pub events: ProviderEndpoint,
    pub movies: ProviderEndpoint,
    pub yelp: ProviderEndpoint,
    pub trails: ProviderEndpoint,
    pub timeout_secs: u64,
}

impl ProvidersConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Names of the environment variables whose keys are missing.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        [
            ("GEOCODE_API_KEY", &self.geocode),
            ("WEATHER_API_KEY", &self.weather),
            ("EVENTBRITE_API_KEY", &self.events),
            ("MOVIE_API_KEY", &self.movies),
            ("YELP_API_KEY", &self.yelp),
            ("TRAIL_API_KEY", &self.trails),
        ]
        .into_iter()
        .filter(|(_, endpoint)| endpoint.api_key.is_none())
        .map(|(var, _)| var)
        .collect()
    }
}

/// Freshness windows and resolver behaviour for the lookaside cache.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub weather_secs: u64,
    pub events_secs: u64,
    pub movies_secs: u64,
    pub yelp_secs: u64,
    pub trails_secs: u64,
    pub enforce_freshness: bool,
    pub sweep_interval_secs: u64,
    pub single_flight: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            weather_secs: 15,
            events_secs: 6 * 60 * 60,
            movies_secs: 30 * 24 * 60 * 60,
            yelp_secs: 24 * 60 * 60,
            trails_secs: 7 * 24 * 60 * 60,
            enforce_freshness: true,
            sweep_interval_secs: 3600,
            single_flight: true,
        }
    }
}

impl CacheConfig {
    /// Staleness window for a resource. Locations never go stale.
    pub fn window(&self, kind: ResourceKind) -> Option<Duration> {
        let secs = match kind {
            ResourceKind::Location => return None,
            ResourceKind::Weather => self.weather_secs,
            ResourceKind::Event => self.events_secs,
            ResourceKind::Movie => self.movies_secs,
            ResourceKind::Business => self.yelp_secs,
            ResourceKind::Trail => self.trails_secs,
        };
        Some(Duration::from_secs(secs))
    }

    /// The window the resolver should apply, honouring `enforce_freshness`.
    pub fn freshness(&self, kind: ResourceKind) -> Option<Duration> {
        if self.enforce_freshness {
            self.window(kind)
        } else {
            None
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let cache_defaults = CacheConfig::default();

        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("PORT", 3000),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "file:city_explorer.db".to_string()),
                auth_token: env_secret("DATABASE_AUTH_TOKEN"),
                local_path: env::var("DATABASE_LOCAL_PATH").ok(),
                busy_timeout_ms: parse_env_or("DATABASE_BUSY_TIMEOUT_MS", 5000),
                journal_mode: env::var("DATABASE_JOURNAL_MODE")
                    .unwrap_or_else(|_| "WAL".to_string()),
                synchronous: env::var("DATABASE_SYNCHRONOUS")
                    .unwrap_or_else(|_| "NORMAL".to_string()),
            },
            providers: ProvidersConfig {
                geocode: ProviderEndpoint::from_env(
                    "GEOCODE_BASE_URL",
                    "https://maps.googleapis.com",
                    "GEOCODE_API_KEY",
                ),
                weather: ProviderEndpoint::from_env(
                    "WEATHER_BASE_URL",
                    "https://api.darksky.net",
                    "WEATHER_API_KEY",
                ),
                events: ProviderEndpoint::from_env(
                    "EVENTBRITE_BASE_URL",
                    "https://www.eventbriteapi.com",
                    "EVENTBRITE_API_KEY",
                ),
                movies: ProviderEndpoint::from_env(
                    "MOVIE_BASE_URL",
                    "https://api.themoviedb.org",
                    "MOVIE_API_KEY",
                ),
                yelp: ProviderEndpoint::from_env(
                    "YELP_BASE_URL",
                    "https://api.yelp.com",
                    "YELP_API_KEY",
                ),
                trails: ProviderEndpoint::from_env(
                    "TRAIL_BASE_URL",
                    "https://www.hikingproject.com",
                    "TRAIL_API_KEY",
                ),
                timeout_secs: parse_env_or("PROVIDER_TIMEOUT_SECS", 8),
            },
            cache: CacheConfig {
                weather_secs: parse_env_or("CACHE_WEATHER_SECS", cache_defaults.weather_secs),
                events_secs: parse_env_or("CACHE_EVENTS_SECS", cache_defaults.events_secs),
                movies_secs: parse_env_or("CACHE_MOVIES_SECS", cache_defaults.movies_secs),
                yelp_secs: parse_env_or("CACHE_YELP_SECS", cache_defaults.yelp_secs),
                trails_secs: parse_env_or("CACHE_TRAILS_SECS", cache_defaults.trails_secs),
                enforce_freshness: parse_env_or(
                    "CACHE_ENFORCE_FRESHNESS",
                    cache_defaults.enforce_freshness,
                ),
                sweep_interval_secs: parse_env_or(
                    "CACHE_SWEEP_INTERVAL_SECS",
                    cache_defaults.sweep_interval_secs,
                ),
                single_flight: parse_env_or("RESOLVER_SINGLE_FLIGHT", cache_defaults.single_flight),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_cache_defaults_follow_refresh_intervals() {
        for var in [
            "CACHE_WEATHER_SECS",
            "CACHE_EVENTS_SECS",
            "CACHE_MOVIES_SECS",
            "CACHE_YELP_SECS",
            "CACHE_TRAILS_SECS",
            "CACHE_ENFORCE_FRESHNESS",
        ] {
            std::env::remove_var(var);
        }

        let config = Config::default();
        assert_eq!(
            config.cache.window(ResourceKind::Weather),
            Some(Duration::from_secs(15))
        );
        assert_eq!(
            config.cache.window(ResourceKind::Business),
            Some(Duration::from_secs(86_400))
        );
        assert_eq!(
            config.cache.window(ResourceKind::Movie),
            Some(Duration::from_secs(2_592_000))
        );
        assert_eq!(config.cache.window(ResourceKind::Location), None);
        assert!(config.cache.enforce_freshness);
    }

    #[test]
    #[serial]
    fn test_freshness_disabled_by_env() {
        std::env::set_var("CACHE_ENFORCE_FRESHNESS", "false");
        let config = Config::default();
        std::env::remove_var("CACHE_ENFORCE_FRESHNESS");

        assert!(config.cache.window(ResourceKind::Trail).is_some());
        assert_eq!(config.cache.freshness(ResourceKind::Trail), None);
    }

    #[test]
    #[serial]
    fn test_invalid_numeric_value_falls_back_to_default() {
        std::env::set_var("PROVIDER_TIMEOUT_SECS", "soon");
        let config = Config::default();
        std::env::remove_var("PROVIDER_TIMEOUT_SECS");

        assert_eq!(config.providers.timeout_secs, 8);
    }

    #[test]
    #[serial]
    fn test_base_url_override_is_trimmed_and_key_is_redacted() {
        std::env::set_var("YELP_BASE_URL", "http://127.0.0.1:9999/");
        std::env::set_var("YELP_API_KEY", "super-secret");
        let config = Config::default();
        std::env::remove_var("YELP_BASE_URL");
        std::env::remove_var("YELP_API_KEY");

        assert_eq!(config.providers.yelp.base_url, "http://127.0.0.1:9999");
        let debug = format!("{:?}", config.providers.yelp);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    #[serial]
    fn test_missing_keys_lists_unset_providers() {
        std::env::set_var("GEOCODE_API_KEY", "g");
        std::env::set_var("WEATHER_API_KEY", "  ");
        let config = Config::default();
        std::env::remove_var("GEOCODE_API_KEY");
        std::env::remove_var("WEATHER_API_KEY");

        let missing = config.providers.missing_keys();
        assert!(!missing.contains(&"GEOCODE_API_KEY"));
        assert!(missing.contains(&"WEATHER_API_KEY"));
    }
}
