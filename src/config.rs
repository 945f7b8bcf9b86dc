//! Server configuration from environment variables
//!
//! | Variable | Default |
//! |---|---|
//! | `PORT` | 3000 |
//! | `UPSTREAM_URL` | `http://127.0.0.1:8000` |
//! | `UPSTREAM_TIMEOUT_SECS` | 10 |
//! | `CACHE_TTL_SECS` | 300 |
//! | `WEATHER_CACHE_TTL_SECS` | 1800 |
//! | `CACHE_CAPACITY` | 10000 |

use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub upstream_url: String,
    pub upstream_timeout: Duration,
    pub cache_ttl: Duration,
    pub weather_cache_ttl: Duration,
    pub cache_capacity: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            upstream_url: "http://127.0.0.1:8000".to_string(),
            upstream_timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(300),
            weather_cache_ttl: Duration::from_secs(1800),
            cache_capacity: 10_000,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production, a map in tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            port: parse_or(&lookup, "PORT", defaults.port),
            upstream_url: lookup("UPSTREAM_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.upstream_url),
            upstream_timeout: Duration::from_secs(parse_or(
                &lookup,
                "UPSTREAM_TIMEOUT_SECS",
                defaults.upstream_timeout.as_secs(),
            )),
            cache_ttl: Duration::from_secs(parse_or(&lookup, "CACHE_TTL_SECS", defaults.cache_ttl.as_secs())),
            weather_cache_ttl: Duration::from_secs(parse_or(
                &lookup,
                "WEATHER_CACHE_TTL_SECS",
                defaults.weather_cache_ttl.as_secs(),
            )),
            cache_capacity: parse_or(&lookup, "CACHE_CAPACITY", defaults.cache_capacity),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display + Copy,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}='{}', using {}", key, raw, default);
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(pairs: &[(&str, &str)]) -> ServerConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(from_map(&[]), ServerConfig::default());
    }

    #[test]
    fn test_overrides() {
        let cfg = from_map(&[
            ("PORT", "8080"),
            ("UPSTREAM_URL", "http://scoring:8000"),
            ("CACHE_TTL_SECS", "60"),
        ]);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.upstream_url, "http://scoring:8000");
        assert_eq!(cfg.cache_ttl, Duration::from_secs(60));
        assert_eq!(cfg.weather_cache_ttl, Duration::from_secs(1800));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let cfg = from_map(&[("PORT", "eighty"), ("CACHE_CAPACITY", "-5"), ("UPSTREAM_URL", " ")]);
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.cache_capacity, 10_000);
        assert_eq!(cfg.upstream_url, "http://127.0.0.1:8000");
    }
}
