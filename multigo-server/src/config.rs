use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Rooms idle for longer than this are evicted.
    pub room_ttl: Duration,
    pub sweep_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: 3000,
            room_ttl: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Missing or unparsable values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ServerConfig::default();
        ServerConfig {
            port: parse_or("PORT", lookup("PORT"), defaults.port),
            room_ttl: Duration::from_secs(parse_or(
                "ROOM_TTL_SECS",
                lookup("ROOM_TTL_SECS"),
                defaults.room_ttl.as_secs(),
            )),
            sweep_interval: Duration::from_secs(nonzero_or(
                "SWEEP_INTERVAL_SECS",
                parse_or(
                    "SWEEP_INTERVAL_SECS",
                    lookup("SWEEP_INTERVAL_SECS"),
                    defaults.sweep_interval.as_secs(),
                ),
                defaults.sweep_interval.as_secs(),
            )),
        }
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {key}={raw:?}, using {default}");
            default
        }),
    }
}

/// Timer periods must be positive.
fn nonzero_or(key: &str, value: u64, default: u64) -> u64 {
    if value == 0 {
        tracing::warn!("{key} must be positive, using {default}");
        return default;
    }
    value
}
