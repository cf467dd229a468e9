//! Process configuration loaded from `STOCKFINDER_*` environment variables.
//!
//! Every value has a default. Unparsable or out-of-range values are logged and
//! replaced by the default instead of aborting startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use stockfinder_catalog::StockThresholds;
use stockfinder_search::SearchConfig;

pub const BIND_ADDR_VAR: &str = "STOCKFINDER_BIND_ADDR";
pub const LOW_STOCK_THRESHOLD_VAR: &str = "STOCKFINDER_LOW_STOCK_THRESHOLD";
pub const STORE_TIMEOUT_MS_VAR: &str = "STOCKFINDER_STORE_TIMEOUT_MS";
pub const RECENT_LIMIT_VAR: &str = "STOCKFINDER_RECENT_LIMIT";
pub const SEED_FILE_VAR: &str = "STOCKFINDER_SEED_FILE";
pub const MAX_SESSIONS_VAR: &str = "STOCKFINDER_MAX_SESSIONS";
pub const SESSION_IDLE_SECS_VAR: &str = "STOCKFINDER_SESSION_IDLE_SECS";

const DEFAULT_STORE_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_RECENT_LIMIT: usize = 10;
const DEFAULT_MAX_SESSIONS: usize = 10_000;
const DEFAULT_SESSION_IDLE_SECS: u64 = 900;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub thresholds: StockThresholds,
    pub store_timeout: Duration,
    /// Page size for "recent" history and reservation listings.
    pub recent_limit: usize,
    /// Optional catalog seed document loaded at startup.
    pub seed_file: Option<PathBuf>,
    /// Upper bound on per-user search sessions kept by the API.
    pub max_sessions: usize,
    pub session_idle: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            thresholds: StockThresholds::default(),
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            recent_limit: DEFAULT_RECENT_LIMIT,
            seed_file: None,
            max_sessions: DEFAULT_MAX_SESSIONS,
            session_idle: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let bind_addr = parse_or(&lookup, BIND_ADDR_VAR, defaults.bind_addr);

        let low = parse_or(&lookup, LOW_STOCK_THRESHOLD_VAR, StockThresholds::DEFAULT_LOW);
        let thresholds = StockThresholds::new(low).unwrap_or_else(|e| {
            tracing::warn!(var = LOW_STOCK_THRESHOLD_VAR, error = %e, "invalid threshold; using default");
            defaults.thresholds
        });

        let store_timeout = Duration::from_millis(parse_or(
            &lookup,
            STORE_TIMEOUT_MS_VAR,
            DEFAULT_STORE_TIMEOUT_MS,
        ));

        let recent_limit = positive_or(&lookup, RECENT_LIMIT_VAR, DEFAULT_RECENT_LIMIT);
        let max_sessions = positive_or(&lookup, MAX_SESSIONS_VAR, DEFAULT_MAX_SESSIONS);
        let session_idle = Duration::from_secs(positive_or(
            &lookup,
            SESSION_IDLE_SECS_VAR,
            DEFAULT_SESSION_IDLE_SECS,
        ));

        let seed_file = lookup(SEED_FILE_VAR)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);

        Self {
            bind_addr,
            thresholds,
            store_timeout,
            recent_limit,
            seed_file,
            max_sessions,
            session_idle,
        }
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            thresholds: self.thresholds,
            store_timeout: self.store_timeout,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            tracing::warn!(var = key, value = %raw, %default, "unparsable value; using default");
            default
        }
    }
}

/// Like [`parse_or`], but zero also falls back to the default.
fn positive_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + PartialEq + Default + Copy,
{
    let value = parse_or(lookup, key, default);
    if value == T::default() {
        tracing::warn!(var = key, %default, "value must be positive; using default");
        return default;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = config_from(&[]);
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(cfg.thresholds.low(), 5);
        assert_eq!(cfg.store_timeout, Duration::from_secs(2));
        assert_eq!(cfg.recent_limit, 10);
        assert_eq!(cfg.max_sessions, 10_000);
        assert_eq!(cfg.session_idle, Duration::from_secs(900));
    }

    #[test]
    fn reads_every_variable() {
        let cfg = config_from(&[
            (BIND_ADDR_VAR, "127.0.0.1:9000"),
            (LOW_STOCK_THRESHOLD_VAR, "3"),
            (STORE_TIMEOUT_MS_VAR, "250"),
            (RECENT_LIMIT_VAR, "25"),
            (SEED_FILE_VAR, "/etc/stockfinder/seed.json"),
            (MAX_SESSIONS_VAR, "500"),
            (SESSION_IDLE_SECS_VAR, "60"),
        ]);
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(cfg.thresholds.low(), 3);
        assert_eq!(cfg.store_timeout, Duration::from_millis(250));
        assert_eq!(cfg.recent_limit, 25);
        assert_eq!(cfg.seed_file, Some(PathBuf::from("/etc/stockfinder/seed.json")));
        assert_eq!(cfg.max_sessions, 500);
        assert_eq!(cfg.session_idle, Duration::from_secs(60));

        let search = cfg.search_config();
        assert_eq!(search.thresholds.low(), 3);
        assert_eq!(search.store_timeout, Duration::from_millis(250));
    }

    #[test]
    fn bad_values_fall_back_to_defaults() {
        let cfg = config_from(&[
            (BIND_ADDR_VAR, "not-an-address"),
            (LOW_STOCK_THRESHOLD_VAR, "0"),
            (STORE_TIMEOUT_MS_VAR, "soon"),
            (RECENT_LIMIT_VAR, "0"),
            (SEED_FILE_VAR, "  "),
            (MAX_SESSIONS_VAR, "0"),
            (SESSION_IDLE_SECS_VAR, "-5"),
        ]);
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn negative_threshold_is_unparsable() {
        let cfg = config_from(&[(LOW_STOCK_THRESHOLD_VAR, "-1")]);
        assert_eq!(cfg.thresholds.low(), StockThresholds::DEFAULT_LOW);
    }
}
