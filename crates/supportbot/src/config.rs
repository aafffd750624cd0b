// supportbot/crates/supportbot/src/config.rs

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::memory_db::{DEFAULT_RECENT_LIMIT, DEFAULT_SESSION_LIMIT};

pub const DEFAULT_DB_PATH: &str = "chat_logs.db";
pub const DEFAULT_POOL_SIZE: u32 = 8;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub knowledge_path: Option<PathBuf>,
    pub recent_limit: usize,
    pub session_limit: usize,
    pub pool_size: u32,
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            knowledge_path: None,
            recent_limit: DEFAULT_RECENT_LIMIT,
            session_limit: DEFAULT_SESSION_LIMIT,
            pool_size: DEFAULT_POOL_SIZE,
            rng_seed: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            warn!("Failed to load .env file: {}. Using system environment variables.", e);
        } else {
            info!("Loaded environment variables from .env file");
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults, malformed
    /// values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let pool_size = Self::parse_or(&lookup, "SUPPORTBOT_POOL_SIZE", defaults.pool_size)?;
        if pool_size == 0 {
            return Err(anyhow::anyhow!("SUPPORTBOT_POOL_SIZE must be at least 1"));
        }

        let rng_seed = match lookup("SUPPORTBOT_RNG_SEED") {
            Some(raw) => Some(
                raw.trim()
                    .parse()
                    .with_context(|| format!("SUPPORTBOT_RNG_SEED is not a u64: {}", raw))?,
            ),
            None => None,
        };

        Ok(Self {
            db_path: lookup("SUPPORTBOT_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            knowledge_path: lookup("SUPPORTBOT_KNOWLEDGE_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            recent_limit: Self::parse_or(&lookup, "SUPPORTBOT_RECENT_LIMIT", defaults.recent_limit)?,
            session_limit: Self::parse_or(&lookup, "SUPPORTBOT_SESSION_LIMIT", defaults.session_limit)?,
            pool_size,
            rng_seed,
        })
    }

    fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
    where
        F: Fn(&str) -> Option<String>,
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match lookup(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid value for {}: {}", key, raw)),
            None => Ok(default),
        }
    }

    pub fn print_config(&self) {
        info!("Current Configuration:");
        info!("- Database: {}", self.db_path.display());
        match &self.knowledge_path {
            Some(path) => info!("- Knowledge Base: {}", path.display()),
            None => info!("- Knowledge Base: embedded"),
        }
        info!("- Recent Message Limit: {}", self.recent_limit);
        info!("- Session Limit: {}", self.session_limit);
        info!("- Pool Size: {}", self.pool_size);
        info!("- RNG Seed: {:?}", self.rng_seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    // ===== Defaults =====

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.db_path, PathBuf::from("chat_logs.db"));
        assert!(config.knowledge_path.is_none());
        assert_eq!(config.recent_limit, 500);
        assert_eq!(config.session_limit, 100);
        assert_eq!(config.pool_size, 8);
        assert!(config.rng_seed.is_none());
    }

    // ===== Overrides =====

    #[test]
    fn test_values_are_read() {
        let config = config_from(&[
            ("SUPPORTBOT_DB_PATH", "/var/lib/supportbot/logs.db"),
            ("SUPPORTBOT_KNOWLEDGE_PATH", "kb.json"),
            ("SUPPORTBOT_RECENT_LIMIT", " 50 "),
            ("SUPPORTBOT_POOL_SIZE", "2"),
            ("SUPPORTBOT_RNG_SEED", "1234"),
        ])
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/var/lib/supportbot/logs.db"));
        assert_eq!(config.knowledge_path, Some(PathBuf::from("kb.json")));
        assert_eq!(config.recent_limit, 50);
        assert_eq!(config.pool_size, 2);
        assert_eq!(config.rng_seed, Some(1234));
    }

    #[test]
    fn test_blank_knowledge_path_means_embedded() {
        let config = config_from(&[("SUPPORTBOT_KNOWLEDGE_PATH", "  ")]).unwrap();
        assert!(config.knowledge_path.is_none());
    }

    // ===== Validation =====

    #[test]
    fn test_malformed_numbers_are_errors() {
        assert!(config_from(&[("SUPPORTBOT_RECENT_LIMIT", "lots")]).is_err());
        assert!(config_from(&[("SUPPORTBOT_POOL_SIZE", "-1")]).is_err());
        assert!(config_from(&[("SUPPORTBOT_RNG_SEED", "0x10")]).is_err());
    }

    #[test]
    fn test_zero_pool_size_is_rejected() {
        let err = config_from(&[("SUPPORTBOT_POOL_SIZE", "0")]).unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }
}
