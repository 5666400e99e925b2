use crate::config::PowConfig;
use crate::error::{BlockchainError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::sync::RwLock;

pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::new);

static DEFAULT_DB_PATH: &str = "data";

const DB_PATH_KEY: &str = "DB_PATH";
const DIFFICULTY_BITS_KEY: &str = "DIFFICULTY_BITS";
const MAX_NONCE_KEY: &str = "MAX_NONCE";
const MINING_WORKERS_KEY: &str = "MINING_WORKERS";

/// Process-level settings, seeded from the environment and overridable from
/// the command line.
pub struct Config {
    inner: RwLock<HashMap<String, String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Config {
        let mut map = HashMap::new();
        map.insert(
            String::from(DB_PATH_KEY),
            env::var(DB_PATH_KEY).unwrap_or_else(|_| String::from(DEFAULT_DB_PATH)),
        );

        for key in [DIFFICULTY_BITS_KEY, MAX_NONCE_KEY, MINING_WORKERS_KEY] {
            if let Ok(value) = env::var(key) {
                map.insert(String::from(key), value);
            }
        }

        Config {
            inner: RwLock::new(map),
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        let inner = self
            .inner
            .read()
            .expect("Failed to acquire read lock on config - this should never happen");
        inner.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        let mut inner = self
            .inner
            .write()
            .expect("Failed to acquire write lock on config - this should never happen");
        inner.insert(String::from(key), value);
    }

    fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| BlockchainError::Config(format!("Invalid value for {key}: {raw}"))),
            None => Ok(None),
        }
    }

    pub fn get_db_path(&self) -> String {
        self.get(DB_PATH_KEY)
            .unwrap_or_else(|| String::from(DEFAULT_DB_PATH))
    }

    pub fn set_db_path(&self, path: String) {
        self.set(DB_PATH_KEY, path);
    }

    pub fn set_difficulty_bits(&self, bits: u32) {
        self.set(DIFFICULTY_BITS_KEY, bits.to_string());
    }

    pub fn set_max_nonce(&self, max_nonce: i64) {
        self.set(MAX_NONCE_KEY, max_nonce.to_string());
    }

    pub fn set_mining_workers(&self, workers: usize) {
        self.set(MINING_WORKERS_KEY, workers.to_string());
    }

    /// Builds the proof-of-work parameters, falling back to the defaults for
    /// anything that was not configured.
    pub fn pow_config(&self) -> Result<PowConfig> {
        let mut config = match self.parse::<u32>(DIFFICULTY_BITS_KEY)? {
            Some(bits) => PowConfig::new(bits)?,
            None => PowConfig::default(),
        };
        if let Some(max_nonce) = self.parse::<i64>(MAX_NONCE_KEY)? {
            config = config.with_max_nonce(max_nonce)?;
        }
        if let Some(workers) = self.parse::<usize>(MINING_WORKERS_KEY)? {
            config = config.with_workers(workers)?;
        }
        Ok(config)
    }
}
