//! Sealdex configuration
//!
//! Configuration is loaded from a TOML or JSON file (chosen by extension), then
//! overridden by `SEALDEX_*` environment variables, then validated. Every field has
//! a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Result, SealdexError};

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "SEALDEX_";

/// Default field prime, 2^255 - 19
pub const DEFAULT_PRIME_HEX: &str =
    "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffed";

/// Index construction settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// A term is a keyword when its corpus-wide count is strictly greater than this
    pub threshold: u64,
    /// Directory receiving keywords, index and document blobs
    pub output_dir: PathBuf,
    /// Maximum concurrent document writes
    pub write_concurrency: usize,
    /// Worker threads for per-document work (0 = one per core)
    pub worker_threads: usize,
    /// Symmetric key length in bytes (16 or 32)
    pub key_bytes: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            threshold: 0,
            output_dir: PathBuf::from(".sealdex"),
            write_concurrency: 16,
            worker_threads: 0,
            key_bytes: 16,
        }
    }
}

/// Secret sharing settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharingConfig {
    /// Number of data users; the custodian is numbered `data_users + 1`
    pub data_users: u16,
    /// Field prime as big-endian hex
    pub prime_hex: String,
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            data_users: 10,
            prime_hex: DEFAULT_PRIME_HEX.to_string(),
        }
    }
}

/// Index store service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Address the index store listens on and the coordinator connects to
    pub store_addr: String,
    /// Deadline for one index store round trip
    pub request_timeout_ms: u64,
    /// The store drops a connection that sends no request for this long
    pub idle_timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store_addr: "127.0.0.1:8004".to_string(),
            request_timeout_ms: 5_000,
            idle_timeout_ms: 30_000,
        }
    }
}

impl ServiceConfig {
    /// Request timeout as a duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Idle connection timeout as a duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SealdexConfig {
    /// Index construction
    pub index: IndexConfig,
    /// Secret sharing
    pub sharing: SharingConfig,
    /// Index store service
    pub service: ServiceConfig,
}

impl SealdexConfig {
    /// Load from file, apply environment overrides, validate
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::load_from_file(path)?;
        config.merge_with_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file; missing file yields defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            SealdexError::configuration(format!("Failed to read config file: {e}"))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| SealdexError::configuration(format!("Invalid TOML: {e}"))),
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| SealdexError::configuration(format!("Invalid JSON: {e}"))),
            _ => Err(SealdexError::configuration("Unsupported file format")),
        }
    }

    /// Apply `SEALDEX_*` overrides from the process environment
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply `SEALDEX_*` overrides from an explicit variable list
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref();
            match name {
                "THRESHOLD" => self.index.threshold = parse_var(name, value)?,
                "OUTPUT_DIR" => self.index.output_dir = PathBuf::from(value),
                "WRITE_CONCURRENCY" => self.index.write_concurrency = parse_var(name, value)?,
                "WORKER_THREADS" => self.index.worker_threads = parse_var(name, value)?,
                "KEY_BYTES" => self.index.key_bytes = parse_var(name, value)?,
                "DATA_USERS" => self.sharing.data_users = parse_var(name, value)?,
                "PRIME_HEX" => self.sharing.prime_hex = value.to_string(),
                "STORE_ADDR" => self.service.store_addr = value.to_string(),
                "REQUEST_TIMEOUT_MS" => self.service.request_timeout_ms = parse_var(name, value)?,
                "IDLE_TIMEOUT_MS" => self.service.idle_timeout_ms = parse_var(name, value)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.index.key_bytes, 16 | 32) {
            return Err(SealdexError::configuration(format!(
                "key_bytes must be 16 or 32 (got {})",
                self.index.key_bytes
            )));
        }
        if self.index.write_concurrency == 0 {
            return Err(SealdexError::configuration(
                "write_concurrency cannot be 0",
            ));
        }
        if self.sharing.data_users == 0 {
            return Err(SealdexError::configuration(
                "data_users must be at least 1",
            ));
        }
        if self.service.request_timeout_ms == 0 {
            return Err(SealdexError::configuration(
                "request_timeout_ms cannot be 0",
            ));
        }
        if self.service.idle_timeout_ms == 0 {
            return Err(SealdexError::configuration("idle_timeout_ms cannot be 0"));
        }
        if self.service.store_addr.is_empty() {
            return Err(SealdexError::configuration("store_addr cannot be empty"));
        }
        let prime = self.sharing.prime_hex.trim_start_matches('0');
        if prime.is_empty() || hex::decode(pad_even(prime)).is_err() {
            return Err(SealdexError::configuration(
                "prime_hex must be a non-zero hex number",
            ));
        }
        // Secrets are keys of key_bytes; the prime needs at least one more bit.
        if prime.len() * 4 <= self.index.key_bytes * 8 {
            return Err(SealdexError::configuration(format!(
                "prime must exceed {} bits to hold {}-byte keys",
                self.index.key_bytes * 8,
                self.index.key_bytes
            )));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| SealdexError::configuration(format!("Invalid value in {ENV_PREFIX}{name}")))
}

fn pad_even(hex: &str) -> String {
    if hex.len() % 2 == 1 {
        format!("0{hex}")
    } else {
        hex.to_string()
    }
}
