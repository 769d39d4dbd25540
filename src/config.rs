//! Centralized configuration and builder for the entry store.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - StoreConfig::from_env() reads the ES_* variables; builder overrides win.
//! - Store::open_with_config() consumes the result and validates geometry.
//!
//! Defaults:
//! - block_size = 512 (canonical block size; must be a power of two)
//! - sync_on_close = false (the scratch file never outlives one run)
//! - remove_on_close = false
//! - max_list_count = 1_000_000 (decode guard for list counts)

use std::fmt;

use anyhow::{anyhow, Result};

use crate::consts::{BLOCK_POINTER_SIZE, BLOCK_SIZE, MAX_LIST_COUNT};

/// Top-level configuration for a scratch-file Store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Block size in bytes (power of two, at least twice the pointer size).
    /// Env: ES_BLOCK_SIZE (default 512)
    pub block_size: u64,

    /// fsync the scratch file in close().
    /// Env: ES_SYNC_ON_CLOSE (default false; "1|true|on|yes" => true)
    pub sync_on_close: bool,

    /// Delete the scratch file in close().
    /// Env: ES_REMOVE_ON_CLOSE (default false)
    pub remove_on_close: bool,

    /// Decoded list counts at or above this value are treated as corruption.
    /// Env: ES_MAX_LIST_COUNT (default 1_000_000)
    pub max_list_count: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            block_size: BLOCK_SIZE,
            sync_on_close: false,
            remove_on_close: false,
            max_list_count: MAX_LIST_COUNT,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().map(|v| {
        let s = v.trim().to_ascii_lowercase();
        s == "1" || s == "true" || s == "on" || s == "yes"
    })
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("ES_BLOCK_SIZE") {
            if let Ok(n) = v.trim().parse::<u64>() {
                cfg.block_size = n;
            }
        }

        if let Some(on) = env_flag("ES_SYNC_ON_CLOSE") {
            cfg.sync_on_close = on;
        }

        if let Some(on) = env_flag("ES_REMOVE_ON_CLOSE") {
            cfg.remove_on_close = on;
        }

        if let Ok(v) = std::env::var("ES_MAX_LIST_COUNT") {
            if let Ok(n) = v.trim().parse::<u32>() {
                cfg.max_list_count = n;
            }
        }

        cfg
    }

    pub fn with_block_size(mut self, bytes: u64) -> Self {
        self.block_size = bytes;
        self
    }

    pub fn with_sync_on_close(mut self, on: bool) -> Self {
        self.sync_on_close = on;
        self
    }

    pub fn with_remove_on_close(mut self, on: bool) -> Self {
        self.remove_on_close = on;
        self
    }

    pub fn with_max_list_count(mut self, n: u32) -> Self {
        self.max_list_count = n;
        self
    }

    /// Check block geometry: power of two, room for the pointer plus payload.
    pub fn validate(&self) -> Result<()> {
        let bs = self.block_size;
        if !bs.is_power_of_two() {
            return Err(anyhow!("block_size {} is not a power of two", bs));
        }
        if bs < 2 * BLOCK_POINTER_SIZE {
            return Err(anyhow!(
                "block_size {} too small (min {})",
                bs,
                2 * BLOCK_POINTER_SIZE
            ));
        }
        if self.max_list_count == 0 {
            return Err(anyhow!("max_list_count must be > 0"));
        }
        Ok(())
    }

    /// Payload bytes per block (block_size minus the next-block pointer).
    #[inline]
    pub fn payload_per_block(&self) -> u64 {
        self.block_size - BLOCK_POINTER_SIZE
    }
}

impl fmt::Display for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StoreConfig {{ block_size: {}, sync_on_close: {}, remove_on_close: {}, max_list_count: {} }}",
            self.block_size, self.sync_on_close, self.remove_on_close, self.max_list_count,
        )
    }
}

/// Lightweight builder that produces a StoreConfig.
#[derive(Clone, Debug)]
pub struct StoreBuilder {
    cfg: StoreConfig,
}

impl Default for StoreBuilder {
    fn default() -> Self {
        // Start from env, then allow overrides.
        Self {
            cfg: StoreConfig::from_env(),
        }
    }
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a clean default (without reading env).
    pub fn from_default() -> Self {
        Self {
            cfg: StoreConfig::default(),
        }
    }

    pub fn block_size(mut self, bytes: u64) -> Self {
        self.cfg.block_size = bytes;
        self
    }

    pub fn sync_on_close(mut self, on: bool) -> Self {
        self.cfg.sync_on_close = on;
        self
    }

    pub fn remove_on_close(mut self, on: bool) -> Self {
        self.cfg.remove_on_close = on;
        self
    }

    pub fn max_list_count(mut self, n: u32) -> Self {
        self.cfg.max_list_count = n;
        self
    }

    /// Finish the builder and obtain the configuration.
    pub fn build(self) -> StoreConfig {
        self.cfg
    }
}
