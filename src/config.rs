//! Pool configuration

use crate::errors::{PoolError, PoolResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default pool values used at session start and on reset
pub mod defaults {
    pub const TOKEN1_SYMBOL: &str = "ETH";
    pub const TOKEN2_SYMBOL: &str = "SILK";
    pub const TOKEN1_RESERVE: f64 = 3.8;
    pub const TOKEN2_RESERVE: f64 = 10_000_000.0;
    /// USD reference price of token1
    pub const TOKEN1_PRICE: f64 = 2700.0;
    pub const TOKEN2_TOTAL_SUPPLY: f64 = 1_000_000_000.0;
}

/// User-editable pool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Base asset symbol (e.g. ETH)
    pub token1_symbol: String,
    /// Pooled token symbol
    pub token2_symbol: String,
    /// Initial reserve of token1
    pub token1_reserve: f64,
    /// Initial reserve of token2
    pub token2_reserve: f64,
    /// External USD price of one token1
    pub token1_price: f64,
    /// Ceiling on the token2 amount that can ever sit in the pool
    pub token2_total_supply: f64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            token1_symbol: defaults::TOKEN1_SYMBOL.to_string(),
            token2_symbol: defaults::TOKEN2_SYMBOL.to_string(),
            token1_reserve: defaults::TOKEN1_RESERVE,
            token2_reserve: defaults::TOKEN2_RESERVE,
            token1_price: defaults::TOKEN1_PRICE,
            token2_total_supply: defaults::TOKEN2_TOTAL_SUPPLY,
        }
    }
}

impl PoolConfig {
    /// Small pool for exercising supply and drain limits
    pub fn small() -> Self {
        Self {
            token1_reserve: 10.0,
            token2_reserve: 100.0,
            token2_total_supply: 1000.0,
            ..Default::default()
        }
    }

    /// Load a config from a JSON file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read pool config {}", path.display()))?;

        let config: PoolConfig = serde_json::from_str(&contents)
            .context("Failed to parse pool config")?;

        config.validate()?;
        Ok(config)
    }

    /// Check that the config describes a usable pool
    pub fn validate(&self) -> PoolResult<()> {
        if self.token1_symbol.trim().is_empty() || self.token2_symbol.trim().is_empty() {
            return Err(PoolError::InvalidConfig("token symbols must not be empty".into()));
        }

        let fields = [
            ("token1_reserve", self.token1_reserve),
            ("token2_reserve", self.token2_reserve),
            ("token1_price", self.token1_price),
            ("token2_total_supply", self.token2_total_supply),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(PoolError::InvalidConfig(format!(
                    "{} must be a finite positive number, got {}",
                    name, value
                )));
            }
        }

        if self.token2_reserve > self.token2_total_supply {
            return Err(PoolError::InvalidConfig(format!(
                "Reserve cannot exceed total supply of {}",
                self.token2_total_supply
            )));
        }

        Ok(())
    }
}
