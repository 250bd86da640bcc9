//! # Engine Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     HAKO_TAX_RATE=8                                                     │
//! │     HAKO_BOX60_LIMIT_G / HAKO_BOX80_LIMIT_G / HAKO_BOX100_LIMIT_G       │
//! │                                                                         │
//! │  2. TOML Config File (--config hako.toml)                               │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     10% tax, 2 / 5 / 10 kg box limits, no seller rate tables           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! tax_rate = 10
//!
//! [box_limits]
//! box60_grams = 2000
//! box80_grams = 5000
//! box100_grams = 10000
//!
//! [sellers.farm]
//! revision = 3
//! free_shipping_threshold = 10000
//!
//! [sellers.farm.box60]
//! cold_surcharge = 300
//!
//! [[sellers.farm.box60.rates]]
//! number = 1
//! name = "Kanto"
//! price = 800
//! regions = [8, 9, 10, 11, 12, 13, 14]
//! # ... rates must cover all 47 prefectures, for box80 and box100 too
//! ```
//!
//! A rate table that fails validation aborts loading. Nothing is repaired.

use std::collections::BTreeMap;
use std::path::Path;

use hako_core::{BasketPacker, BoxSizeLimits, ShippingRevision, TaxRate, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;

fn default_tax_rate() -> u32 {
    TaxRate::STANDARD.percent()
}

/// Everything the engine needs besides the request itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Consumption tax in percent.
    #[serde(default = "default_tax_rate")]
    pub tax_rate: u32,

    #[serde(default)]
    pub box_limits: BoxSizeLimits,

    /// Current shipping revision per seller ID.
    #[serde(default)]
    pub sellers: BTreeMap<String, ShippingRevision>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            tax_rate: default_tax_rate(),
            box_limits: BoxSizeLimits::default(),
            sellers: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file
    /// 3. Environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                info!(?path, "Loading engine config from file");
                let contents =
                    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                        path: path.to_path_buf(),
                        source,
                    })?;
                Self::from_toml_str(&contents)?
            }
            None => {
                debug!("No config file given, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        info!(
            tax_rate = config.tax_rate,
            sellers = config.sellers.len(),
            "Engine config loaded"
        );
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Checks the tax rate, the box limits and every seller's rate table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tax_rate > 100 {
            return Err(ValidationError::OutOfRange {
                field: "tax_rate".to_string(),
                min: 0,
                max: 100,
            }
            .into());
        }

        self.box_limits.validate()?;

        for (seller_id, revision) in &self.sellers {
            revision
                .validate()
                .map_err(|source| ConfigError::InvalidRates {
                    seller_id: seller_id.clone(),
                    source,
                })?;
        }

        Ok(())
    }

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_percent(self.tax_rate)
    }

    pub fn packer(&self) -> BasketPacker {
        BasketPacker::new(self.box_limits)
    }

    /// Applies `HAKO_*` overrides read through `lookup`.
    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(rate) = parse_var(&lookup, "HAKO_TAX_RATE")? {
            debug!(tax_rate = rate, "Overriding tax rate from environment");
            self.tax_rate = rate;
        }
        if let Some(grams) = parse_var(&lookup, "HAKO_BOX60_LIMIT_G")? {
            self.box_limits.box60_grams = grams;
        }
        if let Some(grams) = parse_var(&lookup, "HAKO_BOX80_LIMIT_G")? {
            self.box_limits.box80_grams = grams;
        }
        if let Some(grams) = parse_var(&lookup, "HAKO_BOX100_LIMIT_G")? {
            self.box_limits.box100_grams = grams;
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

// =============================================================================
// Unit Tests
// =============================================================================
