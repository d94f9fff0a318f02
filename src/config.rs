// src/config.rs

//! Construction-time settings for a curve.
//!
//! Settings can be built programmatically, parsed from JSON, and then
//! overridden from `PCVCURVE_*` environment variables. Validation goes
//! through the same checks the governor setters use.

use serde::{Deserialize, Serialize};

use crate::curve::CurveConfig;
use crate::error::{CurveError, Result};
use crate::splitter::check_allocation;
use crate::types::{amount_str, Address, Amount};

fn default_mint_cap() -> Amount {
    Amount::MAX
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveSettings {
    /// Custody account holding reserve accumulated by purchases.
    pub address: Address,
    /// Role registry consulted for governor/guardian checks.
    pub core: Address,
    pub oracle: Address,
    #[serde(with = "amount_str")]
    pub scale: Amount,
    pub discount_bps: u16,
    pub buffer_bps: u16,
    #[serde(with = "amount_str", default = "default_mint_cap")]
    pub mint_cap: Amount,
    pub destinations: Vec<Address>,
    pub weights: Vec<u16>,
    #[serde(with = "amount_str", default)]
    pub incentive_amount: Amount,
    /// Seconds between paid keeper incentives.
    #[serde(default)]
    pub incentive_duration: u64,
}

impl CurveSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| CurveError::InvalidConfig(format!("malformed settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Applies `PCVCURVE_*` overrides on top of these settings:
    /// - `PCVCURVE_SCALE`
    /// - `PCVCURVE_DISCOUNT_BPS`
    /// - `PCVCURVE_BUFFER_BPS`
    /// - `PCVCURVE_MINT_CAP`
    /// - `PCVCURVE_INCENTIVE_AMOUNT`
    /// - `PCVCURVE_INCENTIVE_DURATION`
    pub fn from_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var(&lookup, "PCVCURVE_SCALE")? {
            self.scale = v;
        }
        if let Some(v) = parse_var(&lookup, "PCVCURVE_DISCOUNT_BPS")? {
            self.discount_bps = v;
        }
        if let Some(v) = parse_var(&lookup, "PCVCURVE_BUFFER_BPS")? {
            self.buffer_bps = v;
        }
        if let Some(v) = parse_var(&lookup, "PCVCURVE_MINT_CAP")? {
            self.mint_cap = v;
        }
        if let Some(v) = parse_var(&lookup, "PCVCURVE_INCENTIVE_AMOUNT")? {
            self.incentive_amount = v;
        }
        if let Some(v) = parse_var(&lookup, "PCVCURVE_INCENTIVE_DURATION")? {
            self.incentive_duration = v;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn curve_config(&self) -> CurveConfig {
        CurveConfig {
            scale: self.scale,
            discount_bps: self.discount_bps,
            buffer_bps: self.buffer_bps,
            mint_cap: self.mint_cap,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.curve_config().validate()?;
        check_allocation(&self.destinations, &self.weights)?;
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| CurveError::InvalidConfig(format!("Invalid {}: {}", key, e))),
    }
}
