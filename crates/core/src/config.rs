//! Guard configuration: the reward namespace and tier thresholds.
//!
//! Loaded from TOML; every field has a default so an empty document (or no
//! file at all) yields the stock configuration.

use crate::error::{CarefundError, CarefundResult};
use crate::types::Lovelace;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub reward: RewardConfig,
}

/// Reward tier thresholds in lovelace. Must satisfy
/// `0 < bronze < silver < gold < platinum`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Prepended to every reward asset name.
    pub prefix: String,
    pub bronze: Lovelace,
    pub silver: Lovelace,
    pub gold: Lovelace,
    pub platinum: Lovelace,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            prefix: "CareFund".to_string(),
            bronze: 10_000_000,
            silver: 50_000_000,
            gold: 100_000_000,
            platinum: 500_000_000,
        }
    }
}

impl GuardConfig {
    pub fn from_toml_str(s: &str) -> CarefundResult<Self> {
        let config: GuardConfig =
            toml::from_str(s).map_err(|e| CarefundError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CarefundResult<()> {
        let r = &self.reward;
        if r.prefix.is_empty() {
            return Err(CarefundError::Config("reward prefix must not be empty".into()));
        }
        if !(0 < r.bronze && r.bronze < r.silver && r.silver < r.gold && r.gold < r.platinum) {
            return Err(CarefundError::Config(format!(
                "reward tiers must be positive and strictly increasing, got {}/{}/{}/{}",
                r.bronze, r.silver, r.gold, r.platinum
            )));
        }
        Ok(())
    }
}
