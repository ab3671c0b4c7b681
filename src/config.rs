//! Engine configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// Tunables of the settlement pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Balances within this distance of zero take part in no transfer.
    pub epsilon: Decimal,
    /// Largest acceptable absolute sum of a group's balances.
    pub zero_sum_tolerance: Decimal,
    /// Default `env_logger` filter for the binary.
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            epsilon: dec!(0.01),
            zero_sum_tolerance: dec!(0.000001),
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load from `SPLIT_*` environment variables, e.g. `SPLIT_EPSILON=0.005`.
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("SPLIT"))
            .build()?
            .try_deserialize()
    }
}
