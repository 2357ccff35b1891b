//! Typed configuration for the economy and the tick driver.
//!
//! Defaults reproduce the reference economy:
//!
//! ```text
//! 1 gopher  > -0.4 goods
//! 1 good    > -1.5 gopher-days, -0.5 products
//! 1 product > -2 gopher-days
//! ```

use serde::{Deserialize, Serialize};

use crate::fixed::Fixed64;

/// Errors raised by [`EconomyConfig::validate`] and [`SimulationConfig::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A yield or demand must be strictly positive.
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    /// The tick interval must be at least one millisecond.
    #[error("tick interval must be at least 1 ms")]
    ZeroTickInterval,
}

/// What happens to stock produced during a withdrawal that ends up failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortfallPolicy {
    /// Keep whatever was produced before the request failed.
    #[default]
    KeepPartial,
    /// Restore stocks, rosters and agent flags to their state before the call.
    Rollback,
}

/// Economic constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Goods one gopher takes home per shopping trip.
    pub goods_per_shopper: Fixed64,
    /// Goods produced by one commercial worker-day.
    pub goods_per_worker: Fixed64,
    /// Products consumed per unit of goods produced.
    pub products_per_good: Fixed64,
    /// Products produced by one industrial worker-day.
    pub products_per_worker: Fixed64,
    pub shortfall: ShortfallPolicy,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            goods_per_shopper: Fixed64::from_num(0.4),
            goods_per_worker: Fixed64::from_num(1.0 / 1.5),
            products_per_good: Fixed64::from_num(0.5),
            products_per_worker: Fixed64::from_num(0.5),
            shortfall: ShortfallPolicy::KeepPartial,
        }
    }
}

impl EconomyConfig {
    /// Products one commercial worker-day consumes.
    pub fn products_per_commercial_shift(&self) -> Fixed64 {
        self.goods_per_worker * self.products_per_good
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("goods_per_shopper", self.goods_per_shopper),
            ("goods_per_worker", self.goods_per_worker),
            ("products_per_good", self.products_per_good),
            ("products_per_worker", self.products_per_worker),
        ];
        for (field, value) in fields {
            if value <= Fixed64::ZERO {
                return Err(ConfigError::NonPositive {
                    field,
                    value: value.to_num(),
                });
            }
        }
        Ok(())
    }
}

/// Settings for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the day-order shuffle.
    pub seed: u64,
    /// Days to simulate in headless runs.
    pub days: u32,
    /// Real-time interval between tick messages in the event loop.
    pub tick_interval_ms: u64,
    pub economy: EconomyConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            days: 10,
            tick_interval_ms: 1000 / 70,
            economy: EconomyConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        self.economy.validate()
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }
}
