//! Serde data file structs for scenario definitions.
//!
//! A scenario names its gophers once, in spawn order, and every building
//! refers to them by their index in that list. Names may repeat.
//! Economic values are plain decimals here and become `Fixed64` in the
//! loader.

use gopolis_core::config::{EconomyConfig, ShortfallPolicy, SimulationConfig};
use gopolis_core::fixed::fixed64_to_f64;
use serde::Deserialize;

// ===========================================================================
// Scenario
// ===========================================================================

/// A complete town: population, buildings, economy and run settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default)]
    pub economy: EconomyData,
    #[serde(default)]
    pub gophers: Vec<String>,
    #[serde(default)]
    pub residentials: Vec<ResidentialData>,
    #[serde(default)]
    pub commercials: Vec<WorkplaceData>,
    #[serde(default)]
    pub industrials: Vec<WorkplaceData>,
}

fn default_seed() -> u64 {
    SimulationConfig::default().seed
}

fn default_days() -> u32 {
    SimulationConfig::default().days
}

fn default_tick_interval_ms() -> u64 {
    SimulationConfig::default().tick_interval_ms
}

// ===========================================================================
// Economy
// ===========================================================================

/// Economic constants as written in a data file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EconomyData {
    pub goods_per_shopper: f64,
    pub goods_per_worker: f64,
    pub products_per_good: f64,
    pub products_per_worker: f64,
    pub shortfall: ShortfallPolicy,
}

impl Default for EconomyData {
    fn default() -> Self {
        let cfg = EconomyConfig::default();
        Self {
            goods_per_shopper: fixed64_to_f64(cfg.goods_per_shopper),
            goods_per_worker: fixed64_to_f64(cfg.goods_per_worker),
            products_per_good: fixed64_to_f64(cfg.products_per_good),
            products_per_worker: fixed64_to_f64(cfg.products_per_worker),
            shortfall: cfg.shortfall,
        }
    }
}

// ===========================================================================
// Buildings
// ===========================================================================

/// A residential and the gophers (by index) that live there.
#[derive(Debug, Clone, Deserialize)]
pub struct ResidentialData {
    pub capacity: usize,
    #[serde(default)]
    pub residents: Vec<usize>,
}

/// A commercial or industrial building, optionally staffed from the start.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkplaceData {
    pub capacity: usize,
    /// Gophers (by index) already on the roster when the run begins.
    #[serde(default)]
    pub workers: Vec<usize>,
}
