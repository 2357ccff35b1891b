//! The tick driver: owns an [`Economy`] and advances it one day at a time.
//!
//! # Day pipeline
//!
//! Each [`Simulation::step_day`] runs:
//! 1. **Shuffle** -- re-shuffle the previous day's agent order with the
//!    seeded generator.
//! 2. **Shop** -- every agent tries each commercial in registration order
//!    for its goods; the first success counts.
//! 3. **Work** -- every agent that has not worked yet tries commercials,
//!    then industrials, in registration order; the first success counts.
//! 4. **Sleep** -- every agent settles its happiness and resets its flags.
//! 5. **Bookkeeping** -- bump the day counter, hash the state, log.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::economy::Economy;
use crate::fixed::Fixed64;
use crate::id::{AgentId, CommercialId, IndustrialId};
use crate::query::CitySnapshot;
use crate::rng::SimRng;
use crate::sim::{DayReport, StateHash, hash_economy};

/// A seeded, deterministic run of an economy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    pub(crate) economy: Economy,
    pub(crate) rng: SimRng,
    /// Agent order for the next day. Carried over, so shuffles accumulate.
    pub(crate) day_order: Vec<AgentId>,
    pub(crate) day: u64,
    pub(crate) last_state_hash: u64,
}

impl Simulation {
    /// Start a run over a fully set up economy. The initial agent order is
    /// spawn order.
    pub fn new(economy: Economy, seed: u64) -> Self {
        let day_order = economy.agent_ids();
        let mut sim = Self {
            economy,
            rng: SimRng::new(seed),
            day_order,
            day: 0,
            last_state_hash: 0,
        };
        sim.last_state_hash = sim.compute_state_hash();
        sim
    }

    /// Like [`new`](Self::new), taking the seed from a config. The economy
    /// keeps its own [`EconomyConfig`](crate::config::EconomyConfig).
    pub fn with_config(economy: Economy, config: &SimulationConfig) -> Self {
        Self::new(economy, config.seed)
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    /// Days completed so far.
    pub fn day(&self) -> u64 {
        self.day
    }

    /// The agent order used by the most recent day.
    pub fn day_order(&self) -> &[AgentId] {
        &self.day_order
    }

    /// Hash of the state after the most recent day (or at construction).
    pub fn state_hash(&self) -> u64 {
        self.last_state_hash
    }

    pub fn snapshot(&self) -> CitySnapshot {
        CitySnapshot::capture(&self.economy, &self.day_order, self.day)
    }

    // -----------------------------------------------------------------------
    // Advance
    // -----------------------------------------------------------------------

    /// Run one full day.
    pub fn step_day(&mut self) -> DayReport {
        self.phase_shuffle();
        self.phase_shop();
        self.phase_work();

        let (shopped, worked) = self.economy.agents.values().fold((0, 0), |(s, w), g| {
            (s + g.has_shopped() as u32, w + g.has_worked() as u32)
        });

        self.phase_sleep();
        self.phase_bookkeeping();

        let report = DayReport {
            day: self.day,
            shopped,
            worked,
            employed: self.economy.agents.values().filter(|g| g.is_employed()).count() as u32,
            mean_happiness: self.mean_happiness(),
            state_hash: self.last_state_hash,
        };
        info!(
            day = report.day,
            shopped = report.shopped,
            worked = report.worked,
            employed = report.employed,
            mean_happiness = %report.mean_happiness,
            "day complete"
        );
        report
    }

    /// Run `days` days, returning each day's report.
    pub fn run(&mut self, days: u32) -> Vec<DayReport> {
        (0..days).map(|_| self.step_day()).collect()
    }

    // -----------------------------------------------------------------------
    // Phases
    // -----------------------------------------------------------------------

    fn phase_shuffle(&mut self) {
        self.rng.shuffle(&mut self.day_order);
    }

    fn phase_shop(&mut self) {
        let amount = self.economy.config.goods_per_shopper;
        for &agent in &self.day_order {
            debug!(?agent, "goes shopping");
            for c in self.economy.registry.commercial_ids() {
                if self.economy.get_goods(c, amount) {
                    if let Some(g) = self.economy.agents.get_mut(agent) {
                        g.shop_done();
                    }
                    break;
                }
            }
        }
    }

    /// Commercials first, then industrials. A failed commercial shift still
    /// counts as worked, which keeps the agent out of industry for the day.
    fn phase_work(&mut self) {
        let commercials: Vec<CommercialId> = self.economy.registry.commercial_ids().collect();
        let industrials: Vec<IndustrialId> = self.economy.registry.industrial_ids().collect();
        for &agent in &self.day_order {
            if self.economy.agent(agent).is_none_or(|g| g.has_worked()) {
                continue;
            }
            debug!(?agent, "goes to work");
            for &c in &commercials {
                if self.economy.do_work(c.into(), agent) {
                    break;
                }
            }
            if self.economy.agent(agent).is_some_and(|g| g.has_worked()) {
                continue;
            }
            for &i in &industrials {
                if self.economy.do_work(i.into(), agent) {
                    break;
                }
            }
        }
    }

    fn phase_sleep(&mut self) {
        for g in self.economy.agents.values_mut() {
            g.sleep();
        }
    }

    fn phase_bookkeeping(&mut self) {
        self.day += 1;
        self.last_state_hash = self.compute_state_hash();
    }

    fn mean_happiness(&self) -> Fixed64 {
        let n = self.economy.agents.len();
        if n == 0 {
            return Fixed64::ZERO;
        }
        let total = self
            .economy
            .agents
            .values()
            .fold(Fixed64::ZERO, |acc, g| acc + g.happiness());
        total / Fixed64::from_num(n)
    }

    fn compute_state_hash(&self) -> u64 {
        let mut hasher = StateHash::new();
        hasher.write_u64(self.day);
        hasher.write_u64(self.rng.state());
        for &a in &self.day_order {
            hasher.write_agent(a);
        }
        hash_economy(&mut hasher, &self.economy);
        hasher.finish()
    }
}
