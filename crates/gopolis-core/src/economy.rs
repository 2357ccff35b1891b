//! The production chain and labor market.
//!
//! ```text
//!   Residential ──gophers──▶ Industrial ──products──▶ Commercial ──goods──▶ Gopher
//! ```
//!
//! [`Economy`] owns the population arena and the [`Registry`]. All matching
//! goes through it, since hiring into one building may mean poaching from
//! another and producing goods may mean pulling products from industry.
//!
//! Every operation here reports success with a `bool`. A `false` is never
//! fatal: the next day's phases simply try again.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::agent::Gopher;
use crate::building::{Commercial, Employer, Industrial, Residential};
use crate::config::{EconomyConfig, ShortfallPolicy};
use crate::fixed::Fixed64;
use crate::id::{AgentId, CommercialId, IndustrialId, ResidentialId, Workplace};
use crate::registry::Registry;

/// Errors from setting up a city. The running economy never errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EconomyError {
    #[error("unknown agent {0:?}")]
    UnknownAgent(AgentId),

    #[error("agent {agent:?} already lives in residential {home:?}")]
    AlreadyHoused { agent: AgentId, home: ResidentialId },

    #[error("agent {agent:?} is already employed at {job:?}")]
    AlreadyEmployed { agent: AgentId, job: Workplace },

    #[error("unknown workplace {0:?}")]
    UnknownWorkplace(Workplace),

    #[error("workplace {0:?} has no vacancy")]
    RosterFull(Workplace),
}

/// The city's economy: population, buildings and the rules between them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Economy {
    pub(crate) config: EconomyConfig,
    pub(crate) registry: Registry,
    pub(crate) agents: SlotMap<AgentId, Gopher>,
}

impl Default for Economy {
    fn default() -> Self {
        Self::new(EconomyConfig::default())
    }
}

impl Economy {
    pub fn new(config: EconomyConfig) -> Self {
        Self {
            config,
            registry: Registry::new(),
            agents: SlotMap::with_key(),
        }
    }

    // -----------------------------------------------------------------------
    // Setup
    // -----------------------------------------------------------------------

    /// Add a gopher to the population. It has no home until a residential
    /// claims it.
    pub fn spawn(&mut self, name: impl Into<String>) -> AgentId {
        self.agents.insert(Gopher::new(name))
    }

    pub fn spawn_many<I, S>(&mut self, names: I) -> Vec<AgentId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().map(|n| self.spawn(n)).collect()
    }

    /// Register a residential housing `residents`. Residents past
    /// `capacity` are left homeless and are not checked.
    pub fn add_residential(
        &mut self,
        capacity: usize,
        residents: Vec<AgentId>,
    ) -> Result<ResidentialId, EconomyError> {
        for &agent in residents.iter().take(capacity) {
            let gopher = self
                .agents
                .get(agent)
                .ok_or(EconomyError::UnknownAgent(agent))?;
            if let Some(home) = gopher.home {
                return Err(EconomyError::AlreadyHoused { agent, home });
            }
        }

        let building = Residential::new(capacity, residents);
        let next = ResidentialId(self.registry.residentials().len() as u32);
        for &agent in building.residents() {
            self.agents[agent].home = Some(next);
        }
        let ids = self.registry.add_residentials([building]);
        Ok(ids[0])
    }

    pub fn add_commercial(&mut self, capacity: usize) -> CommercialId {
        self.registry.add_commercials([Commercial::new(capacity)])[0]
    }

    pub fn add_industrial(&mut self, capacity: usize) -> IndustrialId {
        self.registry.add_industrials([Industrial::new(capacity)])[0]
    }

    /// Put an unemployed gopher on a roster without working a shift.
    pub fn seed_worker(&mut self, workplace: Workplace, agent: AgentId) -> Result<(), EconomyError> {
        let gopher = self
            .agents
            .get(agent)
            .ok_or(EconomyError::UnknownAgent(agent))?;
        if let Some(job) = gopher.job {
            return Err(EconomyError::AlreadyEmployed { agent, job });
        }
        let roster = self
            .registry
            .roster_mut(workplace)
            .ok_or(EconomyError::UnknownWorkplace(workplace))?;
        if !roster.push(agent) {
            return Err(EconomyError::RosterFull(workplace));
        }
        self.agents[agent].job = Some(workplace);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn agents(&self) -> &SlotMap<AgentId, Gopher> {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Gopher> {
        self.agents.get(id)
    }

    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.agents.keys().collect()
    }

    // -----------------------------------------------------------------------
    // Labor
    // -----------------------------------------------------------------------

    /// Move `agent` onto `workplace`'s roster, detaching it from its
    /// previous job first. Refused when the roster is full.
    fn hire(&mut self, workplace: Workplace, agent: AgentId) -> bool {
        match self.registry.roster(workplace) {
            Some(roster) if roster.has_vacancy() => {}
            Some(_) => {
                debug!(?workplace, "no more capacity");
                return false;
            }
            None => return false,
        }
        let Some(previous) = self.agents.get(agent).map(|g| g.job) else {
            return false;
        };

        if let Some(old) = previous {
            if let Some(roster) = self.registry.roster_mut(old) {
                roster.remove(agent);
            }
            if old != workplace {
                trace!(?agent, from = ?old, to = ?workplace, "worker changes job");
            }
        }
        if let Some(roster) = self.registry.roster_mut(workplace) {
            roster.push(agent);
        }
        self.agents[agent].job = Some(workplace);
        true
    }

    /// Remove `agent` from `workplace`'s roster. No-op if it is not there.
    pub fn remove_worker(&mut self, workplace: Workplace, agent: AgentId) {
        let removed = self
            .registry
            .roster_mut(workplace)
            .is_some_and(|r| r.remove(agent));
        if !removed {
            return;
        }
        if let Some(g) = self.agents.get_mut(agent).filter(|g| g.job == Some(workplace)) {
            g.job = None;
        }
    }

    /// Hire `agent` for today's shift and produce one step.
    ///
    /// Returns `false` when the roster is full. For a commercial it also
    /// returns `false` when no products could be sourced; the agent then
    /// stays hired and counts as having worked.
    pub fn do_work(&mut self, workplace: Workplace, agent: AgentId) -> bool {
        if !self.hire(workplace, agent) {
            return false;
        }
        // Marked before producing, so a nested hire cannot poach this
        // worker mid-shift.
        self.agents[agent].work_done();
        self.produce(workplace)
    }

    /// An agent who can work a shift here now: an idle worker already on the
    /// roster, or a resident hired into a vacancy.
    fn obtain_worker(&mut self, workplace: Workplace) -> Option<AgentId> {
        let roster = self.registry.roster(workplace)?;
        if let Some(agent) = roster.first_idle(&self.agents) {
            return Some(agent);
        }

        debug!(?workplace, "all workers are busy");
        if roster.is_full() {
            debug!(?workplace, "no more capacity");
            return None;
        }

        debug!(?workplace, "hire new gopher from residentials");
        let candidate = self
            .registry
            .residentials()
            .iter()
            .find_map(|r| r.find_worker(&self.agents));
        let Some(agent) = candidate else {
            debug!(?workplace, "no worker available");
            return None;
        };
        if self.agents[agent].is_employed() {
            debug!(?workplace, ?agent, "poaching employee");
        }
        self.hire(workplace, agent).then_some(agent)
    }

    // -----------------------------------------------------------------------
    // Production
    // -----------------------------------------------------------------------

    /// Apply one production step at `workplace`.
    fn produce(&mut self, workplace: Workplace) -> bool {
        match workplace {
            Workplace::Industrial(id) => {
                let yield_ = self.config.products_per_worker;
                match self.registry.industrial_mut(id) {
                    Some(b) => {
                        b.products += yield_;
                        trace!(industrial = id.0, products = %b.products, "produce products");
                        true
                    }
                    None => false,
                }
            }
            Workplace::Commercial(id) => self.produce_goods(id),
        }
    }

    /// One commercial shift: source products if short, then turn them into
    /// goods.
    fn produce_goods(&mut self, id: CommercialId) -> bool {
        let needed = self.config.products_per_commercial_shift();
        let Some(stock) = self.registry.commercial(id).map(Commercial::products) else {
            return false;
        };

        if stock < needed {
            debug!(commercial = id.0, "get products from industrials");
            let sourced = self
                .registry
                .industrial_ids()
                .any(|i| self.withdraw(Workplace::Industrial(i), needed));
            if !sourced {
                debug!(commercial = id.0, "no products available");
                return false;
            }
            if let Some(c) = self.registry.commercial_mut(id) {
                c.products += needed;
            }
        } else {
            trace!(commercial = id.0, "products in stock");
        }

        let goods_yield = self.config.goods_per_worker;
        match self.registry.commercial_mut(id) {
            Some(c) => {
                c.products -= needed;
                c.goods += goods_yield;
                trace!(commercial = id.0, goods = %c.goods, "produce goods");
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Withdrawals
    // -----------------------------------------------------------------------

    /// Take `amount` goods from a commercial, producing more first if needed.
    pub fn get_goods(&mut self, id: CommercialId, amount: Fixed64) -> bool {
        self.settle_shortfall(|eco| eco.withdraw(Workplace::Commercial(id), amount))
    }

    /// Take `amount` products from an industrial, producing more first if needed.
    pub fn get_products(&mut self, id: IndustrialId, amount: Fixed64) -> bool {
        self.settle_shortfall(|eco| eco.withdraw(Workplace::Industrial(id), amount))
    }

    /// Runs a top-level withdrawal under the configured [`ShortfallPolicy`].
    ///
    /// This is the single place that decides what a failed withdrawal leaves
    /// behind. Nested pulls made while producing goods are part of the
    /// enclosing call and are not checkpointed on their own.
    fn settle_shortfall(&mut self, withdraw: impl FnOnce(&mut Self) -> bool) -> bool {
        match self.config.shortfall {
            ShortfallPolicy::KeepPartial => withdraw(self),
            ShortfallPolicy::Rollback => {
                let registry = self.registry.clone();
                let agents = self.agents.clone();
                let ok = withdraw(self);
                if !ok {
                    debug!("withdrawal failed, rolling back partial production");
                    self.registry = registry;
                    self.agents = agents;
                }
                ok
            }
        }
    }

    fn stock(&self, workplace: Workplace) -> Option<Fixed64> {
        match workplace {
            Workplace::Commercial(id) => self.registry.commercial(id).map(Commercial::goods),
            Workplace::Industrial(id) => self.registry.industrial(id).map(Industrial::products),
        }
    }

    fn take_stock(&mut self, workplace: Workplace, amount: Fixed64) {
        match workplace {
            Workplace::Commercial(id) => {
                if let Some(c) = self.registry.commercial_mut(id) {
                    c.goods -= amount;
                }
            }
            Workplace::Industrial(id) => {
                if let Some(i) = self.registry.industrial_mut(id) {
                    i.products -= amount;
                }
            }
        }
    }

    /// Withdrawal loop shared by both building kinds. Stock produced before a
    /// failure stays where it is; [`settle_shortfall`](Self::settle_shortfall)
    /// decides whether to keep it.
    fn withdraw(&mut self, workplace: Workplace, amount: Fixed64) -> bool {
        let Some(mut stock) = self.stock(workplace) else {
            return false;
        };
        if stock >= amount {
            trace!(?workplace, "in stock");
        } else {
            debug!(?workplace, "not enough in stock");
        }

        while stock < amount {
            let Some(worker) = self.obtain_worker(workplace) else {
                return false;
            };
            self.agents[worker].work_done();
            if !self.produce(workplace) {
                return false;
            }
            stock = self.stock(workplace).unwrap_or(Fixed64::ZERO);
        }

        debug!(?workplace, amount = %amount, "hand over");
        self.take_stock(workplace, amount);
        true
    }
}

// ===========================================================================
// Tests
// ===========================================================================
