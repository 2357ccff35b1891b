//! Buildings and their worker rosters.
//!
//! Commercial and Industrial buildings share the [`Employer`] contract: a
//! capacity-bounded [`Roster`] of agent ids. The operations that need the
//! rest of the city (hiring from residentials, pulling products from
//! industry) live on [`Economy`](crate::economy::Economy); this module only
//! holds state and the local invariants.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::agent::Gopher;
use crate::fixed::Fixed64;
use crate::id::AgentId;

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// An ordered, capacity-bounded list of workers. `len() <= capacity()` holds
/// at all times: [`push`](Roster::push) refuses when full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    capacity: usize,
    workers: Vec<AgentId>,
}

impl Roster {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            workers: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.workers.len() >= self.capacity
    }

    pub fn has_vacancy(&self) -> bool {
        !self.is_full()
    }

    pub fn workers(&self) -> &[AgentId] {
        &self.workers
    }

    pub fn contains(&self, agent: AgentId) -> bool {
        self.workers.contains(&agent)
    }

    /// Append a worker. Returns `false` and leaves the roster untouched when
    /// it is already full.
    pub fn push(&mut self, agent: AgentId) -> bool {
        if self.is_full() {
            return false;
        }
        self.workers.push(agent);
        true
    }

    /// Remove a worker by identity, keeping the order of the others.
    /// Returns `false` if the agent was not on the roster.
    pub fn remove(&mut self, agent: AgentId) -> bool {
        match self.workers.iter().position(|&w| w == agent) {
            Some(idx) => {
                self.workers.remove(idx);
                true
            }
            None => false,
        }
    }

    /// First worker that has not worked today.
    pub fn first_idle(&self, agents: &SlotMap<AgentId, Gopher>) -> Option<AgentId> {
        self.workers
            .iter()
            .copied()
            .find(|&id| agents.get(id).is_some_and(Gopher::is_idle))
    }
}

/// Shared contract of buildings that employ workers.
pub trait Employer {
    fn roster(&self) -> &Roster;
    fn roster_mut(&mut self) -> &mut Roster;

    fn capacity(&self) -> usize {
        self.roster().capacity()
    }

    fn worker_count(&self) -> usize {
        self.roster().len()
    }
}

// ---------------------------------------------------------------------------
// Residential
// ---------------------------------------------------------------------------

/// Housing. Membership is fixed at construction; residents are only ever
/// borrowed into job rosters, never moved out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Residential {
    capacity: usize,
    residents: Vec<AgentId>,
}

impl Residential {
    /// Residents beyond `capacity` are dropped.
    pub fn new(capacity: usize, mut residents: Vec<AgentId>) -> Self {
        residents.truncate(capacity);
        Self {
            capacity,
            residents,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn residents(&self) -> &[AgentId] {
        &self.residents
    }

    /// Pick a resident who can take a shift today.
    ///
    /// Unemployed idle residents come first; failing that, an employed but
    /// idle resident is offered for poaching.
    pub fn find_worker(&self, agents: &SlotMap<AgentId, Gopher>) -> Option<AgentId> {
        let idle = |id: &&AgentId| agents.get(**id).is_some_and(Gopher::is_idle);
        let employed = |id: &&AgentId| agents.get(**id).is_some_and(Gopher::is_employed);

        self.residents
            .iter()
            .filter(idle)
            .find(|id| !employed(id))
            .or_else(|| self.residents.iter().filter(idle).find(employed))
            .copied()
    }
}

// ---------------------------------------------------------------------------
// Commercial
// ---------------------------------------------------------------------------

/// Turns products into goods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commercial {
    roster: Roster,
    pub(crate) products: Fixed64,
    pub(crate) goods: Fixed64,
}

impl Commercial {
    pub fn new(capacity: usize) -> Self {
        Self {
            roster: Roster::new(capacity),
            products: Fixed64::ZERO,
            goods: Fixed64::ZERO,
        }
    }

    /// Products on hand, waiting to be turned into goods.
    pub fn products(&self) -> Fixed64 {
        self.products
    }

    /// Goods on hand, ready for shoppers.
    pub fn goods(&self) -> Fixed64 {
        self.goods
    }
}

impl Employer for Commercial {
    fn roster(&self) -> &Roster {
        &self.roster
    }

    fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }
}

// ---------------------------------------------------------------------------
// Industrial
// ---------------------------------------------------------------------------

/// Produces products from labor alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Industrial {
    roster: Roster,
    pub(crate) products: Fixed64,
}

impl Industrial {
    pub fn new(capacity: usize) -> Self {
        Self {
            roster: Roster::new(capacity),
            products: Fixed64::ZERO,
        }
    }

    pub fn products(&self) -> Fixed64 {
        self.products
    }
}

impl Employer for Industrial {
    fn roster(&self) -> &Roster {
        &self.roster
    }

    fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }
}
