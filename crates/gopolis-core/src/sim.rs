//! Day state, per-day reports and state hashing.

use serde::{Deserialize, Serialize};
use slotmap::Key;

use crate::economy::Economy;
use crate::fixed::Fixed64;
use crate::id::{AgentId, Workplace};

// ---------------------------------------------------------------------------
// Day report
// ---------------------------------------------------------------------------

/// What happened during one call to
/// [`Simulation::step_day`](crate::driver::Simulation::step_day).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayReport {
    /// Day number just completed, starting at 1.
    pub day: u64,
    /// Gophers who got their goods.
    pub shopped: u32,
    /// Gophers who worked a shift, including shifts pulled in by shopping.
    pub worked: u32,
    /// Gophers on a roster at the end of the day.
    pub employed: u32,
    /// Mean happiness after sleeping. Zero for an empty town.
    pub mean_happiness: Fixed64,
    /// Hash of the state after the day.
    pub state_hash: u64,
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// A deterministic hash of simulation state for desync detection.
///
/// FNV-1a (64-bit). Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write(&[v as u8]);
    }

    pub fn write_fixed64(&mut self, v: Fixed64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    /// Length-prefixed, so `"ab" + "c"` and `"a" + "bc"` differ.
    pub fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write(s.as_bytes());
    }

    pub fn write_agent(&mut self, id: AgentId) {
        self.write_u64(id.data().as_ffi());
    }

    pub fn write_workplace(&mut self, w: Option<Workplace>) {
        match w {
            None => self.write_u32(0),
            Some(Workplace::Commercial(id)) => {
                self.write_u32(1);
                self.write_u32(id.0);
            }
            Some(Workplace::Industrial(id)) => {
                self.write_u32(2);
                self.write_u32(id.0);
            }
        }
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash agents, rosters and stocks of an economy, in arena and
/// registration order.
pub fn hash_economy(hasher: &mut StateHash, economy: &Economy) {
    for (id, g) in economy.agents() {
        hasher.write_agent(id);
        hasher.write_str(&g.name);
        hasher.write_bool(g.has_worked());
        hasher.write_bool(g.has_shopped());
        hasher.write_fixed64(g.happiness());
        hasher.write_workplace(g.job());
        hasher.write_u32(g.home().map_or(u32::MAX, |h| h.0));
    }

    let registry = economy.registry();
    for r in registry.residentials() {
        hasher.write_u64(r.residents().len() as u64);
        for &a in r.residents() {
            hasher.write_agent(a);
        }
    }
    for w in registry.workplaces() {
        if let Some(roster) = registry.roster(w) {
            hasher.write_workplace(Some(w));
            hasher.write_u64(roster.len() as u64);
            for &a in roster.workers() {
                hasher.write_agent(a);
            }
        }
    }
    for c in registry.commercials() {
        hasher.write_fixed64(c.products());
        hasher.write_fixed64(c.goods());
    }
    for i in registry.industrials() {
        hasher.write_fixed64(i.products());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_hash_deterministic() {
        let mut h1 = StateHash::new();
        h1.write_u64(42);
        h1.write_str("Klas");

        let mut h2 = StateHash::new();
        h2.write_u64(42);
        h2.write_str("Klas");

        assert_eq!(h1.finish(), h2.finish());
    }

    #[test]
    fn state_hash_order_matters() {
        let mut h1 = StateHash::new();
        h1.write_u32(1);
        h1.write_u32(2);

        let mut h2 = StateHash::new();
        h2.write_u32(2);
        h2.write_u32(1);

        assert_ne!(h1.finish(), h2.finish());
    }

    #[test]
    fn strings_are_length_prefixed() {
        let mut h1 = StateHash::new();
        h1.write_str("ab");
        h1.write_str("c");

        let mut h2 = StateHash::new();
        h2.write_str("a");
        h2.write_str("bc");

        assert_ne!(h1.finish(), h2.finish());
    }

    #[test]
    fn economy_hash_sees_stock_changes() {
        let mut eco = Economy::default();
        let ids = eco.spawn_many(["a"]);
        eco.add_residential(1, ids.clone()).unwrap();
        let i = eco.add_industrial(1);

        let mut before = StateHash::new();
        hash_economy(&mut before, &eco);

        assert!(eco.do_work(i.into(), ids[0]));
        let mut after = StateHash::new();
        hash_economy(&mut after, &eco);

        assert_ne!(before.finish(), after.finish());
    }
}
