//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::building::Employer;
use crate::config::EconomyConfig;
use crate::economy::Economy;
use crate::fixed::Fixed64;
use crate::id::AgentId;

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// ===========================================================================
// Population
// ===========================================================================

/// The twenty gophers of the reference town, in spawn order.
pub const GOPHER_NAMES: [&str; 20] = [
    "Klas", "Sture", "Verner", "Asbjörn", "Loke", "Vidar", "Markus", "Staffan", "Knut", "Stian",
    "Magnus", "Theodor", "Acke", "Stian", "Gunnar", "Halsten", "Noak", "Alvar", "Viktor",
    "Sigvard",
];

/// Spawn `n` gophers named `g0`, `g1`, ... without housing them.
pub fn gophers(economy: &mut Economy, n: usize) -> Vec<AgentId> {
    economy.spawn_many((0..n).map(|i| format!("g{i}")))
}

// ===========================================================================
// Towns
// ===========================================================================

/// A town of `n` gophers spread over residentials of `capacity`, plus the
/// given number of commercials and industrials of the same capacity.
///
/// Residentials are filled in spawn order; the last one may be partial.
/// Gophers that do not fit in `residentials` buildings stay homeless.
pub fn town(
    n: usize,
    residentials: usize,
    commercials: usize,
    industrials: usize,
    capacity: usize,
) -> Economy {
    town_with(EconomyConfig::default(), n, residentials, commercials, industrials, capacity)
}

pub fn town_with(
    config: EconomyConfig,
    n: usize,
    residentials: usize,
    commercials: usize,
    industrials: usize,
    capacity: usize,
) -> Economy {
    let mut eco = Economy::new(config);
    let ids = gophers(&mut eco, n);
    let mut chunks = ids.chunks(capacity.max(1));
    for _ in 0..residentials {
        let residents = chunks.next().map(<[AgentId]>::to_vec).unwrap_or_default();
        eco.add_residential(capacity, residents)
            .expect("fresh gophers are unhoused");
    }
    for _ in 0..commercials {
        eco.add_commercial(capacity);
    }
    for _ in 0..industrials {
        eco.add_industrial(capacity);
    }
    eco
}

/// The reference town: 20 named gophers, 5 residentials, 3 commercials and
/// 2 industrials, all of capacity 4.
pub fn gopher_town() -> Economy {
    let mut eco = Economy::default();
    let ids = eco.spawn_many(GOPHER_NAMES);
    for chunk in ids.chunks(4) {
        eco.add_residential(4, chunk.to_vec())
            .expect("fresh gophers are unhoused");
    }
    for _ in 0..3 {
        eco.add_commercial(4);
    }
    for _ in 0..2 {
        eco.add_industrial(4);
    }
    eco
}

// ===========================================================================
// Invariants
// ===========================================================================

/// Panic if any structural invariant of `economy` is broken:
/// roster bounds, non-negative stock, happiness range, single roster per
/// agent, and `job` agreeing with roster membership.
pub fn assert_invariants(economy: &Economy) {
    let registry = economy.registry();

    for c in registry.commercials() {
        assert!(c.worker_count() <= c.capacity(), "commercial over capacity");
        assert!(c.products() >= Fixed64::ZERO, "negative commercial products");
        assert!(c.goods() >= Fixed64::ZERO, "negative goods");
    }
    for i in registry.industrials() {
        assert!(i.worker_count() <= i.capacity(), "industrial over capacity");
        assert!(i.products() >= Fixed64::ZERO, "negative industrial products");
    }

    for (id, g) in economy.agents() {
        assert!(
            g.happiness() >= Fixed64::ZERO && g.happiness() <= Fixed64::ONE,
            "happiness out of range for {}",
            g.name
        );

        let rosters: Vec<_> = registry
            .workplaces()
            .filter(|&w| registry.roster(w).is_some_and(|r| r.contains(id)))
            .collect();
        assert!(rosters.len() <= 1, "{} is on {} rosters", g.name, rosters.len());
        assert_eq!(rosters.first().copied(), g.job(), "{} job disagrees with rosters", g.name);
    }
}
