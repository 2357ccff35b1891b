//! Read-only query API for inspecting simulation state.
//!
//! Snapshot types aggregate economy state into views for rendering and
//! reporting. All types are owned copies -- no references into the economy.
//!
//! The `Display` impls produce the city's text summaries:
//!
//! ```text
//! {Klas 0.55, works in the industry}
//! {Sture 0.00, is unemployed}
//! Residentials {
//!     {R 4}
//! }
//! Commercials {
//!     {C 2 (0/0.2667)}
//! }
//! Industrials {
//!     {I 1 (0.1667)}
//! }
//! ```

use std::fmt;

use crate::building::Employer;
use crate::economy::Economy;
use crate::fixed::{Fixed64, fixed64_to_f64};
use crate::id::{AgentId, CommercialId, IndustrialId, ResidentialId, Workplace};

// ---------------------------------------------------------------------------
// Gopher snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct GopherSnapshot {
    pub id: AgentId,
    pub name: String,
    pub happiness: Fixed64,
    pub job: Option<Workplace>,
    pub home: Option<ResidentialId>,
}

impl fmt::Display for GopherSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{} {:.2}", self.name, fixed64_to_f64(self.happiness))?;
        match self.job {
            Some(Workplace::Commercial(_)) => f.write_str(", works in the commercial}"),
            Some(Workplace::Industrial(_)) => f.write_str(", works in the industry}"),
            None => f.write_str(", is unemployed}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Building snapshots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ResidentialSnapshot {
    pub id: ResidentialId,
    pub capacity: usize,
    pub residents: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommercialSnapshot {
    pub id: CommercialId,
    pub capacity: usize,
    pub workers: usize,
    pub products: Fixed64,
    pub goods: Fixed64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndustrialSnapshot {
    pub id: IndustrialId,
    pub capacity: usize,
    pub workers: usize,
    pub products: Fixed64,
}

impl fmt::Display for ResidentialSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{R {}}}", self.residents)
    }
}

impl fmt::Display for CommercialSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{C {} ({}/{})}}",
            self.workers,
            significant(self.products),
            significant(self.goods)
        )
    }
}

impl fmt::Display for IndustrialSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{I {} ({})}}", self.workers, significant(self.products))
    }
}

// ---------------------------------------------------------------------------
// City snapshot
// ---------------------------------------------------------------------------

/// Everything a renderer or report needs about the city at one point in
/// time. Gophers are listed in the day order.
#[derive(Debug, Clone, PartialEq)]
pub struct CitySnapshot {
    pub day: u64,
    pub gophers: Vec<GopherSnapshot>,
    pub residentials: Vec<ResidentialSnapshot>,
    pub commercials: Vec<CommercialSnapshot>,
    pub industrials: Vec<IndustrialSnapshot>,
}

impl CitySnapshot {
    /// Capture `economy`, listing gophers in `order`. Ids in `order` that are
    /// not in the economy are skipped.
    pub fn capture(economy: &Economy, order: &[AgentId], day: u64) -> Self {
        let gophers = order
            .iter()
            .filter_map(|&id| {
                economy.agent(id).map(|g| GopherSnapshot {
                    id,
                    name: g.name.clone(),
                    happiness: g.happiness(),
                    job: g.job(),
                    home: g.home(),
                })
            })
            .collect();

        let registry = economy.registry();
        let residentials = registry
            .residential_ids()
            .zip(registry.residentials())
            .map(|(id, r)| ResidentialSnapshot {
                id,
                capacity: r.capacity(),
                residents: r.residents().len(),
            })
            .collect();
        let commercials = registry
            .commercial_ids()
            .zip(registry.commercials())
            .map(|(id, c)| CommercialSnapshot {
                id,
                capacity: c.capacity(),
                workers: c.worker_count(),
                products: c.products(),
                goods: c.goods(),
            })
            .collect();
        let industrials = registry
            .industrial_ids()
            .zip(registry.industrials())
            .map(|(id, i)| IndustrialSnapshot {
                id,
                capacity: i.capacity(),
                workers: i.worker_count(),
                products: i.products(),
            })
            .collect();

        Self {
            day,
            gophers,
            residentials,
            commercials,
            industrials,
        }
    }

    pub fn employed(&self) -> usize {
        self.gophers.iter().filter(|g| g.job.is_some()).count()
    }

    pub fn total_goods(&self) -> Fixed64 {
        self.commercials
            .iter()
            .fold(Fixed64::ZERO, |acc, c| acc + c.goods)
    }

    pub fn total_products(&self) -> Fixed64 {
        let held_by_shops = self
            .commercials
            .iter()
            .fold(Fixed64::ZERO, |acc, c| acc + c.products);
        self.industrials
            .iter()
            .fold(held_by_shops, |acc, i| acc + i.products)
    }

    /// One `{name happiness, ...}` line per gopher.
    pub fn gophers_report(&self) -> String {
        self.gophers.iter().map(|g| format!("{g}\n")).collect()
    }

    /// The three building groups, one building per line.
    pub fn buildings_report(&self) -> String {
        fn group<T: fmt::Display>(title: &str, items: &[T]) -> String {
            let mut s = format!("{title} {{\n");
            for item in items {
                s.push('\t');
                s.push_str(&item.to_string());
                s.push('\n');
            }
            s.push('}');
            s
        }
        [
            group("Residentials", &self.residentials),
            group("Commercials", &self.commercials),
            group("Industrials", &self.industrials),
        ]
        .join("\n")
    }
}

impl fmt::Display for CitySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.gophers_report())?;
        f.write_str(&self.buildings_report())
    }
}

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// Four significant digits, trailing zeros dropped, exponent form outside
/// `1e-4..1e4`.
pub fn significant(v: Fixed64) -> String {
    format_significant(fixed64_to_f64(v), 4)
}

fn format_significant(v: f64, digits: i32) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    // Round to the requested precision first: 9.99995 must become "10".
    let sci = format!("{:.*e}", (digits - 1) as usize, v);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= digits {
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{}e{sign}{:02}", trim_zeros(mantissa), exp.abs());
    }
    let decimals = (digits - 1 - exp).max(0) as usize;
    trim_zeros(&format!("{v:.decimals$}")).to_string()
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixed;

    #[test]
    fn significant_digits() {
        assert_eq!(format_significant(0.0, 4), "0");
        assert_eq!(format_significant(0.5, 4), "0.5");
        assert_eq!(format_significant(1.0 / 6.0, 4), "0.1667");
        assert_eq!(format_significant(2.0 / 3.0 - 0.4, 4), "0.2667");
        assert_eq!(format_significant(12.5, 4), "12.5");
        assert_eq!(format_significant(3.0, 4), "3");
        assert_eq!(format_significant(123456.0, 4), "1.235e+05");
        assert_eq!(format_significant(0.00001, 4), "1e-05");
        assert_eq!(format_significant(9.99995, 4), "10");
    }

    #[test]
    fn gopher_lines() {
        let mut g = GopherSnapshot {
            id: AgentId::default(),
            name: "Klas".into(),
            happiness: fixed(0.55),
            job: Some(Workplace::Industrial(IndustrialId(0))),
            home: None,
        };
        assert_eq!(g.to_string(), "{Klas 0.55, works in the industry}");
        g.job = Some(Workplace::Commercial(CommercialId(1)));
        assert_eq!(g.to_string(), "{Klas 0.55, works in the commercial}");
        g.job = None;
        g.happiness = Fixed64::ZERO;
        assert_eq!(g.to_string(), "{Klas 0.00, is unemployed}");
    }

    #[test]
    fn building_lines() {
        let r = ResidentialSnapshot {
            id: ResidentialId(0),
            capacity: 4,
            residents: 4,
        };
        let c = CommercialSnapshot {
            id: CommercialId(0),
            capacity: 4,
            workers: 2,
            products: Fixed64::ZERO,
            goods: fixed(2.0 / 3.0 - 0.4),
        };
        let i = IndustrialSnapshot {
            id: IndustrialId(0),
            capacity: 4,
            workers: 1,
            products: fixed(1.0 / 6.0),
        };
        assert_eq!(r.to_string(), "{R 4}");
        assert_eq!(c.to_string(), "{C 2 (0/0.2667)}");
        assert_eq!(i.to_string(), "{I 1 (0.1667)}");
    }

    #[test]
    fn capture_follows_order_and_registry() {
        let mut eco = Economy::default();
        let ids = eco.spawn_many(["a", "b"]);
        eco.add_residential(4, ids.clone()).unwrap();
        let i = eco.add_industrial(2);
        eco.add_commercial(3);
        assert!(eco.do_work(i.into(), ids[1]));

        let snap = CitySnapshot::capture(&eco, &[ids[1], ids[0]], 3);
        assert_eq!(snap.day, 3);
        assert_eq!(snap.gophers[0].name, "b");
        assert_eq!(snap.gophers[1].name, "a");
        assert_eq!(snap.employed(), 1);
        assert_eq!(snap.residentials[0].residents, 2);
        assert_eq!(snap.commercials[0].capacity, 3);
        assert_eq!(snap.industrials[0].workers, 1);
        assert_eq!(snap.total_products(), fixed(0.5));
        assert_eq!(snap.total_goods(), Fixed64::ZERO);
    }

    #[test]
    fn full_report_layout() {
        let mut eco = Economy::default();
        let ids = eco.spawn_many(["a"]);
        eco.add_residential(4, ids.clone()).unwrap();
        eco.add_commercial(4);
        eco.add_industrial(4);

        let snap = CitySnapshot::capture(&eco, &ids, 0);
        assert_eq!(
            snap.to_string(),
            "{a 0.50, is unemployed}\n\n\
             Residentials {\n\t{R 1}\n}\n\
             Commercials {\n\t{C 0 (0/0)}\n}\n\
             Industrials {\n\t{I 0 (0)}\n}"
        );
    }
}
