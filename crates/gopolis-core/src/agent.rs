//! Gophers: the simulation's agents.

use serde::{Deserialize, Serialize};

use crate::fixed::{Fixed64, clamp_unit};
use crate::id::{ResidentialId, Workplace};

/// A gopher looking for work and goods.
///
/// `job` and `home` are plain identifiers. The agent itself lives in the
/// population arena; its employer only lists its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gopher {
    pub name: String,
    pub(crate) worked: bool,
    pub(crate) shopped: bool,
    pub(crate) happiness: Fixed64,
    pub(crate) job: Option<Workplace>,
    pub(crate) home: Option<ResidentialId>,
}

impl Gopher {
    /// A fresh, unemployed, homeless gopher at happiness 0.5.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            worked: false,
            shopped: false,
            happiness: Fixed64::from_num(0.5),
            job: None,
            home: None,
        }
    }

    pub fn has_worked(&self) -> bool {
        self.worked
    }

    pub fn work_done(&mut self) {
        self.worked = true;
    }

    pub fn has_shopped(&self) -> bool {
        self.shopped
    }

    pub fn shop_done(&mut self) {
        self.shopped = true;
    }

    pub fn happiness(&self) -> Fixed64 {
        self.happiness
    }

    pub fn job(&self) -> Option<Workplace> {
        self.job
    }

    pub fn home(&self) -> Option<ResidentialId> {
        self.home
    }

    pub fn is_employed(&self) -> bool {
        self.job.is_some()
    }

    /// Available for a shift today: has not worked yet.
    pub fn is_idle(&self) -> bool {
        !self.worked
    }

    /// End of day: settle happiness and reset the daily flags.
    ///
    /// +0.5 / -0.5 for working, the same for shopping, +0.05 regardless,
    /// clamped to `[0, 1]`.
    pub fn sleep(&mut self) {
        let half = Fixed64::from_num(0.5);
        let bonus = Fixed64::from_num(0.05);

        let mut h = self.happiness;
        h = if self.worked { h + half } else { h - half };
        h = if self.shopped { h + half } else { h - half };
        h += bonus;

        self.happiness = clamp_unit(h);
        self.worked = false;
        self.shopped = false;
    }
}
