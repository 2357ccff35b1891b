//! The city's building catalog.
//!
//! Append-only: buildings are registered during setup and never removed.
//! Ids are registration indices, so iterating a collection visits buildings
//! in registration order. Every matching operation relies on that order.

use serde::{Deserialize, Serialize};

use crate::building::{Commercial, Employer, Industrial, Residential, Roster};
use crate::id::{CommercialId, IndustrialId, ResidentialId, Workplace};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    residentials: Vec<Residential>,
    commercials: Vec<Commercial>,
    industrials: Vec<Industrial>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append residentials. Returns their ids in the order given.
    pub fn add_residentials(
        &mut self,
        buildings: impl IntoIterator<Item = Residential>,
    ) -> Vec<ResidentialId> {
        buildings
            .into_iter()
            .map(|b| {
                let id = ResidentialId(self.residentials.len() as u32);
                self.residentials.push(b);
                id
            })
            .collect()
    }

    /// Append commercials. Returns their ids in the order given.
    pub fn add_commercials(
        &mut self,
        buildings: impl IntoIterator<Item = Commercial>,
    ) -> Vec<CommercialId> {
        buildings
            .into_iter()
            .map(|b| {
                let id = CommercialId(self.commercials.len() as u32);
                self.commercials.push(b);
                id
            })
            .collect()
    }

    /// Append industrials. Returns their ids in the order given.
    pub fn add_industrials(
        &mut self,
        buildings: impl IntoIterator<Item = Industrial>,
    ) -> Vec<IndustrialId> {
        buildings
            .into_iter()
            .map(|b| {
                let id = IndustrialId(self.industrials.len() as u32);
                self.industrials.push(b);
                id
            })
            .collect()
    }

    pub fn residentials(&self) -> &[Residential] {
        &self.residentials
    }

    pub fn commercials(&self) -> &[Commercial] {
        &self.commercials
    }

    pub fn industrials(&self) -> &[Industrial] {
        &self.industrials
    }

    pub fn residential_ids(&self) -> impl Iterator<Item = ResidentialId> + use<> {
        (0..self.residentials.len() as u32).map(ResidentialId)
    }

    pub fn commercial_ids(&self) -> impl Iterator<Item = CommercialId> + use<> {
        (0..self.commercials.len() as u32).map(CommercialId)
    }

    pub fn industrial_ids(&self) -> impl Iterator<Item = IndustrialId> + use<> {
        (0..self.industrials.len() as u32).map(IndustrialId)
    }

    pub fn residential(&self, id: ResidentialId) -> Option<&Residential> {
        self.residentials.get(id.0 as usize)
    }

    pub fn commercial(&self, id: CommercialId) -> Option<&Commercial> {
        self.commercials.get(id.0 as usize)
    }

    pub fn industrial(&self, id: IndustrialId) -> Option<&Industrial> {
        self.industrials.get(id.0 as usize)
    }

    pub(crate) fn commercial_mut(&mut self, id: CommercialId) -> Option<&mut Commercial> {
        self.commercials.get_mut(id.0 as usize)
    }

    pub(crate) fn industrial_mut(&mut self, id: IndustrialId) -> Option<&mut Industrial> {
        self.industrials.get_mut(id.0 as usize)
    }

    /// The roster behind a workplace id.
    pub fn roster(&self, workplace: Workplace) -> Option<&Roster> {
        match workplace {
            Workplace::Commercial(id) => self.commercial(id).map(Employer::roster),
            Workplace::Industrial(id) => self.industrial(id).map(Employer::roster),
        }
    }

    pub(crate) fn roster_mut(&mut self, workplace: Workplace) -> Option<&mut Roster> {
        match workplace {
            Workplace::Commercial(id) => self.commercial_mut(id).map(Employer::roster_mut),
            Workplace::Industrial(id) => self.industrial_mut(id).map(Employer::roster_mut),
        }
    }

    /// Every workplace, commercials first, each group in registration order.
    pub fn workplaces(&self) -> impl Iterator<Item = Workplace> + use<> {
        self.commercial_ids()
            .map(Workplace::Commercial)
            .chain(self.industrial_ids().map(Workplace::Industrial))
    }

    pub fn contains_residential(&self, id: ResidentialId) -> bool {
        (id.0 as usize) < self.residentials.len()
    }

    pub fn contains_workplace(&self, workplace: Workplace) -> bool {
        self.roster(workplace).is_some()
    }
}
