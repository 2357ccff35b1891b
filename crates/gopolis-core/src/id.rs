use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a gopher in the population arena.
    pub struct AgentId;
}

/// Identifies a residential building by its registration index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResidentialId(pub u32);

/// Identifies a commercial building by its registration index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommercialId(pub u32);

/// Identifies an industrial building by its registration index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndustrialId(pub u32);

/// A building that employs workers. This is what an agent's `job` points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Workplace {
    Commercial(CommercialId),
    Industrial(IndustrialId),
}

impl From<CommercialId> for Workplace {
    fn from(id: CommercialId) -> Self {
        Workplace::Commercial(id)
    }
}

impl From<IndustrialId> for Workplace {
    fn from(id: IndustrialId) -> Self {
        Workplace::Industrial(id)
    }
}

/// Handle returned by [`Dispatcher::subscribe`](crate::event::Dispatcher::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn building_ids_compare_by_index() {
        assert_eq!(CommercialId(0), CommercialId(0));
        assert_ne!(CommercialId(0), CommercialId(1));
        assert!(IndustrialId(1) < IndustrialId(2));
    }

    #[test]
    fn workplace_from_ids() {
        assert_eq!(Workplace::from(CommercialId(3)), Workplace::Commercial(CommercialId(3)));
        assert_eq!(Workplace::from(IndustrialId(1)), Workplace::Industrial(IndustrialId(1)));
        assert_ne!(
            Workplace::from(CommercialId(0)),
            Workplace::from(IndustrialId(0))
        );
    }

    #[test]
    fn agent_ids_are_hashable() {
        use slotmap::SlotMap;
        use std::collections::HashMap;

        let mut arena = SlotMap::<AgentId, ()>::with_key();
        let a = arena.insert(());
        let b = arena.insert(());
        let mut names = HashMap::new();
        names.insert(a, "Klas");
        names.insert(b, "Sture");
        assert_eq!(names[&a], "Klas");
    }
}
