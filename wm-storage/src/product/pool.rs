//! Shared filter parameter sets of a product

use crate::parameter_set::ParameterSet;
use std::collections::{BTreeSet, HashSet};
use uuid::Uuid;

/// Filter parameter sets referenced by measure tasks through their
/// `graphParamSet` id
///
/// Sets can be discarded to save memory. A discarded set stays known by id
/// and can be read back from the product document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSetPool {
    sets: Vec<ParameterSet>,
    discarded: BTreeSet<Uuid>,
}

impl ParameterSetPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterSet> {
        self.sets.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ParameterSet> {
        self.sets.iter_mut()
    }

    pub fn get(&self, id: &Uuid) -> Option<&ParameterSet> {
        self.sets.iter().find(|set| set.uuid() == *id)
    }

    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut ParameterSet> {
        self.sets.iter_mut().find(|set| set.uuid() == *id)
    }

    /// Loaded or discarded
    pub fn contains(&self, id: &Uuid) -> bool {
        self.is_loaded(id) || self.discarded.contains(id)
    }

    pub fn is_loaded(&self, id: &Uuid) -> bool {
        self.get(id).is_some()
    }

    pub fn is_discarded(&self, id: &Uuid) -> bool {
        self.discarded.contains(id)
    }

    pub fn discarded(&self) -> impl Iterator<Item = &Uuid> {
        self.discarded.iter()
    }

    /// Add a set, returning the one it replaced
    pub fn insert(&mut self, set: ParameterSet) -> Option<ParameterSet> {
        self.discarded.remove(&set.uuid());
        match self.sets.iter().position(|s| s.uuid() == set.uuid()) {
            Some(index) => Some(std::mem::replace(&mut self.sets[index], set)),
            None => {
                self.sets.push(set);
                None
            }
        }
    }

    /// Drop a set entirely, loaded or discarded
    pub fn remove(&mut self, id: &Uuid) -> Option<ParameterSet> {
        self.discarded.remove(id);
        let index = self.sets.iter().position(|s| s.uuid() == *id)?;
        Some(self.sets.remove(index))
    }

    /// Unload a set but remember its id
    pub fn discard(&mut self, id: &Uuid) -> bool {
        let Some(index) = self.sets.iter().position(|s| s.uuid() == *id) else {
            return false;
        };
        self.sets.remove(index);
        self.discarded.insert(*id);
        true
    }

    pub(crate) fn mark_discarded(&mut self, id: Uuid) {
        if !self.is_loaded(&id) {
            self.discarded.insert(id);
        }
    }

    /// Remove every set, loaded or discarded, whose id is not in `used`
    ///
    /// Returns the removed ids.
    pub fn retain_referenced(&mut self, used: &HashSet<Uuid>) -> Vec<Uuid> {
        let mut removed: Vec<Uuid> = self
            .sets
            .iter()
            .map(ParameterSet::uuid)
            .filter(|id| !used.contains(id))
            .collect();
        removed.extend(self.discarded.iter().filter(|id| !used.contains(id)).copied());
        self.sets.retain(|set| used.contains(&set.uuid()));
        self.discarded.retain(|id| used.contains(id));
        removed
    }

    pub fn set_change_tracking_enabled(&mut self, enabled: bool) {
        for set in &mut self.sets {
            set.set_change_tracking_enabled(enabled);
        }
    }
}
