//! The moment library - every moment known to the session, in load order.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{Moment, MomentId};

/// Owns all moments loaded from the content store.
///
/// Iteration follows load order so that seeded selection replays exactly.
/// Moments are mutated in place and only removed by [`MomentLibrary::clear`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MomentLibrary {
    moments: Vec<Moment>,

    /// Index: id -> position in `moments`.
    #[serde(skip)]
    index: HashMap<MomentId, usize>,
}

impl MomentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from loaded moments. Later duplicates replace earlier ones.
    pub fn from_moments(moments: impl IntoIterator<Item = Moment>) -> Self {
        let mut library = Self::new();
        for moment in moments {
            library.insert(moment);
        }
        library
    }

    /// Add a moment, replacing any moment with the same id.
    pub fn insert(&mut self, moment: Moment) {
        let moment = moment.normalized();
        match self.index.get(&moment.id) {
            Some(&position) => self.moments[position] = moment,
            None => {
                self.index.insert(moment.id.clone(), self.moments.len());
                self.moments.push(moment);
            }
        }
    }

    pub fn get(&self, id: &MomentId) -> Option<&Moment> {
        self.position(id).map(|p| &self.moments[p])
    }

    pub fn get_mut(&mut self, id: &MomentId) -> Option<&mut Moment> {
        self.position(id).map(move |p| &mut self.moments[p])
    }

    pub fn contains(&self, id: &MomentId) -> bool {
        self.position(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Moment> {
        self.moments.iter()
    }

    pub fn len(&self) -> usize {
        self.moments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moments.is_empty()
    }

    /// Mark a moment revealed. Returns false for unknown ids.
    pub fn reveal(&mut self, id: &MomentId) -> bool {
        self.update(id, Moment::reveal)
    }

    pub fn remember(&mut self, id: &MomentId) -> bool {
        self.update(id, Moment::remember)
    }

    pub fn destroy(&mut self, id: &MomentId) -> bool {
        self.update(id, Moment::destroy)
    }

    /// Revealed moments, in load order.
    pub fn revealed(&self) -> impl Iterator<Item = &Moment> {
        self.moments.iter().filter(|m| m.revealed)
    }

    /// Revealed, intact moments in a district.
    pub fn visible_in_district(&self, district: u8) -> impl Iterator<Item = &Moment> {
        self.moments
            .iter()
            .filter(move |m| m.district == district && m.revealed && !m.destroyed)
    }

    /// Find moments matching a predicate.
    pub fn find<F>(&self, predicate: F) -> Vec<&Moment>
    where
        F: Fn(&Moment) -> bool,
    {
        self.moments.iter().filter(|m| predicate(m)).collect()
    }

    /// Re-apply persisted lifecycle sets after a load.
    pub fn sync_lifecycle(
        &mut self,
        revealed: &HashSet<MomentId>,
        remembered: &HashSet<MomentId>,
        destroyed: &HashSet<MomentId>,
    ) {
        for moment in &mut self.moments {
            moment.revealed = revealed.contains(&moment.id) || destroyed.contains(&moment.id);
            moment.remembered = remembered.contains(&moment.id);
            moment.destroyed = destroyed.contains(&moment.id);
        }
    }

    /// Explicit reset: clear every lifecycle flag but keep the content.
    pub fn reset_lifecycle(&mut self) {
        for moment in &mut self.moments {
            moment.revealed = false;
            moment.remembered = false;
            moment.destroyed = false;
        }
    }

    /// Remove every moment.
    pub fn clear(&mut self) {
        self.moments.clear();
        self.index.clear();
    }

    fn position(&self, id: &MomentId) -> Option<usize> {
        // The index is skipped by serde, so a deserialized library falls back to a scan.
        self.index
            .get(id)
            .copied()
            .or_else(|| self.moments.iter().position(|m| &m.id == id))
    }

    fn update(&mut self, id: &MomentId, apply: fn(&mut Moment)) -> bool {
        match self.get_mut(id) {
            Some(moment) => {
                apply(moment);
                true
            }
            None => false,
        }
    }
}
