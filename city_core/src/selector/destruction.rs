//! Probabilistic loss of fragile moments after efficiency choices.

use std::cmp::Reverse;
use tracing::{debug, info};

use city_rules::{MomentId, MomentLibrary, ProgressionState};

use super::MomentSelector;
use crate::random::RandomSource;

impl MomentSelector {
    /// Roll destruction for up to `count` of the most fragile revealed moments.
    ///
    /// Remembered moments are protected. Every destroyed id is recorded in
    /// both the library and the progression state; the ids are returned in
    /// roll order.
    pub fn apply_efficiency_consequences(
        &self,
        library: &mut MomentLibrary,
        state: &mut ProgressionState,
        count: usize,
        rng: &mut dyn RandomSource,
    ) -> Vec<MomentId> {
        let mut at_risk: Vec<(MomentId, u8)> = library
            .iter()
            .filter(|m| {
                m.revealed
                    && !m.destroyed
                    && !m.remembered
                    && m.fragility >= self.destruction.moderate_fragility
            })
            .map(|m| (m.id.clone(), m.fragility))
            .collect();

        // Stable, so equally fragile moments keep load order.
        at_risk.sort_by_key(|(_, fragility)| Reverse(*fragility));
        at_risk.truncate(count);

        let mut destroyed = Vec::new();
        for (id, fragility) in at_risk {
            let probability = self.destruction.probability_for(fragility);
            let roll = rng.next_f64();
            debug!(moment = %id, fragility, probability, roll, "Destruction roll");

            if roll < probability {
                library.destroy(&id);
                state.record_destroyed(id.clone());
                destroyed.push(id);
            }
        }

        if !destroyed.is_empty() {
            info!(
                destroyed = destroyed.len(),
                total_destroyed = state.destroyed_count(),
                "Efficiency consumed fragile moments"
            );
        }

        destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{SeededRandom, SequenceRandom};
    use city_rules::{Moment, MomentType};

    fn revealed_library(fragilities: &[u8]) -> MomentLibrary {
        let mut library = MomentLibrary::from_moments(
            fragilities
                .iter()
                .enumerate()
                .map(|(i, f)| Moment::new(format!("m{i}"), MomentType::Routine).with_fragility(*f)),
        );
        for i in 0..fragilities.len() {
            library.reveal(&MomentId::new(format!("m{i}")));
        }
        library
    }

    #[test]
    fn test_high_fragility_rate() {
        let selector = MomentSelector::with_defaults();
        let mut rng = SeededRandom::new(42);
        let mut destroyed = 0;
        let trials = 50;
        let per_trial = 100;

        for _ in 0..trials {
            let mut library = revealed_library(&[9; 100]);
            let mut state = ProgressionState::new();
            destroyed += selector
                .apply_efficiency_consequences(&mut library, &mut state, per_trial, &mut rng)
                .len();
        }

        let rate = destroyed as f64 / (trials * per_trial) as f64;
        assert!((rate - 0.6).abs() < 0.03, "rate {}", rate);
    }

    #[test]
    fn test_most_fragile_first() {
        let selector = MomentSelector::with_defaults();
        let mut library = revealed_library(&[5, 9, 7, 10]);
        let mut state = ProgressionState::new();
        let mut rng = SequenceRandom::constant(0.0);

        let destroyed = selector.apply_efficiency_consequences(&mut library, &mut state, 2, &mut rng);

        assert_eq!(destroyed, vec![MomentId::from("m3"), MomentId::from("m1")]);
        assert!(library.get(&MomentId::from("m3")).unwrap().destroyed);
        assert!(state.is_destroyed(&MomentId::from("m1")));
        assert!(!state.is_destroyed(&MomentId::from("m2")));
    }

    #[test]
    fn test_probability_tiers() {
        let selector = MomentSelector::with_defaults();
        // 0.35 clears the high tier (0.6) but not the moderate tier (0.3).
        let mut library = revealed_library(&[8, 6]);
        let mut state = ProgressionState::new();
        let mut rng = SequenceRandom::constant(0.35);

        let destroyed = selector.apply_efficiency_consequences(&mut library, &mut state, 5, &mut rng);
        assert_eq!(destroyed, vec![MomentId::from("m0")]);
    }

    #[test]
    fn test_protected_moments_survive() {
        let selector = MomentSelector::with_defaults();
        let mut library = revealed_library(&[9, 9, 2]);
        library.remember(&MomentId::from("m0"));
        library.insert(Moment::new("hidden", MomentType::Dream).with_fragility(10));
        let mut state = ProgressionState::new();
        let mut rng = SequenceRandom::constant(0.0);

        let destroyed = selector.apply_efficiency_consequences(&mut library, &mut state, 10, &mut rng);

        // Remembered, unrevealed and sturdy moments are out of reach.
        assert_eq!(destroyed, vec![MomentId::from("m1")]);
        assert_eq!(state.destroyed_count(), 1);
    }

    #[test]
    fn test_already_destroyed_not_rolled_again() {
        let selector = MomentSelector::with_defaults();
        let mut library = revealed_library(&[9]);
        let mut state = ProgressionState::new();
        let mut rng = SequenceRandom::constant(0.0);

        assert_eq!(
            selector.apply_efficiency_consequences(&mut library, &mut state, 1, &mut rng).len(),
            1
        );
        assert!(selector
            .apply_efficiency_consequences(&mut library, &mut state, 1, &mut rng)
            .is_empty());
    }
}
