//! Story beats - authored lines that play once when progression lines up.

use tracing::info;

use city_rules::{BeatConditions, ProgressionState, StoryBeat};

/// Fires at most one beat per command, in content order.
#[derive(Debug, Clone, Default)]
pub struct BeatDirector {
    beats: Vec<StoryBeat>,
}

impl BeatDirector {
    pub fn new(beats: Vec<StoryBeat>) -> Self {
        Self { beats }
    }

    pub fn beats(&self) -> &[StoryBeat] {
        &self.beats
    }

    /// Fire the first unfired beat for the current act whose conditions hold.
    ///
    /// The beat's effects are applied to `state` and the beat is marked as
    /// fired there, so it never plays again.
    pub fn fire(&self, state: &mut ProgressionState) -> Option<&StoryBeat> {
        let beat = self.beats.iter().find(|beat| {
            beat.act == state.act()
                && !state.beat_fired(&beat.id)
                && conditions_hold(&beat.conditions, state)
        })?;

        state.adjust_trust(beat.effects.trust_delta);
        state.adjust_autonomy(beat.effects.autonomy_delta);
        for flag in &beat.effects.set_flags {
            state.set_flag(*flag, true);
        }
        state.mark_beat_fired(beat.id.clone());

        info!(beat = %beat.id, act = beat.act, "Story beat fired");
        Some(beat)
    }
}

/// All declared conditions hold. Undeclared ones are ignored.
pub fn conditions_hold(conditions: &BeatConditions, state: &ProgressionState) -> bool {
    conditions.min_trust.map_or(true, |min| state.trust() >= min)
        && conditions.max_trust.map_or(true, |max| state.trust() <= max)
        && conditions
            .min_autonomy
            .map_or(true, |min| state.autonomy() >= min)
        && conditions
            .min_choices
            .map_or(true, |min| state.total_choices() >= min)
        && conditions
            .min_revealed
            .map_or(true, |min| state.revealed().len() >= min)
        && conditions.required_flags.iter().all(|flag| state.flag(*flag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use city_rules::{BeatEffects, ChoicePattern, MomentId, StoryFlag};

    fn director() -> BeatDirector {
        BeatDirector::new(vec![
            StoryBeat::new("first-words", 1)
                .with_line("...hello?")
                .with_conditions(BeatConditions {
                    min_revealed: Some(1),
                    ..Default::default()
                })
                .with_effects(BeatEffects {
                    trust_delta: 0.1,
                    ..Default::default()
                }),
            StoryBeat::new("second-words", 1).with_line("Are you still there?"),
            StoryBeat::new("doubt", 2)
                .with_line("Why did the buses change?")
                .with_conditions(BeatConditions {
                    required_flags: vec![StoryFlag::BusRouteDecided],
                    max_trust: Some(0.5),
                    ..Default::default()
                }),
        ])
    }

    #[test]
    fn test_fires_once_in_order() {
        let director = director();
        let mut state = ProgressionState::new();
        state.reveal_moment(MomentId::from("bakery"));

        assert_eq!(director.fire(&mut state).map(|b| b.id.as_str()), Some("first-words"));
        assert!((state.trust() - 0.6).abs() < 1e-6);
        assert!(state.beat_fired("first-words"));

        assert_eq!(director.fire(&mut state).map(|b| b.id.as_str()), Some("second-words"));
        assert!(director.fire(&mut state).is_none());
    }

    #[test]
    fn test_unmet_conditions_skip_beat() {
        let director = director();
        let mut state = ProgressionState::new();

        // Nothing revealed yet, so the unconditioned beat plays first.
        assert_eq!(director.fire(&mut state).map(|b| b.id.as_str()), Some("second-words"));
        assert!(!state.beat_fired("first-words"));
    }

    #[test]
    fn test_flag_and_trust_gates() {
        let director = director();
        let mut state = ProgressionState::new();
        state.advance_act().unwrap();
        state.record_choice(ChoicePattern::Efficiency);

        assert!(director.fire(&mut state).is_none());

        state.set_flag(StoryFlag::BusRouteDecided, true);
        state.set_trust(0.9);
        assert!(director.fire(&mut state).is_none());

        state.set_trust(0.4);
        assert_eq!(director.fire(&mut state).map(|b| b.id.as_str()), Some("doubt"));
    }
}
