//! Progression state - everything a playthrough accumulates.
//!
//! This is the only entity that has to survive between sessions; its
//! serialized field set is the save-file contract.

mod stage;

pub use stage::*;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::StateError;
use crate::mechanics::{ChoicePattern, Ending, StoryFlag, Verb};
use crate::moments::MomentId;

/// How many times each choice pattern has been recorded. Counters only grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChoiceCounters {
    story: u32,
    efficiency: u32,
    autonomy: u32,
    control: u32,
}

impl ChoiceCounters {
    /// Counters with explicit values, e.g. when replaying a save.
    pub fn with_counts(story: u32, efficiency: u32, autonomy: u32, control: u32) -> Self {
        Self {
            story,
            efficiency,
            autonomy,
            control,
        }
    }

    pub fn get(&self, pattern: ChoicePattern) -> u32 {
        match pattern {
            ChoicePattern::Story => self.story,
            ChoicePattern::Efficiency => self.efficiency,
            ChoicePattern::Autonomy => self.autonomy,
            ChoicePattern::Control => self.control,
        }
    }

    pub fn record(&mut self, pattern: ChoicePattern) {
        let counter = match pattern {
            ChoicePattern::Story => &mut self.story,
            ChoicePattern::Efficiency => &mut self.efficiency,
            ChoicePattern::Autonomy => &mut self.autonomy,
            ChoicePattern::Control => &mut self.control,
        };
        *counter = counter.saturating_add(1);
    }

    /// Sum of all counters, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        self.story
            .saturating_add(self.efficiency)
            .saturating_add(self.autonomy)
            .saturating_add(self.control)
    }

    /// Share of all choices that carried `pattern`; 0 before any choice.
    pub fn ratio(&self, pattern: ChoicePattern) -> f32 {
        let total: u64 = ChoicePattern::ALL
            .iter()
            .map(|p| u64::from(self.get(*p)))
            .sum();
        if total == 0 {
            0.0
        } else {
            (self.get(pattern) as f64 / total as f64) as f32
        }
    }
}

/// One processed command, as shown by the `history` meta-command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub act: u8,
    pub scene: u32,
    pub verb: Verb,
    pub pattern: Option<ChoicePattern>,
}

/// The complete progression of a playthrough.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionState {
    stage: ActStage,
    scene: u32,
    choices: ChoiceCounters,

    /// City trust in the operator, 0.0 - 1.0.
    trust: f32,
    /// City autonomy, 0.0 - 1.0.
    autonomy: f32,

    revealed: HashSet<MomentId>,
    #[serde(default)]
    remembered: HashSet<MomentId>,
    destroyed: HashSet<MomentId>,

    flags: HashMap<StoryFlag, bool>,
    unlocked: HashSet<Verb>,
    ending: Option<Ending>,

    #[serde(default)]
    history: Vec<HistoryEntry>,
    #[serde(default)]
    fired_beats: HashSet<String>,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            stage: ActStage::default(),
            scene: 0,
            choices: ChoiceCounters::default(),
            trust: 0.5,
            autonomy: 0.2,
            revealed: HashSet::new(),
            remembered: HashSet::new(),
            destroyed: HashSet::new(),
            flags: HashMap::new(),
            unlocked: HashSet::new(),
            ending: None,
            history: Vec::new(),
            fired_beats: HashSet::new(),
        }
    }
}

impl ProgressionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore invariants on a state that came from outside (e.g. a save file).
    pub fn normalized(mut self) -> Self {
        self.trust = clamp_unit(self.trust);
        self.autonomy = clamp_unit(self.autonomy);
        let destroyed: Vec<_> = self.destroyed.iter().cloned().collect();
        self.revealed.extend(destroyed);
        self
    }

    // --- Acts and scenes ---

    pub fn stage(&self) -> &ActStage {
        &self.stage
    }

    pub fn act(&self) -> u8 {
        self.stage.number()
    }

    /// Replace the current act's private progress. The act itself cannot change here.
    pub fn update_stage(&mut self, stage: ActStage) -> Result<(), StateError> {
        if stage.number() != self.stage.number() {
            return Err(StateError::StageMismatch {
                expected: self.stage.number(),
                found: stage.number(),
            });
        }
        self.stage = stage;
        Ok(())
    }

    /// Move to the next act. Acts never go backwards.
    pub fn advance_act(&mut self) -> Result<u8, StateError> {
        let next = self
            .stage
            .next()
            .ok_or(StateError::FinalAct(self.stage.number()))?;
        self.stage = next;
        Ok(next.number())
    }

    pub fn scene(&self) -> u32 {
        self.scene
    }

    pub fn advance_scene(&mut self) {
        self.scene = self.scene.saturating_add(1);
    }

    // --- Choices ---

    pub fn choices(&self) -> &ChoiceCounters {
        &self.choices
    }

    pub fn total_choices(&self) -> u32 {
        self.choices.total()
    }

    pub fn record_choice(&mut self, pattern: ChoicePattern) {
        self.choices.record(pattern);
    }

    // --- City relationship scalars ---

    pub fn trust(&self) -> f32 {
        self.trust
    }

    pub fn autonomy(&self) -> f32 {
        self.autonomy
    }

    pub fn set_trust(&mut self, trust: f32) {
        self.trust = clamp_unit(trust);
    }

    pub fn set_autonomy(&mut self, autonomy: f32) {
        self.autonomy = clamp_unit(autonomy);
    }

    pub fn adjust_trust(&mut self, delta: f32) {
        self.set_trust(self.trust + delta);
    }

    pub fn adjust_autonomy(&mut self, delta: f32) {
        self.set_autonomy(self.autonomy + delta);
    }

    // --- Moments ---

    /// Record a reveal. Returns false if it was already revealed.
    pub fn reveal_moment(&mut self, id: MomentId) -> bool {
        self.revealed.insert(id)
    }

    pub fn remember_moment(&mut self, id: MomentId) -> bool {
        self.remembered.insert(id)
    }

    /// Record a destruction. A destroyed moment always counts as revealed.
    pub fn record_destroyed(&mut self, id: MomentId) -> bool {
        self.revealed.insert(id.clone());
        self.destroyed.insert(id)
    }

    pub fn is_revealed(&self, id: &MomentId) -> bool {
        self.revealed.contains(id)
    }

    pub fn is_destroyed(&self, id: &MomentId) -> bool {
        self.destroyed.contains(id)
    }

    pub fn revealed(&self) -> &HashSet<MomentId> {
        &self.revealed
    }

    pub fn remembered(&self) -> &HashSet<MomentId> {
        &self.remembered
    }

    pub fn destroyed(&self) -> &HashSet<MomentId> {
        &self.destroyed
    }

    pub fn destroyed_count(&self) -> usize {
        self.destroyed.len()
    }

    // --- Flags ---

    pub fn flag(&self, flag: StoryFlag) -> bool {
        self.flags.get(&flag).copied().unwrap_or(false)
    }

    pub fn set_flag(&mut self, flag: StoryFlag, value: bool) {
        self.flags.insert(flag, value);
    }

    /// Flags currently set to true.
    pub fn active_flags(&self) -> HashSet<StoryFlag> {
        self.flags
            .iter()
            .filter(|(_, value)| **value)
            .map(|(flag, _)| *flag)
            .collect()
    }

    // --- Commands ---

    pub fn unlock(&mut self, verb: Verb) -> bool {
        self.unlocked.insert(verb)
    }

    pub fn is_unlocked(&self, verb: Verb) -> bool {
        self.unlocked.contains(&verb)
    }

    pub fn unlocked(&self) -> &HashSet<Verb> {
        &self.unlocked
    }

    // --- Ending ---

    pub fn ending(&self) -> Option<Ending> {
        self.ending
    }

    /// Fix the ending. Once set it never changes.
    pub fn set_ending(&mut self, ending: Ending) -> Result<(), StateError> {
        match self.ending {
            Some(existing) => Err(StateError::EndingAlreadySet(existing)),
            None => {
                self.ending = Some(ending);
                Ok(())
            }
        }
    }

    // --- History and beats ---

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
    }

    pub fn beat_fired(&self, beat_id: &str) -> bool {
        self.fired_beats.contains(beat_id)
    }

    /// Returns false if the beat had already fired.
    pub fn mark_beat_fired(&mut self, beat_id: impl Into<String>) -> bool {
        self.fired_beats.insert(beat_id.into())
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = ProgressionState::new();
        assert_eq!(state.act(), 1);
        assert_eq!(state.scene(), 0);
        assert_eq!(state.total_choices(), 0);
        assert!(state.ending().is_none());
    }

    #[test]
    fn test_ratios() {
        let mut state = ProgressionState::new();
        assert_eq!(state.choices().ratio(ChoicePattern::Story), 0.0);

        state.record_choice(ChoicePattern::Story);
        state.record_choice(ChoicePattern::Story);
        state.record_choice(ChoicePattern::Story);
        state.record_choice(ChoicePattern::Control);

        assert_eq!(state.total_choices(), 4);
        assert!((state.choices().ratio(ChoicePattern::Story) - 0.75).abs() < 0.001);
        assert!((state.choices().ratio(ChoicePattern::Control) - 0.25).abs() < 0.001);
    }

    #[test]
    fn test_totals_saturate_on_huge_counters() {
        let counters = ChoiceCounters::with_counts(u32::MAX, 1, 0, 0);
        assert_eq!(counters.total(), u32::MAX);
        assert!((counters.ratio(ChoicePattern::Story) - 1.0).abs() < 0.001);
        assert!(counters.ratio(ChoicePattern::Efficiency) > 0.0);

        let mut json = serde_json::to_value(ProgressionState::new()).unwrap();
        json["choices"] = serde_json::json!({
            "story": u32::MAX,
            "efficiency": u32::MAX,
            "autonomy": 0,
            "control": 0
        });
        let restored: ProgressionState = serde_json::from_value(json).unwrap();
        assert_eq!(restored.total_choices(), u32::MAX);
        assert!((restored.choices().ratio(ChoicePattern::Efficiency) - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_trust_and_autonomy_clamped() {
        let mut state = ProgressionState::new();
        state.adjust_trust(5.0);
        state.adjust_autonomy(-3.0);
        assert_eq!(state.trust(), 1.0);
        assert_eq!(state.autonomy(), 0.0);

        state.set_trust(f32::NAN);
        assert_eq!(state.trust(), 0.0);
    }

    #[test]
    fn test_destroyed_implies_revealed() {
        let mut state = ProgressionState::new();
        let id = MomentId::from("fountain");

        assert!(state.record_destroyed(id.clone()));
        assert!(state.is_revealed(&id));
        assert!(state.is_destroyed(&id));
        assert!(!state.record_destroyed(id));
        assert_eq!(state.destroyed_count(), 1);
    }

    #[test]
    fn test_act_only_moves_forward() {
        let mut state = ProgressionState::new();
        assert_eq!(state.advance_act(), Ok(2));
        assert_eq!(state.advance_act(), Ok(3));
        assert_eq!(state.advance_act(), Ok(4));
        assert_eq!(state.advance_act(), Err(StateError::FinalAct(4)));
        assert_eq!(state.act(), 4);
    }

    #[test]
    fn test_update_stage_rejects_other_act() {
        let mut state = ProgressionState::new();
        let result = state.update_stage(ActStage::Resolution(ResolutionProgress::default()));
        assert_eq!(
            result,
            Err(StateError::StageMismatch {
                expected: 1,
                found: 4
            })
        );
        assert_eq!(state.act(), 1);
    }

    #[test]
    fn test_ending_is_immutable() {
        let mut state = ProgressionState::new();
        assert!(state.set_ending(Ending::Harmony).is_ok());
        assert_eq!(
            state.set_ending(Ending::Silence),
            Err(StateError::EndingAlreadySet(Ending::Harmony))
        );
        assert_eq!(state.ending(), Some(Ending::Harmony));
    }

    #[test]
    fn test_flags() {
        let mut state = ProgressionState::new();
        assert!(!state.flag(StoryFlag::AcceptedAmbiguity));

        state.set_flag(StoryFlag::AcceptedAmbiguity, true);
        state.set_flag(StoryFlag::CityTranscended, false);

        assert!(state.flag(StoryFlag::AcceptedAmbiguity));
        assert_eq!(state.active_flags().len(), 1);
    }

    #[test]
    fn test_beats_fire_once() {
        let mut state = ProgressionState::new();
        assert!(state.mark_beat_fired("first-light"));
        assert!(!state.mark_beat_fired("first-light"));
        assert!(state.beat_fired("first-light"));
    }

    #[test]
    fn test_save_round_trip_normalizes() {
        let mut state = ProgressionState::new();
        state.unlock(Verb::Observe);
        state.record_destroyed(MomentId::from("pier"));
        state.advance_act().unwrap();

        let mut json = serde_json::to_value(&state).unwrap();
        json["trust"] = serde_json::json!(3.5);
        json["revealed"] = serde_json::json!([]);

        let restored: ProgressionState = serde_json::from_value(json).unwrap();
        let restored = restored.normalized();

        assert_eq!(restored.trust(), 1.0);
        assert_eq!(restored.act(), 2);
        assert!(restored.is_unlocked(Verb::Observe));
        assert!(restored.is_revealed(&MomentId::from("pier")));
    }
}
