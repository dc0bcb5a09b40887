//! Ending Classifier - a priority-ordered decision list over play statistics.
//!
//! Rules are evaluated top to bottom and the first match wins. The order is
//! deliberate: extreme outcomes are tested before balanced ones, so a
//! high-efficiency, high-loss run is Fragmentation even if it also qualifies
//! for Silence.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use city_rules::{ChoicePattern, Ending, ProgressionState, StoryFlag};

use crate::config::EndingThresholds;

/// Flags that together mark the Emergence ending.
pub const EMERGENCE_FLAGS: [StoryFlag; 3] = [
    StoryFlag::CityTranscended,
    StoryFlag::QuestionedOwnNature,
    StoryFlag::FormedNewPattern,
];

/// Everything the classifier looks at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndingInputs {
    pub story_ratio: f32,
    pub efficiency_ratio: f32,
    pub autonomy_ratio: f32,
    pub control_ratio: f32,
    pub destroyed: usize,
    pub trust: f32,
    pub autonomy: f32,
    pub flags: HashSet<StoryFlag>,
    pub total_choices: u32,
}

impl EndingInputs {
    pub fn from_state(state: &ProgressionState) -> Self {
        let choices = state.choices();
        Self {
            story_ratio: choices.ratio(ChoicePattern::Story),
            efficiency_ratio: choices.ratio(ChoicePattern::Efficiency),
            autonomy_ratio: choices.ratio(ChoicePattern::Autonomy),
            control_ratio: choices.ratio(ChoicePattern::Control),
            destroyed: state.destroyed_count(),
            trust: state.trust(),
            autonomy: state.autonomy(),
            flags: state.active_flags(),
            total_choices: choices.total(),
        }
    }

    pub fn has(&self, flag: StoryFlag) -> bool {
        self.flags.contains(&flag)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EndingClassifier {
    thresholds: EndingThresholds,
}

impl EndingClassifier {
    pub fn new(thresholds: EndingThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &EndingThresholds {
        &self.thresholds
    }

    /// Walk the decision list. `None` means no rule matched.
    pub fn classify(&self, inputs: &EndingInputs) -> Option<Ending> {
        let t = &self.thresholds;

        // Step 1-4: extreme outcomes
        if inputs.efficiency_ratio > t.fragmentation_efficiency
            && inputs.destroyed > t.fragmentation_destroyed
        {
            return self.matched(Ending::Fragmentation);
        }

        if inputs.story_ratio > t.archive_story && inputs.destroyed < t.archive_destroyed {
            return self.matched(Ending::Archive);
        }

        if inputs.control_ratio > t.silence_control && inputs.has(StoryFlag::IgnoredCityRequests)
        {
            return self.matched(Ending::Silence);
        }

        if inputs.autonomy_ratio > t.independence_ratio
            && inputs.autonomy >= t.independence_autonomy
        {
            return self.matched(Ending::Independence);
        }

        // Step 5: computed once, shared by the balanced outcomes below
        let balanced = self.is_balanced(inputs);

        // Step 6-9: balanced and positive outcomes
        if balanced
            && inputs.has(StoryFlag::AcceptedAmbiguity)
            && inputs.total_choices >= t.symbiosis_min_choices
        {
            return self.matched(Ending::Symbiosis);
        }

        if inputs.story_ratio + inputs.autonomy_ratio > t.harmony_combined
            && inputs.destroyed < t.harmony_destroyed
            && inputs.trust >= t.harmony_trust
        {
            return self.matched(Ending::Harmony);
        }

        if balanced && EMERGENCE_FLAGS.iter().all(|flag| inputs.has(*flag)) {
            return self.matched(Ending::Emergence);
        }

        if inputs.efficiency_ratio + inputs.control_ratio > t.optimization_combined
            && inputs.destroyed <= t.optimization_destroyed
        {
            return self.matched(Ending::Optimization);
        }

        debug!(?inputs, "No ending rule matched");
        None
    }

    /// Story and efficiency within the balance band, and so are autonomy and control.
    pub fn is_balanced(&self, inputs: &EndingInputs) -> bool {
        (inputs.story_ratio - inputs.efficiency_ratio).abs() < self.thresholds.balance
            && (inputs.autonomy_ratio - inputs.control_ratio).abs() < self.thresholds.balance
    }

    fn matched(&self, ending: Ending) -> Option<Ending> {
        debug!(ending = %ending, "Ending rule matched");
        Some(ending)
    }
}
