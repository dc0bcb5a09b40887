//! The structured record produced for every processed command.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use city_rules::{ChoicePattern, MomentId, StoryFlag, Verb};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Response {
    /// Text for the presentation layer to display.
    pub text: String,

    /// A narrative error (unknown command, bad moment id, ...). The game continues.
    pub is_error: bool,

    /// Ask the presentation layer to play its feedback animation.
    pub trigger_feedback: bool,

    pub revealed_moment: Option<MomentId>,

    /// The choice this command recorded, if any.
    pub choice_pattern: Option<ChoicePattern>,

    pub flags_to_set: BTreeMap<StoryFlag, bool>,

    pub commands_to_unlock: Vec<Verb>,

    pub advance_scene: bool,

    /// Act IV's final choice was completed by this command.
    pub final_choice: bool,
}

impl Response {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// In-voice narrative error.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
            ..Default::default()
        }
    }

    pub fn with_feedback(mut self) -> Self {
        self.trigger_feedback = true;
        self
    }

    pub fn with_revealed(mut self, id: MomentId) -> Self {
        self.revealed_moment = Some(id);
        self
    }

    pub fn with_choice(mut self, pattern: ChoicePattern) -> Self {
        self.choice_pattern = Some(pattern);
        self
    }

    pub fn with_flag(mut self, flag: StoryFlag) -> Self {
        self.flags_to_set.insert(flag, true);
        self
    }

    pub fn with_unlocks(mut self, verbs: impl IntoIterator<Item = Verb>) -> Self {
        self.commands_to_unlock.extend(verbs);
        self
    }

    pub fn advancing_scene(mut self) -> Self {
        self.advance_scene = true;
        self
    }

    pub fn as_final_choice(mut self) -> Self {
        self.final_choice = true;
        self
    }

    /// Append a paragraph to the display text.
    pub fn push_paragraph(&mut self, paragraph: &str) {
        if paragraph.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push_str("\n\n");
        }
        self.text.push_str(paragraph);
    }

    pub fn sets_flag(&self, flag: StoryFlag) -> bool {
        self.flags_to_set.get(&flag).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let response = Response::new("The lights flicker.")
            .with_feedback()
            .with_choice(ChoicePattern::Efficiency)
            .with_flag(StoryFlag::BusRouteDecided)
            .advancing_scene();

        assert!(!response.is_error);
        assert!(response.trigger_feedback);
        assert_eq!(response.choice_pattern, Some(ChoicePattern::Efficiency));
        assert!(response.sets_flag(StoryFlag::BusRouteDecided));
        assert!(!response.sets_flag(StoryFlag::CityTranscended));
        assert!(response.advance_scene);
    }

    #[test]
    fn test_push_paragraph() {
        let mut response = Response::new("");
        response.push_paragraph("One.");
        response.push_paragraph("");
        response.push_paragraph("Two.");
        assert_eq!(response.text, "One.\n\nTwo.");
    }

    #[test]
    fn test_error_flag() {
        assert!(Response::error("No.").is_error);
    }
}
