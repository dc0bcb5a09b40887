//! Story beats - authored city dialogue gated on progression.

use serde::{Deserialize, Serialize};

use crate::mechanics::StoryFlag;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BeatConditions {
    pub min_trust: Option<f32>,
    pub max_trust: Option<f32>,
    pub min_autonomy: Option<f32>,
    pub min_choices: Option<u32>,
    pub min_revealed: Option<usize>,
    #[serde(default)]
    pub required_flags: Vec<StoryFlag>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BeatEffects {
    #[serde(default)]
    pub trust_delta: f32,
    #[serde(default)]
    pub autonomy_delta: f32,
    #[serde(default)]
    pub set_flags: Vec<StoryFlag>,
}

/// A line of city dialogue that plays once when its act and conditions line up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryBeat {
    pub id: String,
    pub act: u8,
    #[serde(default)]
    pub conditions: BeatConditions,
    pub lines: Vec<String>,
    #[serde(default)]
    pub effects: BeatEffects,
}

impl StoryBeat {
    pub fn new(id: impl Into<String>, act: u8) -> Self {
        Self {
            id: id.into(),
            act,
            conditions: BeatConditions::default(),
            lines: Vec::new(),
            effects: BeatEffects::default(),
        }
    }

    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn with_conditions(mut self, conditions: BeatConditions) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_effects(mut self, effects: BeatEffects) -> Self {
        self.effects = effects;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beat_deserializes_with_defaults() {
        let json = r#"{ "id": "first-words", "act": 1, "lines": ["...hello?"] }"#;
        let beat: StoryBeat = serde_json::from_str(json).unwrap();

        assert_eq!(beat.act, 1);
        assert!(beat.conditions.required_flags.is_empty());
        assert_eq!(beat.effects.trust_delta, 0.0);
    }
}
