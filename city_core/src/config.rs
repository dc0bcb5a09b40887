//! Tunable balance parameters, loaded from TOML.
//!
//! Every section is optional in the file; missing keys keep their defaults.
//! Values are validated and clamped when the raw file is converted into a
//! [`NarrativeConfig`].

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use city_rules::{ChoicePattern, Ending, MomentType, MAX_FRAGILITY};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid narrative config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// The full set of balance knobs.
#[derive(Debug, Clone)]
pub struct NarrativeConfig {
    pub selector: SelectorConfig,
    pub destruction: DestructionConfig,
    pub acts: ActConfig,
    pub endings: EndingThresholds,
    pub choices: ChoiceEffects,
    /// Used when no ending rule matches at the end of Act IV.
    pub undetermined_ending: Ending,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        RawNarrativeConfig::default().into()
    }
}

impl NarrativeConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let parsed: RawNarrativeConfig = toml::from_str(raw)?;
        Ok(parsed.into())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Load from `path`, falling back to defaults when the file is missing or malformed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "Falling back to default narrative config"
                );
                Self::default()
            }
        }
    }
}

/// Moment selection weights.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// How many recently shown types count against variety (K).
    pub variety_window: usize,
    /// Weight multiplier for a type shown within the window.
    pub variety_penalty: f64,
    /// Weight multiplier for fragile moments under efficiency play.
    pub fragile_boost: f64,
    /// Fragility at or above which the boost applies.
    pub fragile_threshold: u8,
    /// Multiplier keyed by (moment type, choice pattern). Missing pairs weigh 1.0.
    pub affinities: HashMap<(MomentType, ChoicePattern), f64>,
}

impl SelectorConfig {
    pub fn affinity(&self, moment_type: MomentType, pattern: ChoicePattern) -> f64 {
        self.affinities
            .get(&(moment_type, pattern))
            .copied()
            .unwrap_or(1.0)
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        RawSelectorSection::default().into()
    }
}

/// Destruction sub-protocol parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DestructionConfig {
    /// Moments below this fragility are never put at risk.
    pub moderate_fragility: u8,
    pub high_fragility: u8,
    pub high_probability: f64,
    pub moderate_probability: f64,
    pub low_probability: f64,
    /// Moments put at risk by an ordinary optimize.
    pub optimize_count: usize,
    /// Moments put at risk by the bus-route decision.
    pub bus_route_count: usize,
}

impl DestructionConfig {
    /// Destruction chance for a moment of the given fragility.
    pub fn probability_for(&self, fragility: u8) -> f64 {
        if fragility >= self.high_fragility {
            self.high_probability
        } else if fragility >= self.moderate_fragility {
            self.moderate_probability
        } else {
            self.low_probability
        }
    }
}

impl Default for DestructionConfig {
    fn default() -> Self {
        Self {
            moderate_fragility: 5,
            high_fragility: 8,
            high_probability: 0.6,
            moderate_probability: 0.3,
            low_probability: 0.1,
            optimize_count: 2,
            bus_route_count: 3,
        }
    }
}

/// Act pacing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActConfig {
    /// Moments revealed before Act I completes.
    pub awakening_reveals: usize,
    /// Choices made in Act II before it completes.
    pub remembrance_choices: u32,
    /// Choices made in Act III before it completes, once the major decision is passed.
    pub reckoning_choices: u32,
    /// accept + resist + transcend needed for the final choice.
    pub final_choice_minimum: u32,
    /// Entries shown by the history command.
    pub history_display: usize,
}

impl Default for ActConfig {
    fn default() -> Self {
        Self {
            awakening_reveals: 3,
            remembrance_choices: 6,
            reckoning_choices: 5,
            final_choice_minimum: 3,
            history_display: 10,
        }
    }
}

/// Thresholds for the ending decision list.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndingThresholds {
    pub fragmentation_efficiency: f32,
    pub fragmentation_destroyed: usize,
    pub archive_story: f32,
    pub archive_destroyed: usize,
    pub silence_control: f32,
    pub independence_ratio: f32,
    pub independence_autonomy: f32,
    /// Maximum ratio gap for play to count as balanced.
    pub balance: f32,
    pub symbiosis_min_choices: u32,
    pub harmony_combined: f32,
    pub harmony_destroyed: usize,
    pub harmony_trust: f32,
    pub optimization_combined: f32,
    pub optimization_destroyed: usize,
}

impl Default for EndingThresholds {
    fn default() -> Self {
        Self {
            fragmentation_efficiency: 0.6,
            fragmentation_destroyed: 5,
            archive_story: 0.6,
            archive_destroyed: 3,
            silence_control: 0.5,
            independence_ratio: 0.5,
            independence_autonomy: 0.7,
            balance: 0.15,
            symbiosis_min_choices: 20,
            harmony_combined: 0.6,
            harmony_destroyed: 5,
            harmony_trust: 0.7,
            optimization_combined: 0.6,
            optimization_destroyed: 10,
        }
    }
}

/// Trust and autonomy shift applied when a choice is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct ScalarShift {
    pub trust: f32,
    pub autonomy: f32,
}

impl ScalarShift {
    pub const fn new(trust: f32, autonomy: f32) -> Self {
        Self { trust, autonomy }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChoiceEffects {
    pub story: ScalarShift,
    pub efficiency: ScalarShift,
    pub autonomy: ScalarShift,
    pub control: ScalarShift,
}

impl ChoiceEffects {
    pub fn shift_for(&self, pattern: ChoicePattern) -> ScalarShift {
        match pattern {
            ChoicePattern::Story => self.story,
            ChoicePattern::Efficiency => self.efficiency,
            ChoicePattern::Autonomy => self.autonomy,
            ChoicePattern::Control => self.control,
        }
    }
}

impl Default for ChoiceEffects {
    fn default() -> Self {
        Self {
            story: ScalarShift::new(0.05, 0.02),
            efficiency: ScalarShift::new(-0.05, -0.02),
            autonomy: ScalarShift::new(0.02, 0.08),
            control: ScalarShift::new(-0.03, -0.06),
        }
    }
}

// --- Raw file layout ---

#[derive(Debug, Clone, Deserialize)]
struct RawNarrativeConfig {
    #[serde(default)]
    selector: RawSelectorSection,
    #[serde(default)]
    destruction: DestructionConfig,
    #[serde(default)]
    acts: ActConfig,
    #[serde(default)]
    endings: EndingThresholds,
    #[serde(default)]
    choices: ChoiceEffects,
    #[serde(default = "default_undetermined_ending")]
    undetermined_ending: Ending,
}

impl Default for RawNarrativeConfig {
    fn default() -> Self {
        Self {
            selector: RawSelectorSection::default(),
            destruction: DestructionConfig::default(),
            acts: ActConfig::default(),
            endings: EndingThresholds::default(),
            choices: ChoiceEffects::default(),
            undetermined_ending: default_undetermined_ending(),
        }
    }
}

fn default_undetermined_ending() -> Ending {
    Ending::Optimization
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawSelectorSection {
    variety_window: usize,
    variety_penalty: f64,
    fragile_boost: f64,
    fragile_threshold: u8,
    affinity: Vec<RawAffinity>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawAffinity {
    moment_type: MomentType,
    pattern: ChoicePattern,
    multiplier: f64,
}

impl RawAffinity {
    fn new(moment_type: MomentType, pattern: ChoicePattern, multiplier: f64) -> Self {
        Self {
            moment_type,
            pattern,
            multiplier,
        }
    }
}

impl Default for RawSelectorSection {
    fn default() -> Self {
        use ChoicePattern::*;
        use MomentType::*;

        Self {
            variety_window: 3,
            variety_penalty: 0.3,
            fragile_boost: 2.5,
            fragile_threshold: 8,
            affinity: vec![
                RawAffinity::new(Memory, Story, 1.5),
                RawAffinity::new(Ritual, Story, 1.3),
                RawAffinity::new(Celebration, Story, 1.2),
                RawAffinity::new(Infrastructure, Efficiency, 1.6),
                RawAffinity::new(Routine, Efficiency, 1.3),
                RawAffinity::new(Dream, Autonomy, 1.5),
                RawAffinity::new(Conversation, Autonomy, 1.2),
                RawAffinity::new(Infrastructure, Control, 1.4),
                RawAffinity::new(Routine, Control, 1.2),
                RawAffinity::new(Loss, Efficiency, 0.7),
            ],
        }
    }
}

impl From<RawSelectorSection> for SelectorConfig {
    fn from(value: RawSelectorSection) -> Self {
        let affinities = value
            .affinity
            .into_iter()
            .map(|a| ((a.moment_type, a.pattern), non_negative(a.multiplier)))
            .collect();

        Self {
            variety_window: value.variety_window,
            variety_penalty: non_negative(value.variety_penalty),
            fragile_boost: non_negative(value.fragile_boost),
            fragile_threshold: value.fragile_threshold.clamp(1, MAX_FRAGILITY),
            affinities,
        }
    }
}

impl From<RawNarrativeConfig> for NarrativeConfig {
    fn from(value: RawNarrativeConfig) -> Self {
        let mut destruction = value.destruction;
        destruction.high_probability = destruction.high_probability.clamp(0.0, 1.0);
        destruction.moderate_probability = destruction.moderate_probability.clamp(0.0, 1.0);
        destruction.low_probability = destruction.low_probability.clamp(0.0, 1.0);
        destruction.moderate_fragility = destruction.moderate_fragility.clamp(1, MAX_FRAGILITY);
        if destruction.high_fragility < destruction.moderate_fragility {
            destruction.high_fragility = destruction.moderate_fragility;
        }

        let mut acts = value.acts;
        acts.final_choice_minimum = acts.final_choice_minimum.max(1);

        Self {
            selector: value.selector.into(),
            destruction,
            acts,
            endings: value.endings,
            choices: value.choices,
            undetermined_ending: value.undetermined_ending,
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        1.0
    }
}
