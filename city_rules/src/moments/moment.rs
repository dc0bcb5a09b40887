//! A single narrative moment.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{MomentId, MomentType, TextContext};

/// Highest fragility value; 1 is the sturdiest.
pub const MAX_FRAGILITY: u8 = 10;

/// Highest district number; district 0 is citywide.
pub const MAX_DISTRICT: u8 = 9;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Moment {
    pub id: MomentId,
    pub moment_type: MomentType,

    /// 0 = citywide, 1-9 = a specific district.
    pub district: u8,

    /// 1-10 vulnerability to destruction under efficiency-oriented play.
    pub fragility: u8,

    /// Earliest act this moment can be shown in.
    pub act: u8,

    #[serde(default)]
    pub texts: HashMap<TextContext, String>,

    #[serde(default)]
    pub revealed: bool,
    #[serde(default)]
    pub destroyed: bool,
    #[serde(default)]
    pub remembered: bool,
}

impl Moment {
    pub fn new(id: impl Into<String>, moment_type: MomentType) -> Self {
        Self {
            id: MomentId::new(id),
            moment_type,
            district: 0,
            fragility: 1,
            act: 1,
            texts: HashMap::new(),
            revealed: false,
            destroyed: false,
            remembered: false,
        }
    }

    /// Set the district (clamped to 0-9).
    pub fn in_district(mut self, district: u8) -> Self {
        self.district = district.min(MAX_DISTRICT);
        self
    }

    /// Set the fragility (clamped to 1-10).
    pub fn with_fragility(mut self, fragility: u8) -> Self {
        self.fragility = fragility.clamp(1, MAX_FRAGILITY);
        self
    }

    /// Set the earliest act (clamped to 1-4).
    pub fn for_act(mut self, act: u8) -> Self {
        self.act = act.clamp(1, 4);
        self
    }

    pub fn with_text(mut self, context: TextContext, text: impl Into<String>) -> Self {
        self.texts.insert(context, text.into());
        self
    }

    /// Clamp fields authored outside the builder back into range.
    pub fn normalized(mut self) -> Self {
        self.district = self.district.min(MAX_DISTRICT);
        self.fragility = self.fragility.clamp(1, MAX_FRAGILITY);
        self.act = self.act.clamp(1, 4);
        self
    }

    /// Text for the given context, falling back to the observed text.
    pub fn text(&self, context: TextContext) -> &str {
        self.texts
            .get(&context)
            .or_else(|| self.texts.get(&TextContext::Observed))
            .map(String::as_str)
            .unwrap_or("A moment the city cannot quite put into words.")
    }

    pub fn is_citywide(&self) -> bool {
        self.district == 0
    }

    /// Still part of the city: revealed or not, but not lost.
    pub fn is_intact(&self) -> bool {
        !self.destroyed
    }

    pub fn reveal(&mut self) {
        self.revealed = true;
    }

    pub fn remember(&mut self) {
        self.remembered = true;
    }

    pub fn destroy(&mut self) {
        self.destroyed = true;
    }
}
