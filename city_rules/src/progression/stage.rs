//! Act stages - which act the story is in, plus each act's private progress.

use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// A one-time narrative gate inside an act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DecisionGate {
    #[default]
    Pending,
    Passed,
}

impl DecisionGate {
    pub fn is_passed(&self) -> bool {
        matches!(self, DecisionGate::Passed)
    }
}

/// Act II progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RemembranceProgress {
    /// The first optimize is the bus-route decision.
    pub bus_route: DecisionGate,
    /// Choices recorded while in this act.
    pub choices: u32,
}

/// Act III progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReckoningProgress {
    /// The first decide or question is the major decision.
    pub major_decision: DecisionGate,
    pub choices: u32,
}

/// Where the final act is in its own two-state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPhase {
    /// The next accept/resist/transcend only narrates the final choice.
    #[default]
    AwaitingFinalChoice,
    /// Verbs now count toward the final choice.
    Active,
}

/// Act IV progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResolutionProgress {
    pub phase: ResolutionPhase,
    pub accepted: u32,
    pub resisted: u32,
    pub transcended: u32,
}

impl ResolutionProgress {
    pub fn total(&self) -> u32 {
        self.accepted
            .saturating_add(self.resisted)
            .saturating_add(self.transcended)
    }

    /// Every one of the three verbs was used at least once.
    pub fn all_explored(&self) -> bool {
        self.accepted > 0 && self.resisted > 0 && self.transcended > 0
    }
}

/// The current act, carrying that act's private counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "act", rename_all = "snake_case")]
pub enum ActStage {
    /// Act I.
    #[default]
    Awakening,
    /// Act II.
    Remembrance(RemembranceProgress),
    /// Act III.
    Reckoning(ReckoningProgress),
    /// Act IV.
    Resolution(ResolutionProgress),
}

impl ActStage {
    pub const FINAL_ACT: u8 = 4;

    /// Fresh stage for an act number.
    pub fn for_act(act: u8) -> Result<Self, StateError> {
        match act {
            1 => Ok(ActStage::Awakening),
            2 => Ok(ActStage::Remembrance(RemembranceProgress::default())),
            3 => Ok(ActStage::Reckoning(ReckoningProgress::default())),
            4 => Ok(ActStage::Resolution(ResolutionProgress::default())),
            other => Err(StateError::InvalidAct(other)),
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            ActStage::Awakening => 1,
            ActStage::Remembrance(_) => 2,
            ActStage::Reckoning(_) => 3,
            ActStage::Resolution(_) => 4,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ActStage::Awakening => "Act I: Awakening",
            ActStage::Remembrance(_) => "Act II: Remembrance",
            ActStage::Reckoning(_) => "Act III: Reckoning",
            ActStage::Resolution(_) => "Act IV: Resolution",
        }
    }

    /// Fresh stage for the following act, if any.
    pub fn next(&self) -> Option<ActStage> {
        ActStage::for_act(self.number() + 1).ok()
    }

    pub fn is_final(&self) -> bool {
        self.number() == Self::FINAL_ACT
    }
}
