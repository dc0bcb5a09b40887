//! Narrative moments - the atomic content fragments the operator uncovers.

mod library;
mod moment;

pub use library::*;
pub use moment::*;

use serde::{Deserialize, Serialize};

/// Identifier of a moment as authored in the content store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MomentId(pub String);

impl MomentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MomentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for MomentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content categories a moment can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentType {
    Memory,
    Conversation,
    Ritual,
    Routine,
    Infrastructure,
    Dream,
    Loss,
    Celebration,
}

impl MomentType {
    pub const ALL: [MomentType; 8] = [
        MomentType::Memory,
        MomentType::Conversation,
        MomentType::Ritual,
        MomentType::Routine,
        MomentType::Infrastructure,
        MomentType::Dream,
        MomentType::Loss,
        MomentType::Celebration,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MomentType::Memory => "memory",
            MomentType::Conversation => "conversation",
            MomentType::Ritual => "ritual",
            MomentType::Routine => "routine",
            MomentType::Infrastructure => "infrastructure",
            MomentType::Dream => "dream",
            MomentType::Loss => "loss",
            MomentType::Celebration => "celebration",
        }
    }

    /// Parse a type name, accepting simple plurals ("memories", "rituals").
    pub fn from_name(name: &str) -> Option<MomentType> {
        let lowered = name.trim().to_ascii_lowercase();
        let singular = match lowered.as_str() {
            "memories" => "memory",
            "losses" => "loss",
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|t| t.name() == singular)
            .or_else(|| {
                let stripped = singular.strip_suffix('s')?;
                Self::ALL.into_iter().find(|t| t.name() == stripped)
            })
    }
}

impl std::fmt::Display for MomentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The situation a moment's text is being rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextContext {
    /// First time the operator sees the moment.
    Observed,
    /// The operator chose to hold on to it.
    Remembered,
    /// The moment was lost to optimisation.
    Destroyed,
    /// Recalled during Act III reflection.
    Reflected,
}
