//! Narrative mechanics: choice patterns, story flags, command verbs, endings.

mod ending;
mod verb;

pub use ending::*;
pub use verb::*;

use serde::{Deserialize, Serialize};

/// The narrative-consequence tag carried by a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoicePattern {
    /// Keeping the city's stories alive.
    Story,
    /// Trading memory for throughput.
    Efficiency,
    /// Letting the city decide for itself.
    Autonomy,
    /// Deciding on the city's behalf.
    Control,
}

impl ChoicePattern {
    pub const ALL: [ChoicePattern; 4] = [
        ChoicePattern::Story,
        ChoicePattern::Efficiency,
        ChoicePattern::Autonomy,
        ChoicePattern::Control,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ChoicePattern::Story => "story",
            ChoicePattern::Efficiency => "efficiency",
            ChoicePattern::Autonomy => "autonomy",
            ChoicePattern::Control => "control",
        }
    }
}

impl std::fmt::Display for ChoicePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Boolean story flags the acts set and the ending classifier reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryFlag {
    /// The first optimize in Act II went through the bus-route decision.
    BusRouteDecided,
    /// Act III's major decision narration has been shown.
    MajorDecisionMade,
    /// The operator overrode the city's own requests.
    IgnoredCityRequests,
    /// The operator sat with an unresolved question instead of settling it.
    AcceptedAmbiguity,
    /// The city was asked what it is.
    QuestionedOwnNature,
    /// The operator chose transcendence in the final act.
    CityTranscended,
    /// The final choice drew on accept, resist and transcend alike.
    FormedNewPattern,
    /// Act IV's final choice threshold was reached.
    FinalChoiceMade,
}

impl StoryFlag {
    pub fn name(&self) -> &'static str {
        match self {
            StoryFlag::BusRouteDecided => "bus_route_decided",
            StoryFlag::MajorDecisionMade => "major_decision_made",
            StoryFlag::IgnoredCityRequests => "ignored_city_requests",
            StoryFlag::AcceptedAmbiguity => "accepted_ambiguity",
            StoryFlag::QuestionedOwnNature => "questioned_own_nature",
            StoryFlag::CityTranscended => "city_transcended",
            StoryFlag::FormedNewPattern => "formed_new_pattern",
            StoryFlag::FinalChoiceMade => "final_choice_made",
        }
    }
}

impl std::fmt::Display for StoryFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
