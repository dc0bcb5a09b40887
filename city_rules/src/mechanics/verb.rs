//! The closed command vocabulary.

use serde::{Deserialize, Serialize};

/// Every verb the terminal understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    // Act I
    Observe,
    Help,

    // Act II
    Remember,
    Preserve,
    Optimize,

    // Act III
    Decide,
    Question,
    Reflect,

    // Act IV
    Accept,
    Resist,
    Transcend,

    // Meta
    Status,
    Moments,
    History,
}

impl Verb {
    /// Verbs that work in every act regardless of unlock state.
    pub const META: [Verb; 4] = [Verb::Status, Verb::Moments, Verb::History, Verb::Help];

    /// Canonical command word.
    pub fn name(&self) -> &'static str {
        match self {
            Verb::Observe => "observe",
            Verb::Help => "help",
            Verb::Remember => "remember",
            Verb::Preserve => "preserve",
            Verb::Optimize => "optimize",
            Verb::Decide => "decide",
            Verb::Question => "question",
            Verb::Reflect => "reflect",
            Verb::Accept => "accept",
            Verb::Resist => "resist",
            Verb::Transcend => "transcend",
            Verb::Status => "status",
            Verb::Moments => "moments",
            Verb::History => "history",
        }
    }

    /// Resolve a command word or one of its aliases (case-insensitive).
    pub fn from_word(word: &str) -> Option<Verb> {
        let verb = match word.to_ascii_lowercase().as_str() {
            "observe" | "look" | "watch" | "see" | "l" => Verb::Observe,
            "help" | "?" | "h" | "commands" => Verb::Help,
            "remember" | "recall" | "keep" => Verb::Remember,
            "preserve" | "protect" | "save" => Verb::Preserve,
            "optimize" | "optimise" | "streamline" | "improve" => Verb::Optimize,
            "decide" | "choose" | "rule" => Verb::Decide,
            "question" | "ask" | "why" => Verb::Question,
            "reflect" | "ponder" | "think" => Verb::Reflect,
            "accept" | "agree" | "yes" => Verb::Accept,
            "resist" | "refuse" | "no" => Verb::Resist,
            "transcend" | "ascend" | "evolve" => Verb::Transcend,
            "status" | "stats" | "st" => Verb::Status,
            "moments" | "memories" | "m" => Verb::Moments,
            "history" | "log" => Verb::History,
            _ => return None,
        };
        Some(verb)
    }

    pub fn is_meta(&self) -> bool {
        Self::META.contains(self)
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_resolve() {
        assert_eq!(Verb::from_word("look"), Some(Verb::Observe));
        assert_eq!(Verb::from_word("RECALL"), Some(Verb::Remember));
        assert_eq!(Verb::from_word("?"), Some(Verb::Help));
        assert_eq!(Verb::from_word("ascend"), Some(Verb::Transcend));
        assert_eq!(Verb::from_word("dance"), None);
    }

    #[test]
    fn test_canonical_names_round_trip() {
        for verb in [Verb::Observe, Verb::Optimize, Verb::Reflect, Verb::Resist, Verb::History] {
            assert_eq!(Verb::from_word(verb.name()), Some(verb));
        }
    }

    #[test]
    fn test_meta_verbs() {
        assert!(Verb::Status.is_meta());
        assert!(Verb::Help.is_meta());
        assert!(!Verb::Observe.is_meta());
    }
}
