//! Terminal input parsing.
//!
//! One line of text becomes a [`Command`]: a verb from the closed vocabulary
//! plus an optional argument. Anything unrecognised becomes
//! [`Command::Unknown`]; parsing never fails.

use serde::{Deserialize, Serialize};

use city_rules::{MomentId, MomentType, Verb, MAX_DISTRICT};

/// A classified command argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Argument {
    None,
    /// District number 1-9.
    District(u8),
    MomentId(MomentId),
    MomentType(MomentType),
    Text(String),
}

impl Argument {
    pub fn is_none(&self) -> bool {
        matches!(self, Argument::None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Verb { verb: Verb, argument: Argument },
    /// Input that does not start with a known verb. Holds the trimmed input.
    Unknown(String),
}

impl Command {
    /// Parse a single line of operator input.
    pub fn parse(input: &str) -> Command {
        let trimmed = input.trim();
        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let word = parts.next().unwrap_or_default();
        let rest = parts.next().map(str::trim).unwrap_or_default();

        match Verb::from_word(word) {
            Some(verb) => Command::Verb {
                verb,
                argument: classify_argument(verb, rest),
            },
            None => Command::Unknown(trimmed.to_string()),
        }
    }

    pub fn verb(&self) -> Option<Verb> {
        match self {
            Command::Verb { verb, .. } => Some(*verb),
            Command::Unknown(_) => None,
        }
    }
}

fn classify_argument(verb: Verb, raw: &str) -> Argument {
    if raw.is_empty() {
        return Argument::None;
    }

    // Moment ids may look like district numbers.
    if verb == Verb::Remember {
        return Argument::MomentId(MomentId::new(raw));
    }

    if let Some(district) = parse_district(raw) {
        return Argument::District(district);
    }

    match verb {
        Verb::Observe => MomentType::from_name(raw)
            .map(Argument::MomentType)
            .unwrap_or_else(|| Argument::Text(raw.to_string())),
        _ => Argument::Text(raw.to_string()),
    }
}

/// Accepts "3" or "district 3"; only 1-9 count as districts.
fn parse_district(raw: &str) -> Option<u8> {
    let lowered = raw.to_ascii_lowercase();
    let number = lowered
        .strip_prefix("district")
        .map(str::trim)
        .unwrap_or(lowered.as_str());
    let district: u8 = number.parse().ok()?;
    (1..=MAX_DISTRICT).contains(&district).then_some(district)
}
