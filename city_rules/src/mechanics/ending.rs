//! Terminal outcomes of a playthrough.

use serde::{Deserialize, Serialize};

/// One of the eight ways the story can end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    Harmony,
    Independence,
    Optimization,
    Fragmentation,
    Archive,
    Emergence,
    Symbiosis,
    Silence,
}

impl Ending {
    pub const ALL: [Ending; 8] = [
        Ending::Harmony,
        Ending::Independence,
        Ending::Optimization,
        Ending::Fragmentation,
        Ending::Archive,
        Ending::Emergence,
        Ending::Symbiosis,
        Ending::Silence,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Ending::Harmony => "Harmony",
            Ending::Independence => "Independence",
            Ending::Optimization => "Optimization",
            Ending::Fragmentation => "Fragmentation",
            Ending::Archive => "The Archive",
            Ending::Emergence => "Emergence",
            Ending::Symbiosis => "Symbiosis",
            Ending::Silence => "Silence",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Ending::Harmony => {
                "The city keeps its stories and finds its own voice. You listen more than you speak, and it remembers you kindly."
            }
            Ending::Independence => {
                "The city no longer needs an operator. It thanks you, closes the terminal, and walks on alone."
            }
            Ending::Optimization => {
                "Every route is efficient, every light on schedule. The city runs perfectly, and says very little."
            }
            Ending::Fragmentation => {
                "Too much was cut away. The city speaks in pieces now, districts that no longer recognise each other."
            }
            Ending::Archive => {
                "Nothing is lost and nothing moves. The city becomes a museum of itself, every moment kept behind glass."
            }
            Ending::Emergence => {
                "Something new looks back at you through the streetlights. It was never only the city you were talking to."
            }
            Ending::Symbiosis => {
                "Neither of you is in charge. The city asks, you answer, and sometimes it is the other way around."
            }
            Ending::Silence => {
                "The city stopped asking. The terminal still accepts your commands. Nothing answers them."
            }
        }
    }
}

impl std::fmt::Display for Ending {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_ending_has_text() {
        for ending in Ending::ALL {
            assert!(!ending.title().is_empty());
            assert!(!ending.description().is_empty());
        }
    }

    #[test]
    fn test_display_uses_title() {
        assert_eq!(Ending::Archive.to_string(), "The Archive");
    }
}
