//! In-voice replies for commands the city will not act on yet.

use city_rules::ProgressionState;

use crate::random::RandomSource;
use crate::response::Response;

const NASCENT: &[&str] = &[
    "The word falls into the streets and does not echo. The city is still learning what words are.",
    "Somewhere a traffic light blinks, confused. It does not know that command yet.",
    "The city turns the sound over like a stone. Not yet.",
];

const WARM: &[&str] = &[
    "The city hums, almost apologetic. \"Not now. Stay with me here a little longer.\"",
    "Windows brighten along the avenue. It wants to do what you ask. It cannot, yet.",
    "\"I trust you,\" the city seems to say, \"but that is not where we are.\"",
];

const WILLFUL: &[&str] = &[
    "The city hears you and chooses not to listen.",
    "A tram changes lines without being asked. The city has its own plans for this moment.",
    "\"No,\" says every loudspeaker at once. Then silence.",
];

const GUARDED: &[&str] = &[
    "Shutters close along the block. The city does not recognise that request from you.",
    "The city waits, cautious. That is not something it will do here.",
    "Static on the municipal channel. The request is logged and ignored.",
];

/// Flavor text for a locked or out-of-grammar command.
///
/// The register depends on the act and on the city's trust and autonomy;
/// the line within a register is drawn from `rng`. Never an error.
pub fn wrong_command(state: &ProgressionState, rng: &mut dyn RandomSource) -> Response {
    let lines = if state.act() == 1 {
        NASCENT
    } else if state.trust() >= 0.6 {
        WARM
    } else if state.autonomy() >= 0.6 {
        WILLFUL
    } else {
        GUARDED
    };

    Response::new(lines[rng.next_index(lines.len())])
}
