//! Act IV: the final choice.
//!
//! A two-state machine. While `AwaitingFinalChoice`, the first of
//! accept/resist/transcend only narrates the choice ahead and moves the act
//! to `Active`. From then on each verb counts and records its pattern, until
//! the three counters together reach the configured minimum.

use tracing::info;

use city_rules::{
    ActStage, ChoicePattern, ResolutionPhase, ResolutionProgress, StoryFlag, Verb,
};

use super::{store_stage, ActContext};
use crate::response::Response;

const FINAL_CHOICE: &str = "The city gathers itself into a single question and places it in front of you. \
    Accept what it has become. Resist it. Or go somewhere neither of you has been. \
    Choose as many times as you need; it is listening to all of them.";

pub(super) fn handle(
    verb: Verb,
    mut progress: ResolutionProgress,
    final_choice_minimum: u32,
    ctx: &mut ActContext<'_>,
) -> Response {
    if progress.phase == ResolutionPhase::AwaitingFinalChoice {
        progress.phase = ResolutionPhase::Active;
        store_stage(ctx.state, ActStage::Resolution(progress));
        return Response::new(FINAL_CHOICE).with_feedback().advancing_scene();
    }

    let mut response = match verb {
        Verb::Accept => {
            progress.accepted = progress.accepted.saturating_add(1);
            Response::new("You accept the city as it is. It exhales through every vent at once.")
                .with_choice(ChoicePattern::Story)
        }
        Verb::Resist => {
            progress.resisted = progress.resisted.saturating_add(1);
            Response::new("You resist. The city flinches, then steadies, and holds its ground.")
                .with_choice(ChoicePattern::Control)
        }
        Verb::Transcend => {
            progress.transcended = progress.transcended.saturating_add(1);
            Response::new(
                "The grid dissolves into light. For a moment the city is everywhere, \
                 and so are you.",
            )
            .with_choice(ChoicePattern::Autonomy)
            .with_flag(StoryFlag::CityTranscended)
        }
        _ => return super::wrong_command(ctx.state, ctx.rng),
    };

    if progress.total() >= final_choice_minimum && !ctx.state.flag(StoryFlag::FinalChoiceMade) {
        info!(
            accepted = progress.accepted,
            resisted = progress.resisted,
            transcended = progress.transcended,
            "Final choice made"
        );
        response = response.with_flag(StoryFlag::FinalChoiceMade).as_final_choice();
        if progress.all_explored() {
            response = response.with_flag(StoryFlag::FormedNewPattern);
        }
    }

    store_stage(ctx.state, ActStage::Resolution(progress));
    response.with_feedback()
}
