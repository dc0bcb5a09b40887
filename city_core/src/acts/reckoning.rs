//! Act III: the city starts asking what it should become.

use city_rules::{
    ActStage, ChoicePattern, DecisionGate, Moment, ReckoningProgress, StoryFlag, TextContext, Verb,
};

use super::{store_stage, ActContext};
use crate::command::Argument;
use crate::response::Response;

const MAJOR_DECISION: &str = "The city stops. Every screen on every corner shows the same question: \
    who decides what this place becomes? It is the first time it has asked. \
    Whatever you say next, it will remember.";

pub(super) fn handle(
    verb: Verb,
    argument: &Argument,
    mut progress: ReckoningProgress,
    ctx: &mut ActContext<'_>,
) -> Response {
    let gate_open = matches!(verb, Verb::Decide | Verb::Question);
    if gate_open && !progress.major_decision.is_passed() {
        progress.major_decision = DecisionGate::Passed;
        store_stage(ctx.state, ActStage::Reckoning(progress));
        return Response::new(MAJOR_DECISION)
            .with_flag(StoryFlag::MajorDecisionMade)
            .with_feedback()
            .advancing_scene();
    }

    let response = match verb {
        Verb::Decide => {
            let mut response = Response::new(
                "You decide for it. The city complies, and something in its voice goes quiet.",
            );
            if let Argument::Text(decision) = argument {
                response.push_paragraph(&format!("\"{}.\" It is done.", decision));
            }
            response
                .with_choice(ChoicePattern::Control)
                .with_flag(StoryFlag::IgnoredCityRequests)
        }
        Verb::Question => Response::new(
            "You ask the city what it wants. It takes a long time to answer, \
             and the answer is its own.",
        )
        .with_choice(ChoicePattern::Autonomy)
        .with_flag(StoryFlag::QuestionedOwnNature),
        Verb::Reflect => reflect(ctx),
        _ => return super::wrong_command(ctx.state, ctx.rng),
    };

    progress.choices = progress.choices.saturating_add(1);
    store_stage(ctx.state, ActStage::Reckoning(progress));
    response
}

/// Echo one of the moments the city chose to keep.
fn reflect(ctx: &mut ActContext<'_>) -> Response {
    let kept: Vec<&Moment> = ctx.library.find(|m| m.remembered && !m.destroyed);

    let text = if kept.is_empty() {
        "You reflect together on what has been lost. There is nothing left to hold, \
         and the city accepts that it cannot know everything."
            .to_string()
    } else {
        let moment = kept[ctx.rng.next_index(kept.len())];
        moment.text(TextContext::Reflected).to_string()
    };

    Response::new(text)
        .with_choice(ChoicePattern::Story)
        .with_flag(StoryFlag::AcceptedAmbiguity)
}
