//! Act II: what the city keeps, and what it spends.

use city_rules::{
    ActStage, ChoicePattern, DecisionGate, MomentId, RemembranceProgress, StoryFlag, TextContext,
    Verb,
};

use super::{store_stage, ActContext};
use crate::command::Argument;
use crate::response::Response;
use crate::selector::SelectionRequest;

pub(super) fn handle(
    verb: Verb,
    argument: &Argument,
    mut progress: RemembranceProgress,
    ctx: &mut ActContext<'_>,
) -> Response {
    let response = match verb {
        Verb::Remember => match argument {
            Argument::MomentId(id) => remember_known(id, ctx),
            _ => remember_new(ctx),
        },
        Verb::Preserve => preserve(argument, ctx),
        Verb::Optimize => optimize(&mut progress, ctx),
        _ => return super::wrong_command(ctx.state, ctx.rng),
    };

    if response.choice_pattern.is_some() {
        progress.choices = progress.choices.saturating_add(1);
    }
    store_stage(ctx.state, ActStage::Remembrance(progress));
    response
}

fn remember_known(id: &MomentId, ctx: &mut ActContext<'_>) -> Response {
    let Some(moment) = ctx.library.get(id) else {
        return Response::error(format!(
            "The city searches for \"{}\" and finds no such moment.",
            id
        ));
    };

    if moment.destroyed {
        return Response::error("That moment is gone. There is nothing left to remember.");
    }
    if !moment.revealed {
        return Response::error("You cannot remember what you have not yet seen.");
    }
    if moment.remembered {
        return Response::new("The city already holds that one close.");
    }

    let text = moment.text(TextContext::Remembered).to_string();
    ctx.library.remember(id);
    ctx.state.remember_moment(id.clone());

    Response::new(text)
        .with_choice(ChoicePattern::Story)
        .with_feedback()
}

fn remember_new(ctx: &mut ActContext<'_>) -> Response {
    let request = SelectionRequest::for_act(ctx.state.act()).with_pattern(ChoicePattern::Story);

    let Some(moment) = ctx.selector.select_moment(ctx.library, &request, ctx.rng) else {
        return Response::new("You reach for something new. The city has nothing more to offer yet.");
    };

    let id = moment.id.clone();
    let text = moment.text(TextContext::Remembered).to_string();

    ctx.library.reveal(&id);
    ctx.library.remember(&id);
    ctx.state.reveal_moment(id.clone());
    ctx.state.remember_moment(id.clone());

    Response::new(text)
        .with_revealed(id)
        .with_choice(ChoicePattern::Story)
        .with_feedback()
        .advancing_scene()
}

/// Shield every seen, intact moment in a district from later destruction.
fn preserve(argument: &Argument, ctx: &mut ActContext<'_>) -> Response {
    let Argument::District(district) = argument else {
        return Response::error("Preserve which district? Name one from 1 to 9.");
    };

    let ids: Vec<MomentId> = ctx
        .library
        .find(|m| m.district == *district && m.revealed && !m.destroyed && !m.remembered)
        .into_iter()
        .map(|m| m.id.clone())
        .collect();

    if ids.is_empty() {
        return Response::new(format!(
            "District {} has nothing you have seen that still needs protecting.",
            district
        ));
    }

    for id in &ids {
        ctx.library.remember(id);
        ctx.state.remember_moment(id.clone());
    }

    Response::new(format!(
        "You draw a line around district {}. {} {} will be kept exactly as {}.",
        district,
        ids.len(),
        if ids.len() == 1 { "moment" } else { "moments" },
        if ids.len() == 1 { "it is" } else { "they are" },
    ))
    .with_choice(ChoicePattern::Control)
}

fn optimize(progress: &mut RemembranceProgress, ctx: &mut ActContext<'_>) -> Response {
    let bus_route = !progress.bus_route.is_passed();
    let count = if bus_route {
        ctx.selector.destruction().bus_route_count
    } else {
        ctx.selector.destruction().optimize_count
    };

    let destroyed =
        ctx.selector
            .apply_efficiency_consequences(ctx.library, ctx.state, count, ctx.rng);

    let mut response = Response::new(if bus_route {
        "You redraw the bus routes. The new lines are faster, cleaner, shorter. \
         Some stops simply stop existing."
    } else {
        "Traffic flows more smoothly. The city runs a little faster."
    })
    .with_choice(ChoicePattern::Efficiency)
    .with_feedback();

    if bus_route {
        progress.bus_route = DecisionGate::Passed;
        response = response.with_flag(StoryFlag::BusRouteDecided).advancing_scene();
    }

    for id in &destroyed {
        if let Some(moment) = ctx.library.get(id) {
            response.push_paragraph(moment.text(TextContext::Destroyed));
        }
    }
    if destroyed.is_empty() {
        response.push_paragraph("Nothing you have seen was lost. This time.");
    }

    response
}
