//! Act I: the city learns to see.

use tracing::debug;

use city_rules::TextContext;

use super::ActContext;
use crate::command::Argument;
use crate::response::Response;
use crate::selector::SelectionRequest;

pub(super) fn handle(argument: &Argument, ctx: &mut ActContext<'_>) -> Response {
    let request = SelectionRequest::for_act(ctx.state.act())
        .with_type(match argument {
            Argument::MomentType(moment_type) => Some(*moment_type),
            _ => None,
        })
        .with_district(match argument {
            Argument::District(district) => Some(*district),
            _ => None,
        });

    let Some(moment) = ctx.selector.select_moment(ctx.library, &request, ctx.rng) else {
        return Response::new(
            "You look, and the city looks back. There is nothing here you have not already seen.",
        );
    };

    let id = moment.id.clone();
    let text = moment.text(TextContext::Observed).to_string();

    ctx.library.reveal(&id);
    ctx.state.reveal_moment(id.clone());
    debug!(moment = %id, revealed = ctx.state.revealed().len(), "Observed moment");

    Response::new(text)
        .with_revealed(id)
        .with_feedback()
        .advancing_scene()
}
