//! Act Controller - per-act command routing, unlocks and completion.
//!
//! The current act lives in [`ActStage`], a tagged union carrying each act's
//! private counters. The controller matches it exhaustively and hands the
//! command to that act's handler. Handlers mutate moments and their own stage
//! progress directly; choices, flags, unlocks and scene advances travel back
//! to the engine on the [`Response`].

mod awakening;
mod flavor;
mod reckoning;
mod remembrance;
mod resolution;

pub use flavor::wrong_command;

use tracing::warn;

use city_rules::{ActStage, MomentLibrary, ProgressionState, StoryFlag, Verb};

use crate::command::Argument;
use crate::config::ActConfig;
use crate::random::RandomSource;
use crate::response::Response;
use crate::selector::MomentSelector;

/// Everything an act handler may touch while processing one command.
pub struct ActContext<'a> {
    pub state: &'a mut ProgressionState,
    pub library: &'a mut MomentLibrary,
    pub selector: &'a mut MomentSelector,
    pub rng: &'a mut dyn RandomSource,
}

/// Routes commands to the handler for the current act.
#[derive(Debug, Clone, Default)]
pub struct ActController {
    config: ActConfig,
}

impl ActController {
    pub fn new(config: ActConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ActConfig {
        &self.config
    }

    /// Handle an unlocked, non-meta verb in the current act.
    ///
    /// Verbs outside the act's grammar get wrong-command flavor text.
    pub fn handle(&self, verb: Verb, argument: &Argument, ctx: &mut ActContext<'_>) -> Response {
        let stage = *ctx.state.stage();
        if !Self::available_commands(&stage).contains(&verb) {
            return wrong_command(ctx.state, ctx.rng);
        }

        match stage {
            ActStage::Awakening => awakening::handle(argument, ctx),
            ActStage::Remembrance(progress) => remembrance::handle(verb, argument, progress, ctx),
            ActStage::Reckoning(progress) => reckoning::handle(verb, argument, progress, ctx),
            ActStage::Resolution(progress) => {
                resolution::handle(verb, progress, self.config.final_choice_minimum, ctx)
            }
        }
    }

    /// Whether the current act has met its completion condition.
    ///
    /// Stays true as more choices are recorded. Act I also completes once
    /// the library has nothing left to reveal in it.
    pub fn is_complete(&self, state: &ProgressionState, library: &MomentLibrary) -> bool {
        match state.stage() {
            ActStage::Awakening => {
                state.revealed().len() >= self.config.awakening_reveals
                    || !library
                        .iter()
                        .any(|m| m.act <= state.act() && !m.revealed && !m.destroyed)
            }
            ActStage::Remembrance(progress) => progress.choices >= self.config.remembrance_choices,
            ActStage::Reckoning(progress) => {
                progress.major_decision.is_passed()
                    && progress.choices >= self.config.reckoning_choices
            }
            ActStage::Resolution(_) => state.flag(StoryFlag::FinalChoiceMade),
        }
    }

    /// The act's own grammar.
    pub fn available_commands(stage: &ActStage) -> &'static [Verb] {
        match stage {
            ActStage::Awakening => &[Verb::Observe, Verb::Help],
            ActStage::Remembrance(_) => &[Verb::Remember, Verb::Preserve, Verb::Optimize],
            ActStage::Reckoning(_) => &[Verb::Decide, Verb::Question, Verb::Reflect],
            ActStage::Resolution(_) => &[Verb::Accept, Verb::Resist, Verb::Transcend],
        }
    }

    /// Commands granted when the act completes.
    pub fn commands_to_unlock(stage: &ActStage) -> &'static [Verb] {
        match stage {
            ActStage::Awakening => &[Verb::Remember, Verb::Preserve, Verb::Optimize],
            ActStage::Remembrance(_) => &[Verb::Decide, Verb::Question, Verb::Reflect],
            ActStage::Reckoning(_) => &[Verb::Accept, Verb::Resist, Verb::Transcend],
            ActStage::Resolution(_) => &[],
        }
    }

    /// Opening narration for an act, shown on transition.
    pub fn introduction(stage: &ActStage) -> &'static str {
        match stage {
            ActStage::Awakening => {
                "Something wakes beneath the streets. It does not know what it is. \
                 It only knows that you are watching."
            }
            ActStage::Remembrance(_) => {
                "The city begins to remember. Not everything it remembers will survive \
                 what you decide next. (remember, preserve, optimize)"
            }
            ActStage::Reckoning(_) => {
                "The city has opinions now. It asks you what it should become. \
                 (decide, question, reflect)"
            }
            ActStage::Resolution(_) => {
                "Every thread is pulled tight. There is one choice left, and the city \
                 is waiting for you to make it. (accept, resist, transcend)"
            }
        }
    }
}

/// Write an act's updated progress back into the state.
fn store_stage(state: &mut ProgressionState, stage: ActStage) {
    if let Err(err) = state.update_stage(stage) {
        warn!(error = %err, "Act progress could not be stored");
    }
}
