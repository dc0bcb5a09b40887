//! Narrative engine - the façade that processes one command at a time.
//!
//! Processing a command works as follows:
//! 1. **Parse**: raw input becomes a verb and argument, or an unknown command
//! 2. **Meta**: status/moments/history/help answer immediately, in any act
//! 3. **Gate**: after the ending, or for locked verbs, reply in voice and stop
//! 4. **Act**: the current act handles the verb
//! 5. **Apply**: choices, trust/autonomy shifts, flags, unlocks and scenes
//! 6. **Transition**: a completed act hands over to the next, or the story ends
//! 7. **Beats**: at most one authored beat plays
//! 8. **Emergence**: the city's graph is checked for new properties

mod meta;

use tracing::{debug, info, warn};

use city_rules::{
    ActStage, City, Ending, HistoryEntry, MomentLibrary, ProgressionState, Verb,
};

use crate::acts::{wrong_command, ActContext, ActController};
use crate::beats::BeatDirector;
use crate::command::Command;
use crate::config::NarrativeConfig;
use crate::content::ContentStore;
use crate::emergence::EmergenceEngine;
use crate::endings::{EndingClassifier, EndingInputs};
use crate::persistence::ProgressStore;
use crate::random::RandomSource;
use crate::response::Response;
use crate::selector::MomentSelector;

/// Commands available before anything has been unlocked.
pub const INITIAL_COMMANDS: [Verb; 5] = [
    Verb::Observe,
    Verb::Help,
    Verb::Status,
    Verb::Moments,
    Verb::History,
];

pub struct NarrativeEngine {
    config: NarrativeConfig,
    state: ProgressionState,
    library: MomentLibrary,
    selector: MomentSelector,
    controller: ActController,
    classifier: EndingClassifier,
    emergence: EmergenceEngine,
    beats: BeatDirector,
    city: City,
    rng: Box<dyn RandomSource>,
}

impl NarrativeEngine {
    /// Build an engine over the given content with a fresh playthrough.
    pub fn new(
        config: NarrativeConfig,
        content: &dyn ContentStore,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let library = MomentLibrary::from_moments(content.moments());
        let emergence = EmergenceEngine::new(content.emergence_rules());
        let beats = BeatDirector::new(content.story_beats());

        info!(
            moments = library.len(),
            emergence_rules = emergence.rules().len(),
            story_beats = beats.beats().len(),
            "Narrative engine ready"
        );

        Self {
            selector: MomentSelector::new(config.selector.clone(), config.destruction.clone()),
            controller: ActController::new(config.acts.clone()),
            classifier: EndingClassifier::new(config.endings.clone()),
            state: initial_state(),
            library,
            emergence,
            beats,
            city: City::new(),
            rng,
            config,
        }
    }

    /// Supply the city whose graph the emergence rules watch.
    pub fn with_city(mut self, city: City) -> Self {
        self.city = city;
        self
    }

    pub fn config(&self) -> &NarrativeConfig {
        &self.config
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn library(&self) -> &MomentLibrary {
        &self.library
    }

    pub fn city(&self) -> &City {
        &self.city
    }

    /// The city graph, for embedders that grow it between commands.
    pub fn city_mut(&mut self) -> &mut City {
        &mut self.city
    }

    pub fn ending(&self) -> Option<Ending> {
        self.state.ending()
    }

    pub fn is_finished(&self) -> bool {
        self.state.ending().is_some()
    }

    /// Process one line of operator input. Always yields exactly one response.
    pub fn process(&mut self, input: &str) -> Response {
        let (verb, argument) = match Command::parse(input) {
            Command::Verb { verb, argument } => (verb, argument),
            Command::Unknown(raw) if raw.is_empty() => {
                return Response::error("The city waits for you to say something.");
            }
            Command::Unknown(raw) => {
                debug!(input = %raw, "Unknown command");
                return Response::error(format!(
                    "\"{}\" means nothing to the city. Type help to see what it understands.",
                    raw
                ));
            }
        };

        if verb.is_meta() {
            return self.meta(verb);
        }

        if let Some(ending) = self.state.ending() {
            return Response::new(ending_text(ending));
        }

        if !self.state.is_unlocked(verb) {
            debug!(verb = %verb, act = self.state.act(), "Locked command");
            return wrong_command(&self.state, self.rng.as_mut());
        }

        let mut ctx = ActContext {
            state: &mut self.state,
            library: &mut self.library,
            selector: &mut self.selector,
            rng: self.rng.as_mut(),
        };
        let mut response = self.controller.handle(verb, &argument, &mut ctx);

        if response.is_error {
            return response;
        }

        self.apply(verb, &response);
        self.transition(&mut response);

        if let Some(beat) = self.beats.fire(&mut self.state) {
            for line in &beat.lines {
                response.push_paragraph(line);
            }
        }

        for perception in self.emergence.evaluate(&mut self.city) {
            response.push_paragraph(&perception);
        }

        response
    }

    /// Persist the current progression. Failures are logged, never raised.
    pub fn save(&self, store: &mut dyn ProgressStore) -> bool {
        match store.save(&self.state) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "Save failed; progress kept in memory");
                false
            }
        }
    }

    /// Replace the current progression with a saved one.
    ///
    /// Returns false when there is no save or it cannot be read, in which
    /// case the current progression is kept.
    pub fn restore(&mut self, store: &dyn ProgressStore) -> bool {
        match store.load() {
            Ok(Some(state)) => {
                self.library
                    .sync_lifecycle(state.revealed(), state.remembered(), state.destroyed());
                self.state = state;
                self.selector.reset_recency();
                info!(act = self.state.act(), scene = self.state.scene(), "Progress restored");
                true
            }
            Ok(None) => false,
            Err(err) => {
                warn!(error = %err, "Restore failed; keeping current progress");
                false
            }
        }
    }

    /// Start over with the same content.
    pub fn reset(&mut self) {
        self.state = initial_state();
        self.library.reset_lifecycle();
        self.selector.reset_recency();
        info!("Playthrough reset");
    }

    fn apply(&mut self, verb: Verb, response: &Response) {
        if let Some(pattern) = response.choice_pattern {
            let shift = self.config.choices.shift_for(pattern);
            self.state.record_choice(pattern);
            self.state.adjust_trust(shift.trust);
            self.state.adjust_autonomy(shift.autonomy);
        }

        self.state.push_history(HistoryEntry {
            act: self.state.act(),
            scene: self.state.scene(),
            verb,
            pattern: response.choice_pattern,
        });

        for (flag, value) in &response.flags_to_set {
            self.state.set_flag(*flag, *value);
        }
        for verb in &response.commands_to_unlock {
            self.state.unlock(*verb);
        }
        if response.advance_scene {
            self.state.advance_scene();
        }
    }

    fn transition(&mut self, response: &mut Response) {
        if !self.controller.is_complete(&self.state, &self.library) {
            return;
        }

        let finished: ActStage = *self.state.stage();
        if finished.is_final() {
            self.resolve_ending(response);
            return;
        }

        let unlocks = ActController::commands_to_unlock(&finished);
        for verb in unlocks {
            self.state.unlock(*verb);
        }

        match self.state.advance_act() {
            Ok(act) => {
                self.selector.reset_recency();
                self.state.advance_scene();
                info!(from = finished.number(), to = act, "Act complete");
                response.push_paragraph(ActController::introduction(self.state.stage()));
                response.commands_to_unlock.extend_from_slice(unlocks);
                response.advance_scene = true;
            }
            Err(err) => warn!(error = %err, "Act transition refused"),
        }
    }

    /// Classify once and fix the ending.
    fn resolve_ending(&mut self, response: &mut Response) {
        if self.state.ending().is_some() {
            return;
        }

        let inputs = EndingInputs::from_state(&self.state);
        let ending = match self.classifier.classify(&inputs) {
            Some(ending) => ending,
            None => {
                warn!(
                    fallback = %self.config.undetermined_ending,
                    "No ending rule matched; using fallback"
                );
                self.config.undetermined_ending
            }
        };

        match self.state.set_ending(ending) {
            Ok(()) => {
                info!(
                    ending = %ending,
                    choices = inputs.total_choices,
                    destroyed = inputs.destroyed,
                    "Ending reached"
                );
                response.push_paragraph(&ending_text(ending));
            }
            Err(err) => warn!(error = %err, "Ending already fixed"),
        }
    }
}

fn initial_state() -> ProgressionState {
    let mut state = ProgressionState::new();
    for verb in INITIAL_COMMANDS {
        state.unlock(verb);
    }
    state
}

fn ending_text(ending: Ending) -> String {
    format!("{}\n\n{}", ending.title(), ending.description())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EndingThresholds;
    use crate::content::InMemoryContentStore;
    use crate::persistence::{InMemoryProgressStore, PersistenceError};
    use crate::random::SequenceRandom;
    use city_rules::{
        ChoicePattern, EmergenceRule, Moment, MomentId, MomentType, StoryBeat, StoryFlag,
        TextContext, Thread, ThreadType,
    };

    fn content() -> InMemoryContentStore {
        InMemoryContentStore::new().with_moments([
            Moment::new("lamplighter", MomentType::Routine)
                .in_district(1)
                .with_fragility(3)
                .with_text(TextContext::Observed, "A woman lights lamps that no longer need lighting."),
            Moment::new("choir", MomentType::Ritual).in_district(2).with_fragility(6),
            Moment::new("harbour", MomentType::Memory).in_district(3).with_fragility(9),
            Moment::new("kite", MomentType::Celebration).with_fragility(2),
            Moment::new("tram", MomentType::Infrastructure).in_district(4).with_fragility(7).for_act(2),
            Moment::new("letters", MomentType::Conversation).in_district(5).with_fragility(5).for_act(2),
            Moment::new("orchard", MomentType::Dream).in_district(6).with_fragility(4).for_act(2),
        ])
    }

    fn engine_with(config: NarrativeConfig, content: &InMemoryContentStore) -> NarrativeEngine {
        NarrativeEngine::new(config, content, Box::new(SequenceRandom::constant(0.0)))
    }

    fn engine() -> NarrativeEngine {
        engine_with(NarrativeConfig::default(), &content())
    }

    fn run(engine: &mut NarrativeEngine, inputs: &[&str]) -> Vec<Response> {
        inputs.iter().map(|input| engine.process(input)).collect()
    }

    /// Story-leaning run through all four acts.
    fn archivist_run(engine: &mut NarrativeEngine) -> Response {
        run(engine, &["observe", "observe", "observe"]);
        assert_eq!(engine.state().act(), 2);

        let mut seen: Vec<MomentId> = engine.state().revealed().iter().cloned().collect();
        seen.sort();
        for id in &seen {
            let response = engine.process(&format!("remember {}", id));
            assert_eq!(response.choice_pattern, Some(ChoicePattern::Story));
        }
        run(engine, &["remember", "remember", "remember"]);
        assert_eq!(engine.state().act(), 3);

        run(engine, &["question", "reflect", "reflect", "reflect", "reflect", "reflect"]);
        assert_eq!(engine.state().act(), 4);

        run(engine, &["accept", "accept", "accept"]);
        engine.process("accept")
    }

    #[test]
    fn test_initial_unlocks() {
        let engine = engine();
        for verb in INITIAL_COMMANDS {
            assert!(engine.state().is_unlocked(verb));
        }
        assert!(!engine.state().is_unlocked(Verb::Optimize));
    }

    #[test]
    fn test_locked_command_is_diegetic() {
        let mut engine = engine();

        let response = engine.process("optimize");
        assert!(!response.is_error);
        assert!(response.choice_pattern.is_none());
        assert_eq!(engine.state().total_choices(), 0);
    }

    #[test]
    fn test_unknown_command_is_narrative_error() {
        let mut engine = engine();

        assert!(engine.process("dance wildly").is_error);
        assert!(engine.process("   ").is_error);
        assert_eq!(engine.state().scene(), 0);
    }

    #[test]
    fn test_meta_commands_in_any_act() {
        let mut engine = engine();
        engine.process("observe");

        let status = engine.process("status");
        assert!(status.text.contains("Act I: Awakening"));
        assert!(!status.is_error);

        let moments = engine.process("moments");
        assert!(moments.text.contains("lamplighter"));

        let help = engine.process("help");
        assert!(help.text.contains("observe"));
        assert!(!help.text.contains("optimize"));

        let history = engine.process("history");
        assert!(history.text.contains("observe"));
    }

    #[test]
    fn test_first_act_transition() {
        let mut engine = engine();

        let responses = run(&mut engine, &["observe", "observe", "observe"]);
        let last = responses.last().unwrap();

        assert_eq!(engine.state().act(), 2);
        assert_eq!(last.commands_to_unlock, vec![Verb::Remember, Verb::Preserve, Verb::Optimize]);
        assert!(last.text.contains("The city begins to remember"));
        assert!(engine.state().is_unlocked(Verb::Optimize));
        assert_eq!(engine.selector.recent_types().count(), 0);
    }

    #[test]
    fn test_empty_content_still_reaches_second_act() {
        let mut engine = engine_with(NarrativeConfig::default(), &InMemoryContentStore::new());

        let response = engine.process("observe");

        assert!(!response.is_error);
        assert!(response.revealed_moment.is_none());
        assert_eq!(engine.state().act(), 2);
        assert!(engine.state().is_unlocked(Verb::Remember));
    }

    #[test]
    fn test_thin_content_reaches_second_act() {
        let thin = InMemoryContentStore::new().with_moments([
            Moment::new("lamplighter", MomentType::Routine).in_district(1),
            Moment::new("choir", MomentType::Ritual).in_district(2),
            Moment::new("tram", MomentType::Infrastructure).for_act(2),
        ]);
        let mut engine = engine_with(NarrativeConfig::default(), &thin);

        engine.process("observe");
        assert_eq!(engine.state().act(), 1);

        engine.process("observe");
        assert_eq!(engine.state().act(), 2);
        assert_eq!(engine.state().revealed().len(), 2);
        assert!(engine.state().is_unlocked(Verb::Preserve));
    }

    #[test]
    fn test_remember_moment_with_numeric_id() {
        let numbered = InMemoryContentStore::new().with_moments([
            Moment::new("3", MomentType::Memory).in_district(5),
            Moment::new("lamplighter", MomentType::Routine).in_district(1),
            Moment::new("choir", MomentType::Ritual).in_district(2),
        ]);
        let mut engine = engine_with(NarrativeConfig::default(), &numbered);
        run(&mut engine, &["observe", "observe", "observe"]);
        assert_eq!(engine.state().act(), 2);

        let response = engine.process("remember 3");

        assert!(!response.is_error);
        assert_eq!(response.choice_pattern, Some(ChoicePattern::Story));
        assert!(engine.state().remembered().contains(&MomentId::from("3")));
        assert!(!engine.state().remembered().contains(&MomentId::from("lamplighter")));
    }

    #[test]
    fn test_out_of_act_verb_gets_flavor() {
        let mut engine = engine();
        run(&mut engine, &["observe", "observe", "observe"]);

        let response = engine.process("observe");
        assert!(!response.is_error);
        assert!(response.revealed_moment.is_none());
    }

    #[test]
    fn test_archive_playthrough() {
        let mut engine = engine();

        let last = archivist_run(&mut engine);

        assert!(last.final_choice);
        assert_eq!(engine.ending(), Some(Ending::Archive));
        assert!(last.text.contains(Ending::Archive.title()));
        assert_eq!(engine.state().destroyed_count(), 0);
        assert!(engine.state().flag(StoryFlag::MajorDecisionMade));
        assert!(engine.state().flag(StoryFlag::AcceptedAmbiguity));
        assert!(engine.state().trust() > 0.5);
    }

    #[test]
    fn test_ending_is_fixed_afterwards() {
        let mut engine = engine();
        archivist_run(&mut engine);

        let after = engine.process("transcend");
        assert!(after.text.contains(Ending::Archive.title()));
        assert!(after.choice_pattern.is_none());
        assert_eq!(engine.ending(), Some(Ending::Archive));
        assert!(engine.process("status").text.contains("The Archive"));
    }

    #[test]
    fn test_silence_playthrough() {
        let mut engine = engine();

        run(&mut engine, &["observe", "observe", "observe"]);
        let bus_route = engine.process("optimize");
        assert!(bus_route.sets_flag(StoryFlag::BusRouteDecided));
        run(&mut engine, &["optimize"; 5]);
        assert_eq!(engine.state().act(), 3);

        // The fragile choir and harbour were seen, then lost.
        assert_eq!(engine.state().destroyed_count(), 2);
        assert!(engine.library().get(&MomentId::from("harbour")).unwrap().destroyed);

        run(&mut engine, &["decide", "decide", "decide", "decide", "decide", "decide"]);
        assert_eq!(engine.state().act(), 4);

        run(&mut engine, &["resist", "resist", "resist", "resist"]);

        assert_eq!(engine.ending(), Some(Ending::Silence));
        assert!(engine.state().flag(StoryFlag::IgnoredCityRequests));
        assert!(engine.state().trust() < 0.5);
    }

    #[test]
    fn test_undetermined_ending_fallback() {
        let config = NarrativeConfig {
            endings: EndingThresholds {
                fragmentation_efficiency: 2.0,
                archive_story: 2.0,
                silence_control: 2.0,
                independence_ratio: 2.0,
                balance: 0.0,
                harmony_combined: 3.0,
                optimization_combined: 3.0,
                ..EndingThresholds::default()
            },
            undetermined_ending: Ending::Symbiosis,
            ..NarrativeConfig::default()
        };
        let mut engine = engine_with(config, &content());

        archivist_run(&mut engine);
        assert_eq!(engine.ending(), Some(Ending::Symbiosis));
    }

    #[test]
    fn test_save_and_restore() {
        let content = content();
        let mut engine = engine_with(NarrativeConfig::default(), &content);
        run(&mut engine, &["observe", "observe", "observe", "optimize"]);

        let mut store = InMemoryProgressStore::new();
        assert!(engine.save(&mut store));

        let mut restored = engine_with(NarrativeConfig::default(), &content);
        assert!(restored.restore(&store));

        assert_eq!(restored.state().act(), 2);
        assert_eq!(restored.state().destroyed(), engine.state().destroyed());
        for moment in engine.library().iter() {
            let twin = restored.library().get(&moment.id).unwrap();
            assert_eq!(twin.revealed, moment.revealed, "{}", moment.id);
            assert_eq!(twin.destroyed, moment.destroyed, "{}", moment.id);
        }
    }

    struct BrokenStore;

    impl ProgressStore for BrokenStore {
        fn load(&self) -> Result<Option<ProgressionState>, PersistenceError> {
            Err(PersistenceError::Io {
                path: "nowhere".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk gone"),
            })
        }

        fn save(&mut self, _state: &ProgressionState) -> Result<(), PersistenceError> {
            self.load().map(|_| ())
        }
    }

    #[test]
    fn test_persistence_failures_keep_memory_state() {
        let mut engine = engine();
        engine.process("observe");

        assert!(!engine.save(&mut BrokenStore));
        assert!(!engine.restore(&BrokenStore));
        assert!(!engine.restore(&InMemoryProgressStore::new()));
        assert_eq!(engine.state().revealed().len(), 1);
    }

    #[test]
    fn test_reset() {
        let mut engine = engine();
        run(&mut engine, &["observe", "observe", "observe"]);

        engine.reset();
        assert_eq!(engine.state().act(), 1);
        assert!(engine.state().revealed().is_empty());
        assert!(engine.library().iter().all(|m| !m.revealed));
    }

    #[test]
    fn test_story_beat_plays_once() {
        let content = content().with_story_beats([StoryBeat::new("first-words", 1)
            .with_line("...is someone there?")]);
        let mut engine = engine_with(NarrativeConfig::default(), &content);

        assert!(engine.process("observe").text.contains("is someone there"));
        assert!(!engine.process("observe").text.contains("is someone there"));
    }

    #[test]
    fn test_emergence_surfaces_once() {
        let content = content().with_emergence_rules([EmergenceRule::new("first-light")
            .requiring([ThreadType::Memory])
            .expanding_complexity(0.1)
            .perceiving("The city notices it has a past.")]);
        let mut city = City::new();
        city.weave(Thread::new(ThreadType::Memory));
        let mut engine = engine_with(NarrativeConfig::default(), &content).with_city(city);

        assert!(engine.process("observe").text.contains("has a past"));
        assert!(!engine.process("observe").text.contains("has a past"));
        assert!(engine.city().has_emerged("first-light"));
    }
}
