//! Meta-commands: answered in any act, before the act sees the input.

use city_rules::{ChoicePattern, Verb};

use super::NarrativeEngine;
use crate::acts::ActController;
use crate::response::Response;

impl NarrativeEngine {
    pub(super) fn meta(&self, verb: Verb) -> Response {
        let text = match verb {
            Verb::Status => self.status_text(),
            Verb::Moments => self.moments_text(),
            Verb::History => self.history_text(),
            _ => self.help_text(),
        };
        Response::new(text)
    }

    fn status_text(&self) -> String {
        let state = &self.state;
        let choices = state.choices();

        let mut lines = vec![
            format!("{} | scene {}", state.stage().title(), state.scene()),
            format!("Trust {:.2} | Autonomy {:.2}", state.trust(), state.autonomy()),
            format!(
                "Choices: {}",
                ChoicePattern::ALL
                    .iter()
                    .map(|p| format!("{} {}", p, choices.get(*p)))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            format!("Moments lost: {}", state.destroyed_count()),
        ];
        if let Some(ending) = state.ending() {
            lines.push(format!("Ending: {}", ending));
        }
        lines.join("\n")
    }

    fn moments_text(&self) -> String {
        let lines: Vec<String> = self
            .library
            .revealed()
            .map(|m| {
                let marker = if m.destroyed {
                    " [lost]"
                } else if m.remembered {
                    " [kept]"
                } else {
                    ""
                };
                let place = if m.is_citywide() {
                    "citywide".to_string()
                } else {
                    format!("district {}", m.district)
                };
                format!("{} ({}, {}){}", m.id, m.moment_type.name(), place, marker)
            })
            .collect();

        if lines.is_empty() {
            "You have not seen anything of the city yet.".to_string()
        } else {
            lines.join("\n")
        }
    }

    fn history_text(&self) -> String {
        let history = self.state.history();
        let shown = self.config.acts.history_display.min(history.len());

        if shown == 0 {
            return "Nothing has happened yet.".to_string();
        }

        history[history.len() - shown..]
            .iter()
            .map(|entry| {
                let pattern = entry
                    .pattern
                    .map(|p| format!(" ({})", p))
                    .unwrap_or_default();
                format!("Act {}, scene {}: {}{}", entry.act, entry.scene, entry.verb, pattern)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn help_text(&self) -> String {
        let always = Verb::META
            .iter()
            .map(|v| v.name())
            .collect::<Vec<_>>()
            .join(", ");

        if self.state.ending().is_some() {
            return format!("The story has ended. Always available: {}", always);
        }

        let mut now: Vec<Verb> = ActController::available_commands(self.state.stage())
            .iter()
            .copied()
            .filter(|v| !v.is_meta() && self.state.is_unlocked(*v))
            .collect();
        now.sort();

        let now = now.iter().map(|v| v.name()).collect::<Vec<_>>().join(", ");
        format!("Commands you can use now: {}\nAlways available: {}", now, always)
    }
}
