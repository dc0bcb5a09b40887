//! Emergence Engine - declarative rules matched against the city's graph.
//!
//! Each rule fires at most once per city. A rule checks only the conditions
//! it declares; on a match its expansion is applied and the rule name is
//! recorded as emerged.

use std::collections::HashMap;
use tracing::{debug, info};

use city_rules::{City, EmergenceConditions, EmergenceRule, RelationshipDeepening, ThreadId, ThreadType};

#[derive(Debug, Clone, Default)]
pub struct EmergenceEngine {
    rules: Vec<EmergenceRule>,
}

impl EmergenceEngine {
    pub fn new(rules: Vec<EmergenceRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[EmergenceRule] {
        &self.rules
    }

    /// Fire every rule whose conditions now hold.
    ///
    /// Returns the perceptions added by this pass, in rule order. A second
    /// pass over an unchanged city returns nothing and changes nothing.
    pub fn evaluate(&self, city: &mut City) -> Vec<String> {
        let mut perceived = Vec::new();

        for rule in &self.rules {
            if city.has_emerged(&rule.name) {
                continue;
            }
            if !self.conditions_met(&rule.conditions, city) {
                debug!(rule = %rule.name, "Emergence conditions not met");
                continue;
            }

            self.expand(rule, city);
            perceived.extend(rule.expansion.perceptions.iter().cloned());
        }

        perceived
    }

    /// AND of every declared condition. Undeclared conditions always pass.
    pub fn conditions_met(&self, conditions: &EmergenceConditions, city: &City) -> bool {
        if !conditions.required_types.iter().all(|t| city.has_type(*t)) {
            return false;
        }

        if let Some(min) = conditions.min_threads {
            if city.thread_count() < min {
                return false;
            }
        }

        if let Some(min) = conditions.min_complexity {
            if city.complexity() < min {
                return false;
            }
        }

        if let Some(min) = conditions.min_relationship_strength {
            if average_strength(city, &conditions.required_types) < min {
                return false;
            }
        }

        if let Some(min) = conditions.min_integration {
            if average_integration(city, &conditions.required_types) < min {
                return false;
            }
        }

        true
    }

    fn expand(&self, rule: &EmergenceRule, city: &mut City) {
        let expansion = &rule.expansion;

        city.add_complexity(expansion.complexity_delta);
        city.perceive(expansion.perceptions.iter().cloned());

        for deepening in &expansion.deepenings {
            match deepening_pair(city, deepening) {
                Some((from, to)) => {
                    city.deepen(from, to, deepening.bonus);
                }
                None => debug!(
                    rule = %rule.name,
                    from = ?deepening.from,
                    to = ?deepening.to,
                    "No threads to deepen"
                ),
            }
        }

        city.mark_emerged(rule.name.clone());
        info!(
            rule = %rule.name,
            complexity = city.complexity(),
            perceptions = expansion.perceptions.len(),
            "Emergence fired"
        );
    }
}

/// Mean strength of relationships whose two ends both have a required type.
///
/// Zero when there are no such relationships.
fn average_strength(city: &City, required: &[ThreadType]) -> f32 {
    let types: HashMap<ThreadId, ThreadType> =
        city.threads().iter().map(|t| (t.id, t.thread_type)).collect();

    let strengths: Vec<f32> = city
        .threads()
        .iter()
        .filter(|t| required.contains(&t.thread_type))
        .flat_map(|t| t.relationships.iter())
        .filter(|r| types.get(&r.other).map_or(false, |t| required.contains(t)))
        .map(|r| r.strength)
        .collect();

    mean(&strengths)
}

/// Mean integration of threads with a required type. Zero when there are none.
fn average_integration(city: &City, required: &[ThreadType]) -> f32 {
    let integrations: Vec<f32> = city
        .threads()
        .iter()
        .filter(|t| required.contains(&t.thread_type))
        .map(|t| t.integration())
        .collect();

    mean(&integrations)
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f32>() / values.len() as f32
    }
}

/// One concrete thread for each end of a deepening template.
///
/// A same-type template pairs the first two threads of that type.
fn deepening_pair(city: &City, deepening: &RelationshipDeepening) -> Option<(ThreadId, ThreadId)> {
    let from = city.first_of(deepening.from)?.id;
    let to = city
        .threads_of(deepening.to)
        .map(|t| t.id)
        .find(|id| *id != from)?;
    Some((from, to))
}
