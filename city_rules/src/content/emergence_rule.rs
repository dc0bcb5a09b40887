//! Declarative emergence rules over the city graph.

use serde::{Deserialize, Serialize};

use crate::city::ThreadType;

/// Conditions a rule declares. Undeclared conditions are not checked.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EmergenceConditions {
    /// Each type must be present at least once.
    #[serde(default)]
    pub required_types: Vec<ThreadType>,
    pub min_threads: Option<usize>,
    pub min_complexity: Option<f32>,
    /// Average strength of relationships between threads of the required types.
    pub min_relationship_strength: Option<f32>,
    /// Average integration of threads of the required types.
    pub min_integration: Option<f32>,
}

/// A pairwise bond to strengthen when the rule fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipDeepening {
    pub from: ThreadType,
    pub to: ThreadType,
    pub bonus: f32,
}

/// What happens to the city when the rule fires.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EmergenceExpansion {
    #[serde(default)]
    pub complexity_delta: f32,
    #[serde(default)]
    pub perceptions: Vec<String>,
    #[serde(default)]
    pub deepenings: Vec<RelationshipDeepening>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergenceRule {
    /// Unique name; a rule fires at most once per city.
    pub name: String,
    #[serde(default)]
    pub conditions: EmergenceConditions,
    #[serde(default)]
    pub expansion: EmergenceExpansion,
}

impl EmergenceRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            conditions: EmergenceConditions::default(),
            expansion: EmergenceExpansion::default(),
        }
    }

    pub fn requiring(mut self, types: impl IntoIterator<Item = ThreadType>) -> Self {
        self.conditions.required_types.extend(types);
        self
    }

    pub fn with_min_threads(mut self, count: usize) -> Self {
        self.conditions.min_threads = Some(count);
        self
    }

    pub fn with_min_complexity(mut self, complexity: f32) -> Self {
        self.conditions.min_complexity = Some(complexity);
        self
    }

    pub fn with_min_relationship_strength(mut self, strength: f32) -> Self {
        self.conditions.min_relationship_strength = Some(strength);
        self
    }

    pub fn with_min_integration(mut self, integration: f32) -> Self {
        self.conditions.min_integration = Some(integration);
        self
    }

    pub fn expanding_complexity(mut self, delta: f32) -> Self {
        self.expansion.complexity_delta = delta;
        self
    }

    pub fn perceiving(mut self, perception: impl Into<String>) -> Self {
        self.expansion.perceptions.push(perception.into());
        self
    }

    pub fn deepening(mut self, from: ThreadType, to: ThreadType, bonus: f32) -> Self {
        self.expansion
            .deepenings
            .push(RelationshipDeepening { from, to, bonus });
        self
    }
}
