//! Threads - typed nodes in the city graph.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub Uuid);

impl ThreadId {
    /// Create a new random thread ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ThreadId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What part of city life a thread carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadType {
    Transit,
    Commerce,
    Memory,
    Culture,
    Infrastructure,
    Nature,
    Community,
    Governance,
}

/// A directed bond from one thread to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub other: ThreadId,
    /// 0.0 - 1.0.
    pub strength: f32,
    pub synergy: f32,
}

impl Relationship {
    pub fn new(other: ThreadId, strength: f32, synergy: f32) -> Self {
        Self {
            other,
            strength: strength.clamp(0.0, 1.0),
            synergy,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    pub thread_type: ThreadType,
    pub coherence: f32,
    pub complexity: f32,
    pub autonomy: f32,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl Thread {
    pub fn new(thread_type: ThreadType) -> Self {
        Self {
            id: ThreadId::new(),
            thread_type,
            coherence: 0.5,
            complexity: 0.5,
            autonomy: 0.0,
            relationships: Vec::new(),
        }
    }

    pub fn with_coherence(mut self, coherence: f32) -> Self {
        self.coherence = coherence.clamp(0.0, 1.0);
        self
    }

    pub fn with_complexity(mut self, complexity: f32) -> Self {
        self.complexity = complexity.clamp(0.0, 1.0);
        self
    }

    pub fn with_autonomy(mut self, autonomy: f32) -> Self {
        self.autonomy = autonomy.clamp(0.0, 1.0);
        self
    }

    /// (coherence + complexity) / 2.
    pub fn integration(&self) -> f32 {
        (self.coherence + self.complexity) / 2.0
    }

    pub fn relationship_with(&self, other: ThreadId) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.other == other)
    }

    /// Insert or replace the edge to `relationship.other`.
    pub fn set_relationship(&mut self, relationship: Relationship) {
        match self
            .relationships
            .iter_mut()
            .find(|r| r.other == relationship.other)
        {
            Some(existing) => *existing = relationship,
            None => self.relationships.push(relationship),
        }
    }

    /// Add `bonus` to the edge toward `other`, creating it if needed.
    pub fn strengthen(&mut self, other: ThreadId, bonus: f32) {
        match self.relationships.iter_mut().find(|r| r.other == other) {
            Some(existing) => existing.strength = (existing.strength + bonus).clamp(0.0, 1.0),
            None => self.relationships.push(Relationship::new(other, bonus, 0.0)),
        }
    }
}
