//! The city's relationship graph - threads and the bonds between them.
//!
//! The graph consists of:
//! - **Threads**: typed nodes with coherence, complexity and autonomy scalars
//! - **Relationships**: weighted, directed edges between threads
//! - **Perceptions**: what the city has come to notice about itself

mod thread;

pub use thread::*;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The emergent city. The emergence engine reads it and only ever adds to it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct City {
    threads: Vec<Thread>,

    /// Bounded complexity resource, 0.0 - 1.0.
    complexity: f32,

    perceptions: Vec<String>,

    /// Names of emergence rules that have already fired.
    emerged: HashSet<String>,
}

impl City {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_complexity(mut self, complexity: f32) -> Self {
        self.complexity = complexity.clamp(0.0, 1.0);
        self
    }

    /// Add a thread and return its id.
    pub fn weave(&mut self, thread: Thread) -> ThreadId {
        let id = thread.id;
        self.threads.push(thread);
        id
    }

    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    pub fn thread(&self, id: ThreadId) -> Option<&Thread> {
        self.threads.iter().find(|t| t.id == id)
    }

    pub fn thread_mut(&mut self, id: ThreadId) -> Option<&mut Thread> {
        self.threads.iter_mut().find(|t| t.id == id)
    }

    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    /// Threads of a given type, in weave order.
    pub fn threads_of(&self, thread_type: ThreadType) -> impl Iterator<Item = &Thread> {
        self.threads.iter().filter(move |t| t.thread_type == thread_type)
    }

    /// First woven thread of a given type.
    pub fn first_of(&self, thread_type: ThreadType) -> Option<&Thread> {
        self.threads_of(thread_type).next()
    }

    pub fn has_type(&self, thread_type: ThreadType) -> bool {
        self.first_of(thread_type).is_some()
    }

    pub fn complexity(&self) -> f32 {
        self.complexity
    }

    /// Grow complexity, saturating at 1.0.
    pub fn add_complexity(&mut self, delta: f32) {
        self.complexity = (self.complexity + delta).clamp(0.0, 1.0);
    }

    pub fn perceptions(&self) -> &[String] {
        &self.perceptions
    }

    pub fn perceive(&mut self, perceptions: impl IntoIterator<Item = String>) {
        self.perceptions.extend(perceptions);
    }

    pub fn has_emerged(&self, name: &str) -> bool {
        self.emerged.contains(name)
    }

    /// Returns false if the property had already emerged.
    pub fn mark_emerged(&mut self, name: impl Into<String>) -> bool {
        self.emerged.insert(name.into())
    }

    pub fn emerged(&self) -> &HashSet<String> {
        &self.emerged
    }

    /// Strengthen the bond between two threads in both directions.
    ///
    /// Missing edges are created. Strength saturates at 1.0. Returns false when
    /// either thread is unknown or both ids are the same thread.
    pub fn deepen(&mut self, a: ThreadId, b: ThreadId, bonus: f32) -> bool {
        if a == b || self.thread(a).is_none() || self.thread(b).is_none() {
            return false;
        }
        for (from, to) in [(a, b), (b, a)] {
            if let Some(thread) = self.thread_mut(from) {
                thread.strengthen(to, bonus);
            }
        }
        true
    }

    /// Connect two threads in both directions with the given strength.
    pub fn relate(&mut self, a: ThreadId, b: ThreadId, strength: f32, synergy: f32) -> bool {
        if a == b || self.thread(a).is_none() || self.thread(b).is_none() {
            return false;
        }
        for (from, to) in [(a, b), (b, a)] {
            if let Some(thread) = self.thread_mut(from) {
                thread.set_relationship(Relationship::new(to, strength, synergy));
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weave_and_lookup() {
        let mut city = City::new();
        let transit = city.weave(Thread::new(ThreadType::Transit));
        city.weave(Thread::new(ThreadType::Memory));
        city.weave(Thread::new(ThreadType::Transit));

        assert_eq!(city.thread_count(), 3);
        assert_eq!(city.threads_of(ThreadType::Transit).count(), 2);
        assert_eq!(city.first_of(ThreadType::Transit).unwrap().id, transit);
        assert!(!city.has_type(ThreadType::Commerce));
    }

    #[test]
    fn test_complexity_saturates() {
        let mut city = City::new().with_complexity(0.8);
        city.add_complexity(0.5);
        assert_eq!(city.complexity(), 1.0);
    }

    #[test]
    fn test_deepen_is_symmetric_and_clamped() {
        let mut city = City::new();
        let a = city.weave(Thread::new(ThreadType::Memory));
        let b = city.weave(Thread::new(ThreadType::Culture));
        city.relate(a, b, 0.7, 0.1);

        assert!(city.deepen(a, b, 0.5));

        let ab = city.thread(a).unwrap().relationship_with(b).unwrap();
        let ba = city.thread(b).unwrap().relationship_with(a).unwrap();
        assert_eq!(ab.strength, 1.0);
        assert_eq!(ba.strength, 1.0);
    }

    #[test]
    fn test_deepen_creates_missing_edges() {
        let mut city = City::new();
        let a = city.weave(Thread::new(ThreadType::Nature));
        let b = city.weave(Thread::new(ThreadType::Community));

        assert!(city.deepen(a, b, 0.25));
        assert!((city.thread(b).unwrap().relationship_with(a).unwrap().strength - 0.25).abs() < 0.001);
    }

    #[test]
    fn test_deepen_rejects_self_and_unknown() {
        let mut city = City::new();
        let a = city.weave(Thread::new(ThreadType::Nature));

        assert!(!city.deepen(a, a, 0.2));
        assert!(!city.deepen(a, ThreadId::new(), 0.2));
        assert!(city.thread(a).unwrap().relationships.is_empty());
    }

    #[test]
    fn test_emerged_names() {
        let mut city = City::new();
        assert!(city.mark_emerged("district-memory"));
        assert!(!city.mark_emerged("district-memory"));
        assert!(city.has_emerged("district-memory"));
    }
}
