//! Content store - read-only source of moments, emergence rules and story beats.
//!
//! Content problems never reach the player. A store that cannot read or
//! parse its backing data logs a warning and serves an empty collection.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

use city_rules::{EmergenceRule, Moment, StoryBeat};

pub const MOMENTS_FILE: &str = "moments.json";
pub const EMERGENCE_RULES_FILE: &str = "emergence_rules.json";
pub const STORY_BEATS_FILE: &str = "story_beats.json";

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read content file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed content file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Query interface the engine consumes.
pub trait ContentStore {
    fn moments(&self) -> Vec<Moment>;
    fn emergence_rules(&self) -> Vec<EmergenceRule>;
    fn story_beats(&self) -> Vec<StoryBeat>;
}

/// Content held in memory, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContentStore {
    moments: Vec<Moment>,
    emergence_rules: Vec<EmergenceRule>,
    story_beats: Vec<StoryBeat>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_moments(mut self, moments: impl IntoIterator<Item = Moment>) -> Self {
        self.moments.extend(moments);
        self
    }

    pub fn with_emergence_rules(mut self, rules: impl IntoIterator<Item = EmergenceRule>) -> Self {
        self.emergence_rules.extend(rules);
        self
    }

    pub fn with_story_beats(mut self, beats: impl IntoIterator<Item = StoryBeat>) -> Self {
        self.story_beats.extend(beats);
        self
    }
}

impl ContentStore for InMemoryContentStore {
    fn moments(&self) -> Vec<Moment> {
        self.moments.clone()
    }

    fn emergence_rules(&self) -> Vec<EmergenceRule> {
        self.emergence_rules.clone()
    }

    fn story_beats(&self) -> Vec<StoryBeat> {
        self.story_beats.clone()
    }
}

/// JSON files in a content directory, each loaded on first access and cached.
#[derive(Debug)]
pub struct JsonContentStore {
    dir: PathBuf,
    moments: OnceLock<Vec<Moment>>,
    emergence_rules: OnceLock<Vec<EmergenceRule>>,
    story_beats: OnceLock<Vec<StoryBeat>>,
}

impl JsonContentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            moments: OnceLock::new(),
            emergence_rules: OnceLock::new(),
            story_beats: OnceLock::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn cached<T>(&self, cell: &OnceLock<Vec<T>>, file: &str) -> Vec<T>
    where
        T: DeserializeOwned + Clone,
    {
        cell.get_or_init(|| {
            let path = self.dir.join(file);
            match read_records(&path) {
                Ok(records) => {
                    debug!(path = %path.display(), count = records.len(), "Loaded content");
                    records
                }
                Err(err) => {
                    warn!(error = %err, "Content unavailable, continuing without it");
                    Vec::new()
                }
            }
        })
        .clone()
    }
}

impl ContentStore for JsonContentStore {
    fn moments(&self) -> Vec<Moment> {
        self.cached(&self.moments, MOMENTS_FILE)
    }

    fn emergence_rules(&self) -> Vec<EmergenceRule> {
        self.cached(&self.emergence_rules, EMERGENCE_RULES_FILE)
    }

    fn story_beats(&self) -> Vec<StoryBeat> {
        self.cached(&self.story_beats, STORY_BEATS_FILE)
    }
}

/// Read a JSON array of records.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ContentError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| ContentError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use city_rules::{MomentId, MomentType, TextContext};
    use std::fs;

    const MOMENTS: &str = r#"[
        {
            "id": "night-market",
            "moment_type": "celebration",
            "district": 4,
            "fragility": 8,
            "act": 1,
            "texts": { "observed": "Lanterns over the car park." }
        },
        {
            "id": "old-tram",
            "moment_type": "infrastructure",
            "district": 0,
            "fragility": 3,
            "act": 2
        }
    ]"#;

    #[test]
    fn test_loads_json_moments() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MOMENTS_FILE), MOMENTS).unwrap();

        let store = JsonContentStore::new(dir.path());
        let moments = store.moments();

        assert_eq!(moments.len(), 2);
        assert_eq!(moments[0].id, MomentId::from("night-market"));
        assert_eq!(moments[0].moment_type, MomentType::Celebration);
        assert_eq!(moments[0].text(TextContext::Observed), "Lanterns over the car park.");
        assert!(!moments[1].revealed);
    }

    #[test]
    fn test_cached_after_first_load() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MOMENTS_FILE), MOMENTS).unwrap();

        let store = JsonContentStore::new(dir.path());
        assert_eq!(store.moments().len(), 2);

        fs::remove_file(dir.path().join(MOMENTS_FILE)).unwrap();
        assert_eq!(store.moments().len(), 2);
    }

    #[test]
    fn test_missing_and_malformed_degrade_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(EMERGENCE_RULES_FILE), "{ not json").unwrap();

        let store = JsonContentStore::new(dir.path());
        assert!(store.moments().is_empty());
        assert!(store.emergence_rules().is_empty());
        assert!(store.story_beats().is_empty());
    }

    #[test]
    fn test_read_records_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORY_BEATS_FILE);

        assert!(matches!(
            read_records::<StoryBeat>(&path),
            Err(ContentError::Io { .. })
        ));

        fs::write(&path, "[{\"id\": 3}]").unwrap();
        assert!(matches!(
            read_records::<StoryBeat>(&path),
            Err(ContentError::Parse { .. })
        ));
    }

    #[test]
    fn test_in_memory_store() {
        let store = InMemoryContentStore::new()
            .with_moments([Moment::new("a", MomentType::Dream)])
            .with_story_beats([StoryBeat::new("hello", 1).with_line("hello")]);

        assert_eq!(store.moments().len(), 1);
        assert!(store.emergence_rules().is_empty());
        assert_eq!(store.story_beats().len(), 1);
    }
}
