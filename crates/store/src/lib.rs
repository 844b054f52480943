//! Document store backends for prepwise.

pub mod file_backend;
pub mod in_memory;
pub mod state;

pub use file_backend::FileStore;
pub use in_memory::InMemoryStore;
pub use state::StoreState;

use std::sync::Arc;

use prepwise_config::StoreConfig;
use prepwise_core::store::PlanStore;

/// Build the configured backend. Unknown names fall back to memory;
/// `AppConfig::validate` rejects them before this is reached.
pub fn build_from_config(config: &StoreConfig) -> Arc<dyn PlanStore> {
    match config.backend.as_str() {
        "file" => {
            let path = config.resolved_path();
            tracing::info!(path = %path.display(), "Using file store");
            Arc::new(FileStore::new(path))
        }
        "memory" => {
            tracing::info!("Using in-memory store");
            Arc::new(InMemoryStore::new())
        }
        other => {
            tracing::warn!(backend = other, "Unknown store backend, using in-memory store");
            Arc::new(InMemoryStore::new())
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use prepwise_core::curriculum::{DaySubject, DaySubtopic, DayTopic, PlanDay};
    use prepwise_core::progress::SubtopicRef;

    fn day(day_number: u32, subject: &str, subtopics: &[&str]) -> PlanDay {
        PlanDay {
            day_number,
            subjects: vec![DaySubject {
                name: subject.into(),
                strength_level: Some(prepwise_core::strength::Strength::Moderate),
                topics: vec![DayTopic {
                    name: "Core".into(),
                    weightage_percent: None,
                    subtopics: subtopics
                        .iter()
                        .map(|name| DaySubtopic {
                            name: name.to_string(),
                            prep_time_hours: Some(1.0),
                            checked: false,
                        })
                        .collect(),
                }],
            }],
        }
    }

    /// Two days, three subtopics.
    pub fn sample_days() -> Vec<PlanDay> {
        vec![
            day(1, "Operating Systems", &["Paging", "Segmentation"]),
            day(2, "Databases", &["Normal forms"]),
        ]
    }

    pub fn subtopic(day: u32, subject: usize, topic: usize, sub: usize) -> SubtopicRef {
        SubtopicRef {
            day_number: day,
            subject_index: subject,
            topic_index: topic,
            subtopic_index: sub,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_configured_backend() {
        let store = build_from_config(&StoreConfig::default());
        assert_eq!(store.name(), "memory");

        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            backend: "file".into(),
            path: Some(dir.path().join("store.json")),
        };
        assert_eq!(build_from_config(&config).name(), "file");
    }
}
