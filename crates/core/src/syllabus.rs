//! The static curriculum catalog and the subject → topic-identifier mapping.
//!
//! A [`Syllabus`] is loaded once and passed explicitly to everything that
//! needs it, so planning stays a pure function of its arguments and tests can
//! swap in small hand-built catalogs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::PlannerError;

const BUILTIN_GATE_CSE: &str = include_str!("../data/gate_cse.json");

/// Tolerance used by [`Syllabus::validate`] when checking weightage sums.
const WEIGHTAGE_TOLERANCE: f64 = 5.0;

/// Serialize whole-number percentages without a trailing `.0`.
pub fn serialize_percent<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// One topic inside a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    #[serde(serialize_with = "serialize_percent")]
    pub weightage_percent: f64,
    #[serde(default)]
    pub subtopics: Vec<String>,
}

/// A top-level catalog grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(serialize_with = "serialize_percent")]
    pub importance_percent: f64,
    pub topics: IndexMap<String, Topic>,
}

impl Subject {
    pub fn weightage_sum(&self) -> f64 {
        self.topics.values().map(|t| t.weightage_percent).sum()
    }

    pub fn subtopic_count(&self) -> usize {
        self.topics.values().map(|t| t.subtopics.len()).sum()
    }
}

/// Subjects in catalog order.
pub type CurriculumCatalog = IndexMap<String, Subject>;

/// Which user-rated topic identifiers feed each subject's strength vote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectMapping(IndexMap<String, Vec<String>>);

impl SubjectMapping {
    /// Identifiers mapped to `subject`; empty for unmapped subjects.
    pub fn topic_ids(&self, subject: &str) -> &[String] {
        self.0.get(subject).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when any subject references `topic_id`.
    pub fn references(&self, topic_id: &str) -> bool {
        self.0.values().any(|ids| ids.iter().any(|id| id == topic_id))
    }

    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn insert(&mut self, subject: impl Into<String>, topic_ids: Vec<String>) {
        self.0.insert(subject.into(), topic_ids);
    }
}

/// Immutable planning configuration: exam name, catalog and mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Syllabus {
    /// Human-readable exam name, used in the generated prompt.
    pub exam: String,

    pub subjects: CurriculumCatalog,

    #[serde(default)]
    pub subject_topics: SubjectMapping,
}

/// A non-fatal data-quality finding about a syllabus.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyllabusWarning {
    WeightageSum { subject: String, sum: f64 },
    EmptySubject { subject: String },
    UnknownMappedSubject { subject: String },
    UnmappedSubject { subject: String },
}

impl std::fmt::Display for SyllabusWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WeightageSum { subject, sum } => {
                write!(f, "{subject}: topic weightages sum to {sum}, not 100")
            }
            Self::EmptySubject { subject } => write!(f, "{subject}: no topics"),
            Self::UnknownMappedSubject { subject } => {
                write!(f, "{subject}: mapped to topic ids but not in the catalog")
            }
            Self::UnmappedSubject { subject } => {
                write!(f, "{subject}: no topic ids mapped, always rated moderate")
            }
        }
    }
}

impl Syllabus {
    pub fn new(exam: impl Into<String>) -> Self {
        Self {
            exam: exam.into(),
            subjects: IndexMap::new(),
            subject_topics: SubjectMapping::default(),
        }
    }

    /// The GATE CSE syllabus compiled into the binary.
    pub fn builtin() -> Self {
        serde_json::from_str(BUILTIN_GATE_CSE).expect("built-in syllabus is valid JSON")
    }

    /// Load a syllabus from a JSON file.
    pub fn load_from(path: &Path) -> Result<Self, PlannerError> {
        let content = std::fs::read_to_string(path).map_err(|e| PlannerError::SyllabusLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let syllabus: Self =
            serde_json::from_str(&content).map_err(|e| PlannerError::SyllabusLoad {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(
            path = %path.display(),
            subjects = syllabus.subjects.len(),
            "Syllabus loaded"
        );
        Ok(syllabus)
    }

    /// Load from `path` when given, otherwise fall back to the built-in syllabus.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, PlannerError> {
        match path {
            Some(p) => Self::load_from(p),
            None => Ok(Self::builtin()),
        }
    }

    /// Builder used mostly by tests.
    pub fn with_subject(
        mut self,
        name: impl Into<String>,
        importance_percent: f64,
        topics: Vec<(&str, f64, Vec<&str>)>,
    ) -> Self {
        let topics = topics
            .into_iter()
            .map(|(topic, weightage_percent, subtopics)| {
                (
                    topic.to_string(),
                    Topic {
                        weightage_percent,
                        subtopics: subtopics.into_iter().map(String::from).collect(),
                    },
                )
            })
            .collect();
        self.subjects.insert(
            name.into(),
            Subject {
                importance_percent,
                topics,
            },
        );
        self
    }

    pub fn with_mapping(mut self, subject: impl Into<String>, topic_ids: &[&str]) -> Self {
        self.subject_topics
            .insert(subject, topic_ids.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn total_subtopics(&self) -> usize {
        self.subjects.values().map(Subject::subtopic_count).sum()
    }

    /// Data-quality checks. Never fails: planning tolerates skewed catalogs.
    pub fn validate(&self) -> Vec<SyllabusWarning> {
        let mut warnings = Vec::new();

        for (name, subject) in &self.subjects {
            if subject.topics.is_empty() {
                warnings.push(SyllabusWarning::EmptySubject {
                    subject: name.clone(),
                });
                continue;
            }
            let sum = subject.weightage_sum();
            if (sum - 100.0).abs() > WEIGHTAGE_TOLERANCE {
                warnings.push(SyllabusWarning::WeightageSum {
                    subject: name.clone(),
                    sum,
                });
            }
            if self.subject_topics.topic_ids(name).is_empty() {
                warnings.push(SyllabusWarning::UnmappedSubject {
                    subject: name.clone(),
                });
            }
        }

        for mapped in self.subject_topics.subjects() {
            if !self.subjects.contains_key(mapped) {
                warnings.push(SyllabusWarning::UnknownMappedSubject {
                    subject: mapped.to_string(),
                });
            }
        }

        warnings
    }
}
