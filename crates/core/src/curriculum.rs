//! Day-by-day curricula returned by the generative producer.
//!
//! The producer answers the rendered prompt with a JSON object keyed by day
//! (`"day1"`, `"day2"`, ...). Its content is trusted and stored as given;
//! parsing only extracts the day structure and tolerates missing optional
//! fields.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::CurriculumError;
use crate::strength::Strength;

fn lenient_strength<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Strength>, D::Error> {
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.and_then(|level| level.trim().parse().ok()))
}

/// A subtopic scheduled on a given day, with its completion flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSubtopic")]
pub struct DaySubtopic {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_time_hours: Option<f64>,
    pub checked: bool,
}

/// Producers emit subtopics either as bare strings or as objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSubtopic {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        prep_time_hours: Option<f64>,
        #[serde(default)]
        checked: bool,
    },
}

impl From<RawSubtopic> for DaySubtopic {
    fn from(raw: RawSubtopic) -> Self {
        match raw {
            RawSubtopic::Name(name) => Self {
                name,
                prep_time_hours: None,
                checked: false,
            },
            RawSubtopic::Detailed {
                name,
                prep_time_hours,
                checked,
            } => Self {
                name,
                prep_time_hours,
                checked,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTopic {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weightage_percent: Option<f64>,
    #[serde(default)]
    pub subtopics: Vec<DaySubtopic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySubject {
    pub name: String,
    /// Any casing is accepted; an unrecognised level is dropped rather
    /// than failing the upload.
    #[serde(
        default,
        deserialize_with = "lenient_strength",
        skip_serializing_if = "Option::is_none"
    )]
    pub strength_level: Option<Strength>,
    #[serde(default)]
    pub topics: Vec<DayTopic>,
}

/// One day of a stored plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDay {
    pub day_number: u32,
    pub subjects: Vec<DaySubject>,
}

#[derive(Deserialize)]
struct DayBody {
    subjects: Vec<DaySubject>,
}

/// Flattened view of a day, used for plan listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub document_name: String,
    pub day_number: u32,
    pub title: String,
    pub section: String,
    pub section_id: String,
    pub topics: Vec<String>,
    pub hours: f64,
    pub total_subtopics: usize,
    pub completed_subtopics: usize,
}

impl PlanDay {
    /// Storage name for the day: `Day_01`, `Day_02`, ...
    pub fn document_name(&self) -> String {
        format!("Day_{:02}", self.day_number)
    }

    pub fn subtopics(&self) -> impl Iterator<Item = &DaySubtopic> {
        self.subjects
            .iter()
            .flat_map(|s| s.topics.iter())
            .flat_map(|t| t.subtopics.iter())
    }

    pub fn subtopic_mut(
        &mut self,
        subject_index: usize,
        topic_index: usize,
        subtopic_index: usize,
    ) -> Option<&mut DaySubtopic> {
        self.subjects
            .get_mut(subject_index)?
            .topics
            .get_mut(topic_index)?
            .subtopics
            .get_mut(subtopic_index)
    }

    pub fn summary(&self) -> DaySummary {
        let first = self.subjects.first().map(|s| s.name.clone());
        let title = first
            .clone()
            .unwrap_or_else(|| format!("Day {}", self.day_number));
        let section = first.unwrap_or_else(|| "General".to_string());
        let section_id = section
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");

        let topics = self
            .subjects
            .iter()
            .flat_map(|s| s.topics.iter().map(|t| t.name.clone()))
            .collect();

        let hours: f64 = self.subtopics().filter_map(|st| st.prep_time_hours).sum();

        DaySummary {
            document_name: self.document_name(),
            day_number: self.day_number,
            title,
            section,
            section_id,
            topics,
            hours: (hours * 100.0).round() / 100.0,
            total_subtopics: self.subtopics().count(),
            completed_subtopics: self.subtopics().filter(|st| st.checked).count(),
        }
    }
}

/// A parsed producer response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curriculum {
    /// Days ordered by day number.
    pub days: Vec<PlanDay>,

    /// Optional `planName` the producer included at the top level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,

    /// Top-level keys that were not recognised as days.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignored_keys: Vec<String>,
}

/// Parse `day12` / `Day12` into `12`.
fn day_number(key: &str) -> Option<u32> {
    let lower = key.to_ascii_lowercase();
    let digits = lower.strip_prefix("day")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|n| *n >= 1)
}

impl Curriculum {
    pub fn parse(text: &str) -> Result<Self, CurriculumError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| CurriculumError::MalformedDay {
                day: "<document>".into(),
                reason: e.to_string(),
            })?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, CurriculumError> {
        let object = value.as_object().ok_or(CurriculumError::NotAnObject)?;

        let mut days = BTreeMap::new();
        let mut ignored_keys = Vec::new();

        for (key, entry) in object {
            let number = match day_number(key) {
                Some(n) if entry.get("subjects").is_some_and(Value::is_array) => n,
                _ => {
                    ignored_keys.push(key.clone());
                    continue;
                }
            };

            let body: DayBody = serde_json::from_value(entry.clone()).map_err(|e| {
                CurriculumError::MalformedDay {
                    day: key.clone(),
                    reason: e.to_string(),
                }
            })?;

            let day = PlanDay {
                day_number: number,
                subjects: body.subjects,
            };
            if days.insert(number, day).is_some() {
                tracing::warn!(day = number, key = %key, "Duplicate day in curriculum, keeping the later entry");
            }
        }

        if days.is_empty() {
            return Err(CurriculumError::NoDays);
        }

        let plan_name = object
            .get("planName")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            days: days.into_values().collect(),
            plan_name,
            ignored_keys,
        })
    }

    pub fn total_subtopics(&self) -> usize {
        self.days.iter().map(|d| d.subtopics().count()).sum()
    }
}
