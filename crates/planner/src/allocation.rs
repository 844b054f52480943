//! Proportional day allocation.
//!
//! Each subject gets `ceil(importance% × total_days)` days, boosted by 30%
//! when the learner is weak in it and by 10% when moderate; strong subjects
//! keep the importance-based floor. The subject budget is then split across
//! its topics by weightage, rounding each share up, and the last topic takes
//! whatever remains, which can be zero or negative when earlier shares
//! overshoot. Nothing is clamped.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use prepwise_core::strength::{Strength, TopicStrengths};
use prepwise_core::syllabus::{serialize_percent, Subject, SubjectMapping, Syllabus, Topic};

const WEAK_MULTIPLIER: f64 = 1.3;
const MODERATE_MULTIPLIER: f64 = 1.1;

/// Days assigned to one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicAllocation {
    #[serde(serialize_with = "serialize_percent")]
    pub weightage_percent: f64,
    pub allocated_days: i64,
    pub subtopics: Vec<String>,
}

/// Days assigned to one subject and how they split across its topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectAllocation {
    #[serde(serialize_with = "serialize_percent")]
    pub importance_percent: f64,
    pub allocated_days: i64,
    pub strength_level: Strength,
    pub topics: IndexMap<String, TopicAllocation>,
}

/// Subject → allocation, in catalog order.
pub type AllocationResult = IndexMap<String, SubjectAllocation>;

/// Inputs that fell back to defaults or were never consulted.
///
/// Purely informational: the allocation is identical with or without them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationDiagnostics {
    /// Mapped topic ids missing from the input, rated moderate by default.
    pub defaulted: Vec<String>,
    /// Input topic ids that no subject references.
    pub unmapped: Vec<String>,
}

impl AllocationDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.defaulted.is_empty() && self.unmapped.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub total_days: u32,
    pub subjects: AllocationResult,
    pub diagnostics: AllocationDiagnostics,
}

impl Allocation {
    /// Sum of subject budgets. Usually exceeds `total_days` because of the
    /// strength boosts and per-subject rounding.
    pub fn allocated_total(&self) -> i64 {
        self.subjects.values().map(|s| s.allocated_days).sum()
    }
}

/// Majority vote over the topic ids mapped to `subject`.
///
/// Unrated ids count as moderate; unmapped subjects are moderate.
pub fn subject_strength(
    subject: &str,
    strengths: &TopicStrengths,
    mapping: &SubjectMapping,
) -> Strength {
    Strength::majority(mapping.topic_ids(subject).iter().map(|id| strengths.get(id)))
}

/// Baseline days for a subject from its importance share.
pub fn baseline_days(importance_percent: f64, total_days: u32) -> i64 {
    (importance_percent / 100.0 * f64::from(total_days)).ceil() as i64
}

/// Apply the strength boost to a baseline.
pub fn adjusted_days(baseline: i64, strength: Strength) -> i64 {
    let baseline = baseline as f64;
    let adjusted = match strength {
        Strength::Weak => (baseline * WEAK_MULTIPLIER).ceil(),
        Strength::Moderate => (baseline * MODERATE_MULTIPLIER).ceil(),
        Strength::Strong => baseline,
    };
    adjusted as i64
}

/// Split `subject_days` across topics; the last topic takes the remainder.
fn distribute(subject_days: i64, topics: &IndexMap<String, Topic>) -> IndexMap<String, TopicAllocation> {
    let last = topics.len().saturating_sub(1);
    let mut used = 0i64;

    topics
        .iter()
        .enumerate()
        .map(|(index, (name, topic))| {
            let days = if index == last {
                subject_days - used
            } else {
                (topic.weightage_percent / 100.0 * subject_days as f64).ceil() as i64
            };
            used += days;
            (
                name.clone(),
                TopicAllocation {
                    weightage_percent: topic.weightage_percent,
                    allocated_days: days,
                    subtopics: topic.subtopics.clone(),
                },
            )
        })
        .collect()
}

fn allocate_subject(
    name: &str,
    subject: &Subject,
    total_days: u32,
    strengths: &TopicStrengths,
    mapping: &SubjectMapping,
) -> SubjectAllocation {
    let baseline = baseline_days(subject.importance_percent, total_days);
    let strength_level = subject_strength(name, strengths, mapping);
    let allocated_days = adjusted_days(baseline, strength_level);

    debug!(
        subject = name,
        baseline,
        strength = %strength_level,
        allocated_days,
        "Subject allocated"
    );

    SubjectAllocation {
        importance_percent: subject.importance_percent,
        allocated_days,
        strength_level,
        topics: distribute(allocated_days, &subject.topics),
    }
}

fn diagnose(strengths: &TopicStrengths, syllabus: &Syllabus) -> AllocationDiagnostics {
    let mut diagnostics = AllocationDiagnostics::default();

    for subject in syllabus.subjects.keys() {
        for id in syllabus.subject_topics.topic_ids(subject) {
            if !strengths.is_rated(id) && !diagnostics.defaulted.contains(id) {
                diagnostics.defaulted.push(id.clone());
            }
        }
    }

    diagnostics.unmapped = strengths
        .ids()
        .filter(|id| !syllabus.subject_topics.references(id))
        .map(str::to_string)
        .collect();

    diagnostics
}

/// Allocate `total_days` across every subject and topic of the syllabus.
///
/// Total for any input: out-of-range day counts and missing ratings produce
/// degenerate but well-formed output. Validate at the boundary (see
/// [`crate::DayRange`]) before calling.
pub fn allocate(total_days: u32, strengths: &TopicStrengths, syllabus: &Syllabus) -> Allocation {
    let subjects = syllabus
        .subjects
        .iter()
        .map(|(name, subject)| {
            (
                name.clone(),
                allocate_subject(name, subject, total_days, strengths, &syllabus.subject_topics),
            )
        })
        .collect();

    let diagnostics = diagnose(strengths, syllabus);
    if !diagnostics.defaulted.is_empty() {
        debug!(ids = ?diagnostics.defaulted, "Unrated topic ids defaulted to moderate");
    }
    if !diagnostics.unmapped.is_empty() {
        warn!(ids = ?diagnostics.unmapped, "Rated topic ids not mapped to any subject");
    }

    Allocation {
        total_days,
        subjects,
        diagnostics,
    }
}
