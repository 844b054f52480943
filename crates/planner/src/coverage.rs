//! Reconciling an uploaded curriculum against the catalog.
//!
//! Producer output is stored as given. The report only tells an admin what
//! the producer skipped or invented so they can decide whether to re-run it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use prepwise_core::curriculum::Curriculum;
use prepwise_core::syllabus::Syllabus;

/// A catalog subtopic that no day schedules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnscheduledSubtopic {
    pub subject: String,
    pub topic: String,
    pub subtopic: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Day numbers in `1..=total_days` with no entry.
    pub missing_days: Vec<u32>,
    /// Day numbers beyond `total_days`.
    pub extra_days: Vec<u32>,
    /// Subject names the catalog does not know, in first-seen order.
    pub unknown_subjects: Vec<String>,
    pub unscheduled_subtopics: Vec<UnscheduledSubtopic>,
    pub scheduled_subtopics: usize,
}

impl CoverageReport {
    pub fn reconcile(curriculum: &Curriculum, total_days: u32, syllabus: &Syllabus) -> Self {
        let present: BTreeSet<u32> = curriculum.days.iter().map(|d| d.day_number).collect();

        let missing_days = (1..=total_days).filter(|d| !present.contains(d)).collect();
        let extra_days = present.iter().copied().filter(|d| *d > total_days).collect();

        let mut unknown_subjects = Vec::new();
        let mut scheduled = HashSet::new();
        for day in &curriculum.days {
            for subject in &day.subjects {
                if !syllabus.subjects.contains_key(&subject.name)
                    && !unknown_subjects.contains(&subject.name)
                {
                    unknown_subjects.push(subject.name.clone());
                }
                for topic in &subject.topics {
                    for subtopic in &topic.subtopics {
                        scheduled.insert((
                            subject.name.as_str(),
                            topic.name.as_str(),
                            subtopic.name.as_str(),
                        ));
                    }
                }
            }
        }

        let mut unscheduled_subtopics = Vec::new();
        for (subject_name, subject) in &syllabus.subjects {
            for (topic_name, topic) in &subject.topics {
                for subtopic in &topic.subtopics {
                    let key = (subject_name.as_str(), topic_name.as_str(), subtopic.as_str());
                    if !scheduled.contains(&key) {
                        unscheduled_subtopics.push(UnscheduledSubtopic {
                            subject: subject_name.clone(),
                            topic: topic_name.clone(),
                            subtopic: subtopic.clone(),
                        });
                    }
                }
            }
        }

        let report = Self {
            missing_days,
            extra_days,
            unknown_subjects,
            unscheduled_subtopics,
            scheduled_subtopics: curriculum.total_subtopics(),
        };

        if !report.is_complete() {
            tracing::warn!(
                missing_days = report.missing_days.len(),
                extra_days = report.extra_days.len(),
                unknown_subjects = report.unknown_subjects.len(),
                unscheduled = report.unscheduled_subtopics.len(),
                "Uploaded curriculum does not fully cover the syllabus"
            );
        }
        report
    }

    /// True when every day is present, nothing is extra and every catalog
    /// subtopic is scheduled under a known subject.
    pub fn is_complete(&self) -> bool {
        self.missing_days.is_empty()
            && self.extra_days.is_empty()
            && self.unknown_subjects.is_empty()
            && self.unscheduled_subtopics.is_empty()
    }

    /// One line per finding, for CLI and log output.
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if !self.missing_days.is_empty() {
            out.push(format!("missing days: {:?}", self.missing_days));
        }
        if !self.extra_days.is_empty() {
            out.push(format!("days beyond the plan length: {:?}", self.extra_days));
        }
        for subject in &self.unknown_subjects {
            out.push(format!("subject not in catalog: {subject}"));
        }
        for st in &self.unscheduled_subtopics {
            out.push(format!("never scheduled: {} / {} / {}", st.subject, st.topic, st.subtopic));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn syllabus() -> Syllabus {
        Syllabus::new("Mini")
            .with_subject("Algorithms", 50.0, vec![("Sorting", 100.0, vec!["Merge sort", "Quick sort"])])
            .with_subject("Networks", 50.0, vec![("Routing", 100.0, vec!["Link state"])])
    }

    #[test]
    fn complete_upload_is_clean() {
        let curriculum = Curriculum::from_value(&json!({
            "day1": {"subjects": [{"name": "Algorithms", "topics": [
                {"name": "Sorting", "subtopics": ["Merge sort", "Quick sort"]}
            ]}]},
            "day2": {"subjects": [{"name": "Networks", "topics": [
                {"name": "Routing", "subtopics": [{"name": "Link state", "prep_time_hours": 2}]}
            ]}]}
        }))
        .unwrap();

        let report = CoverageReport::reconcile(&curriculum, 2, &syllabus());
        assert!(report.is_complete(), "{:?}", report.warnings());
        assert_eq!(report.scheduled_subtopics, 3);
    }

    #[test]
    fn gaps_and_inventions_are_reported() {
        let curriculum = Curriculum::from_value(&json!({
            "day1": {"subjects": [{"name": "Algorithms", "topics": [
                {"name": "Sorting", "subtopics": ["Merge sort"]}
            ]}]},
            "day4": {"subjects": [{"name": "Astrology", "topics": []}]}
        }))
        .unwrap();

        let report = CoverageReport::reconcile(&curriculum, 3, &syllabus());
        assert_eq!(report.missing_days, vec![2, 3]);
        assert_eq!(report.extra_days, vec![4]);
        assert_eq!(report.unknown_subjects, vec!["Astrology"]);
        let unscheduled: Vec<&str> = report
            .unscheduled_subtopics
            .iter()
            .map(|s| s.subtopic.as_str())
            .collect();
        assert_eq!(unscheduled, vec!["Quick sort", "Link state"]);
        assert_eq!(report.warnings().len(), 5);
    }
}
