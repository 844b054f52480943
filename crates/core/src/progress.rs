//! Completion tracking over a stored plan.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::curriculum::PlanDay;

/// Coordinates of one subtopic inside a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubtopicRef {
    pub day_number: u32,
    pub subject_index: usize,
    pub topic_index: usize,
    pub subtopic_index: usize,
}

impl SubtopicRef {
    /// Stable key used by clients to look up a checkbox state.
    pub fn key(&self) -> String {
        format!(
            "day_{}_subject_{}_topic_{}_subtopic_{}",
            self.day_number, self.subject_index, self.topic_index, self.subtopic_index
        )
    }
}

/// Aggregate completion across all days of a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub completed: usize,
    pub total: usize,
    /// Rounded percentage, `0` for an empty plan.
    pub percentage: u32,
}

impl ProgressSummary {
    pub fn new(completed: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        };
        Self {
            completed,
            total,
            percentage,
        }
    }

    pub fn from_days(days: &[PlanDay]) -> Self {
        let (completed, total) = days
            .iter()
            .flat_map(PlanDay::subtopics)
            .fold((0, 0), |(done, all), st| {
                (done + usize::from(st.checked), all + 1)
            });
        Self::new(completed, total)
    }
}

/// Map of every checked subtopic key to `true`.
///
/// Unchecked subtopics are omitted, matching how clients treat a missing
/// key as not done.
pub fn checked_keys(days: &[PlanDay]) -> BTreeMap<String, bool> {
    let mut keys = BTreeMap::new();
    for day in days {
        for (s, subject) in day.subjects.iter().enumerate() {
            for (t, topic) in subject.topics.iter().enumerate() {
                for (st, subtopic) in topic.subtopics.iter().enumerate() {
                    if subtopic.checked {
                        let key = SubtopicRef {
                            day_number: day.day_number,
                            subject_index: s,
                            topic_index: t,
                            subtopic_index: st,
                        }
                        .key();
                        keys.insert(key, true);
                    }
                }
            }
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::{DaySubject, DaySubtopic, DayTopic};

    fn day(number: u32, checked: &[bool]) -> PlanDay {
        PlanDay {
            day_number: number,
            subjects: vec![DaySubject {
                name: "Algorithms".into(),
                strength_level: None,
                topics: vec![DayTopic {
                    name: "Sorting".into(),
                    weightage_percent: None,
                    subtopics: checked
                        .iter()
                        .enumerate()
                        .map(|(i, c)| DaySubtopic {
                            name: format!("s{i}"),
                            prep_time_hours: None,
                            checked: *c,
                        })
                        .collect(),
                }],
            }],
        }
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(ProgressSummary::new(1, 3).percentage, 33);
        assert_eq!(ProgressSummary::new(2, 3).percentage, 67);
        assert_eq!(ProgressSummary::new(0, 0).percentage, 0);
    }

    #[test]
    fn summary_counts_across_days() {
        let days = vec![day(1, &[true, false]), day(2, &[true, true])];
        let summary = ProgressSummary::from_days(&days);
        assert_eq!(summary.completed, 3);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.percentage, 75);
    }

    #[test]
    fn checked_keys_lists_only_done_items() {
        let days = vec![day(3, &[false, true])];
        let keys = checked_keys(&days);
        assert_eq!(keys.len(), 1);
        assert!(keys.contains_key("day_3_subject_0_topic_0_subtopic_1"));
    }
}
