//! Prompt rendering for the external curriculum producer.
//!
//! The producer (a person pasting into a chat model, or a model behind an
//! API) expands the enriched catalog into a day-keyed JSON curriculum. The
//! rules written into the template are instructions to that producer; the
//! service does not enforce them on what comes back.

use indexmap::IndexMap;
use serde::Serialize;

use prepwise_core::strength::{Strength, TopicStrengths};
use prepwise_core::syllabus::{serialize_percent, Syllabus};

use crate::allocation::{subject_strength, Allocation};

const PROMPT_TEMPLATE: &str = r#"You are an expert {exam} study planner. Generate a comprehensive, day-wise study plan in JSON format.

TOTAL PREPARATION DAYS: {days}

SUBJECT-WISE BREAKDOWN (with importance, the learner's strength level, and topics):

{curriculum}

SUGGESTED DAY BUDGET (importance-based, boosted for weaker subjects):

{budget}

INSTRUCTIONS:
1. Create a detailed {days}-day study plan.

2. Each day MUST include subjects based on the importance distribution.

3. Allocation rules:
   - Allocate each subtopic according to its weightage and the learner's strength level.
   - Do not overload the learner on any single day.
   - Weak topics may be paired with strong ones on the same day.

4. Allocation strategy:
   - Balance subjects according to their importance percentages.
   - Cover every topic and subtopic across the full schedule.
   - Every subject entry must include the field "strength_level".
   - When a topic is scheduled on a day, list ALL of its subtopics for that day.

REQUIRED JSON FORMAT (exact output structure):
{
  "day1": {
    "subjects": [
      {
        "name": "Subject Name",
        "strength_level": "weak|moderate|strong",
        "topics": [
          {
            "name": "Topic Name",
            "weightage_percent": 4,
            "subtopics": [
              {
                "name": "Subtopic Name",
                "prep_time_hours": 1.5
              }
            ]
          }
        ]
      }
    ]
  },
  "day2": {
    ...
  },
  ...
  "day{days}": {
    ...
  }
}

CRITICAL REQUIREMENTS:
- Divide subjects across days while keeping their proportional importance.
- With fewer days than subjects, a day may hold several subjects, chosen by importance and weightage.
- With at least as many days as subjects, keep each day to a single subject.
- Every scheduled topic must list ALL of its subtopics.
- "prep_time_hours" is optional; include it when you can estimate the effort.
- Do not skip any days: generate exactly {days} keys, "day1" through "day{days}".
- Return the whole plan in a single JSON message, not in batches.

Generate the complete {days}-day study plan directly in JSON format."#;

#[derive(Serialize)]
struct PromptTopic<'a> {
    #[serde(serialize_with = "serialize_percent")]
    weightage_percent: f64,
    strength_level: Strength,
    subtopics: &'a [String],
}

#[derive(Serialize)]
struct PromptSubject<'a> {
    #[serde(serialize_with = "serialize_percent")]
    importance_percent: f64,
    strength_level: Strength,
    topics: IndexMap<&'a str, PromptTopic<'a>>,
}

/// The catalog enriched with per-subject strength levels, in catalog order.
fn enriched_catalog<'a>(
    strengths: &TopicStrengths,
    syllabus: &'a Syllabus,
) -> IndexMap<&'a str, PromptSubject<'a>> {
    syllabus
        .subjects
        .iter()
        .map(|(name, subject)| {
            let strength_level = subject_strength(name, strengths, &syllabus.subject_topics);
            let topics = subject
                .topics
                .iter()
                .map(|(topic_name, topic)| {
                    (
                        topic_name.as_str(),
                        PromptTopic {
                            weightage_percent: topic.weightage_percent,
                            strength_level,
                            subtopics: &topic.subtopics,
                        },
                    )
                })
                .collect();
            (
                name.as_str(),
                PromptSubject {
                    importance_percent: subject.importance_percent,
                    strength_level,
                    topics,
                },
            )
        })
        .collect()
}

/// One line per subject: `- Subject (level): N days (Topic: n, ...)`.
fn budget_lines(allocation: &Allocation) -> String {
    allocation
        .subjects
        .iter()
        .map(|(name, subject)| {
            let topics = subject
                .topics
                .iter()
                .map(|(topic, t)| format!("{topic}: {}", t.allocated_days))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "- {name} ({}): {} days ({topics})",
                subject.strength_level, subject.allocated_days
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the producer prompt.
///
/// Strength levels are re-derived from `strengths` with the same majority
/// rule the allocation used; `allocation` supplies the suggested budget.
pub fn render_prompt(
    total_days: u32,
    strengths: &TopicStrengths,
    allocation: &Allocation,
    syllabus: &Syllabus,
) -> String {
    let curriculum =
        serde_json::to_string_pretty(&enriched_catalog(strengths, syllabus)).unwrap_or_default();

    fill_template(
        PROMPT_TEMPLATE,
        &[
            ("{exam}", &syllabus.exam),
            ("{days}", &total_days.to_string()),
            ("{curriculum}", &curriculum),
            ("{budget}", &budget_lines(allocation)),
        ],
    )
}

/// Substitute placeholders in one pass over `template`. Inserted values are
/// never rescanned, so catalog text containing `{days}` survives verbatim.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::allocate;

    fn render(days: u32, strengths: &TopicStrengths, syllabus: &Syllabus) -> String {
        let allocation = allocate(days, strengths, syllabus);
        render_prompt(days, strengths, &allocation, syllabus)
    }

    #[test]
    fn contains_day_header_and_every_subject() {
        let syllabus = Syllabus::builtin();
        let prompt = render(35, &TopicStrengths::new(), &syllabus);

        assert!(prompt.contains("TOTAL PREPARATION DAYS: 35"));
        assert!(prompt.contains("\"day35\""));
        assert!(prompt.contains(&syllabus.exam));
        for subject in syllabus.subjects.keys() {
            assert!(prompt.contains(subject.as_str()), "missing {subject}");
        }
        assert!(!prompt.contains("{days}"));
        assert!(!prompt.contains("{curriculum}"));
    }

    #[test]
    fn embeds_enriched_catalog_as_json() {
        let syllabus = Syllabus::new("Mini Exam")
            .with_subject(
                "Algorithms",
                10.0,
                vec![("Sorting", 50.0, vec!["Merge sort"]), ("Graphs", 50.0, vec!["BFS"])],
            )
            .with_mapping("Algorithms", &["algorithms"]);
        let strengths = TopicStrengths::new().with("algorithms", Strength::Weak);
        let prompt = render(10, &strengths, &syllabus);

        let start = prompt.find("{\n  \"Algorithms\"").expect("catalog block");
        let end = start + prompt[start..].find("\n}").expect("catalog end") + 2;
        let catalog: serde_json::Value = serde_json::from_str(&prompt[start..end]).unwrap();

        assert_eq!(catalog["Algorithms"]["importance_percent"], 10);
        assert_eq!(catalog["Algorithms"]["strength_level"], "weak");
        assert_eq!(catalog["Algorithms"]["topics"]["Sorting"]["strength_level"], "weak");
        assert_eq!(catalog["Algorithms"]["topics"]["Graphs"]["subtopics"][0], "BFS");
        assert!(prompt.contains("- Algorithms (weak): 2 days (Sorting: 1, Graphs: 1)"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let syllabus = Syllabus::builtin();
        let strengths = TopicStrengths::new().with("os", Strength::Strong);
        assert_eq!(render(60, &strengths, &syllabus), render(60, &strengths, &syllabus));
    }

    #[test]
    fn catalog_text_with_placeholders_is_kept_verbatim() {
        let syllabus = Syllabus::new("Mini {budget} Exam").with_subject(
            "Practice",
            100.0,
            vec![("Drills", 100.0, vec!["Revise {days} problems", "Skim {curriculum}"])],
        );
        let prompt = render(30, &TopicStrengths::new(), &syllabus);

        assert!(prompt.contains("Revise {days} problems"));
        assert!(prompt.contains("Skim {curriculum}"));
        assert!(prompt.contains("expert Mini {budget} Exam study planner"));
        assert!(prompt.contains("TOTAL PREPARATION DAYS: 30"));
        assert!(prompt.contains("- Practice (moderate): "));
    }
}
