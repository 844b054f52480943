//! `prepwise syllabus`: Summarise the syllabus.

use std::path::PathBuf;

use prepwise_config::AppConfig;
use prepwise_core::syllabus::Syllabus;

pub async fn run(path: Option<PathBuf>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let path = path.or(config.planner.syllabus_path);
    let syllabus = Syllabus::load_or_builtin(path.as_deref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&syllabus)?);
        return Ok(());
    }

    println!("📚 {}", syllabus.exam);
    println!(
        "   Source: {}",
        path.as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".into())
    );
    println!();

    for line in summary_lines(&syllabus) {
        println!("{line}");
    }

    println!();
    println!(
        "   {} subjects, {} subtopics",
        syllabus.subjects.len(),
        syllabus.total_subtopics()
    );

    let warnings = syllabus.validate();
    if warnings.is_empty() {
        println!("   ✅ No data-quality warnings");
    } else {
        println!();
        for w in &warnings {
            println!("   ⚠️  {w}");
        }
    }

    Ok(())
}

fn summary_lines(syllabus: &Syllabus) -> Vec<String> {
    syllabus
        .subjects
        .iter()
        .map(|(name, subject)| {
            let ids = syllabus.subject_topics.topic_ids(name);
            let mapped = if ids.is_empty() {
                "unmapped".to_string()
            } else {
                ids.join(", ")
            };
            format!(
                "   {name:<36} {:>5}%  {:>2} topics  {:>3} subtopics  [{mapped}]",
                subject.importance_percent,
                subject.topics.len(),
                subject.subtopic_count()
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_marks_unmapped_subjects() {
        let lines = summary_lines(&Syllabus::builtin());
        assert_eq!(lines.len(), 11);
        assert!(lines[0].contains("General Aptitude"));
        assert!(lines[0].contains("[unmapped]"));
        assert!(lines.iter().any(|l| l.contains("[data_structures, programming]")));
    }
}
