//! Inputs shared by `allocate` and `prompt`.

use clap::Args;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

use prepwise_config::AppConfig;
use prepwise_core::error::PlannerError;
use prepwise_core::strength::{Strength, TopicStrengths};
use prepwise_core::syllabus::Syllabus;
use prepwise_planner::DayRange;

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Total preparation days
    #[arg(short, long, allow_negative_numbers = true)]
    pub days: i64,

    /// Topic rating as `id=level` (weak, moderate, strong). Repeatable.
    #[arg(short, long = "strength", value_parser = parse_strength_pair)]
    pub strengths: Vec<(String, Strength)>,

    /// JSON file mapping topic ids to levels; `--strength` entries override it
    #[arg(long)]
    pub strengths_file: Option<PathBuf>,

    /// Syllabus JSON file (defaults to the configured or built-in one)
    #[arg(long)]
    pub syllabus: Option<PathBuf>,
}

/// Everything a planning command needs, validated.
pub struct PlanInput {
    pub days: u32,
    pub strengths: TopicStrengths,
    pub syllabus: Syllabus,
}

/// Parse `os=weak` into `("os", Strength::Weak)`.
pub fn parse_strength_pair(raw: &str) -> Result<(String, Strength), String> {
    let (id, level) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected id=level, got '{raw}'"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing topic id in '{raw}'"));
    }
    let level: Strength = level.parse().map_err(|e: PlannerError| e.to_string())?;
    Ok((id.to_string(), level))
}

/// Read a `{ "id": "level" }` file. Levels are matched case-insensitively.
pub fn read_strengths_file(path: &Path) -> Result<TopicStrengths, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let raw: IndexMap<String, String> = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse {}: {e}", path.display()))?;

    let mut strengths = TopicStrengths::new();
    for (id, level) in raw {
        strengths.insert(id, level.parse::<Strength>()?);
    }
    Ok(strengths)
}

impl PlanArgs {
    /// Merge file and flag ratings; flags win.
    pub fn strengths(&self) -> Result<TopicStrengths, Box<dyn std::error::Error>> {
        let mut strengths = match &self.strengths_file {
            Some(path) => read_strengths_file(path)?,
            None => TopicStrengths::new(),
        };
        for (id, level) in &self.strengths {
            strengths.insert(id.clone(), *level);
        }
        Ok(strengths)
    }

    pub fn resolve(&self, config: &AppConfig) -> Result<PlanInput, Box<dyn std::error::Error>> {
        let range = DayRange::new(config.planner.min_days, config.planner.max_days);
        let days = range.check(self.days)?;

        let syllabus_path = self
            .syllabus
            .as_deref()
            .or(config.planner.syllabus_path.as_deref());
        let syllabus = Syllabus::load_or_builtin(syllabus_path)?;

        Ok(PlanInput {
            days,
            strengths: self.strengths()?,
            syllabus,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(days: i64, strengths: Vec<(String, Strength)>) -> PlanArgs {
        PlanArgs {
            days,
            strengths,
            strengths_file: None,
            syllabus: None,
        }
    }

    #[test]
    fn strength_pairs_parse() {
        assert_eq!(
            parse_strength_pair("os=weak").unwrap(),
            ("os".to_string(), Strength::Weak)
        );
        assert_eq!(
            parse_strength_pair(" dbms = Strong ").unwrap(),
            ("dbms".to_string(), Strength::Strong)
        );
        assert!(parse_strength_pair("os").is_err());
        assert!(parse_strength_pair("=weak").is_err());
        assert!(parse_strength_pair("os=expert").is_err());
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strengths.json");
        std::fs::write(&path, r#"{"os": "Weak", "dbms": "strong"}"#).unwrap();

        let mut args = args(30, vec![("os".into(), Strength::Strong)]);
        args.strengths_file = Some(path);

        let strengths = args.strengths().unwrap();
        assert_eq!(strengths.get("os"), Strength::Strong);
        assert_eq!(strengths.get("dbms"), Strength::Strong);
        assert_eq!(strengths.len(), 2);
    }

    #[test]
    fn bad_level_in_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strengths.json");
        std::fs::write(&path, r#"{"os": "great"}"#).unwrap();
        assert!(read_strengths_file(&path).is_err());
    }

    #[test]
    fn resolve_checks_configured_range() {
        let mut config = AppConfig::default();
        config.planner.max_days = 60;

        assert!(args(90, vec![]).resolve(&config).is_err());
        let input = args(45, vec![]).resolve(&config).unwrap();
        assert_eq!(input.days, 45);
        assert_eq!(input.syllabus.subjects.len(), 11);
    }
}
