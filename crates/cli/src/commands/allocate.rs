//! `prepwise allocate`: Print a day allocation.

use prepwise_config::AppConfig;
use prepwise_planner::{Allocation, allocate};

use super::plan_input::PlanArgs;

pub async fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let input = args.resolve(&config)?;

    let allocation = allocate(input.days, &input.strengths, &input.syllabus);
    report_diagnostics(&allocation);

    println!("{}", serde_json::to_string_pretty(&allocation.subjects)?);
    Ok(())
}

/// Diagnostics go to stderr so stdout stays valid JSON.
pub fn report_diagnostics(allocation: &Allocation) {
    for id in &allocation.diagnostics.unmapped {
        eprintln!("⚠️  Topic id '{id}' is not mapped to any subject and was ignored");
    }
    if !allocation.diagnostics.defaulted.is_empty() {
        eprintln!(
            "ℹ️  Rated moderate by default: {}",
            allocation.diagnostics.defaulted.join(", ")
        );
    }
    eprintln!(
        "📅 {} days requested, {} allocated across {} subjects",
        allocation.total_days,
        allocation.allocated_total(),
        allocation.subjects.len()
    );
}
