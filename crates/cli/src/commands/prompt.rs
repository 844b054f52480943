//! `prepwise prompt`: Print the producer prompt.

use prepwise_config::AppConfig;
use prepwise_planner::{allocate, render_prompt};

use super::allocate::report_diagnostics;
use super::plan_input::PlanArgs;

pub async fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let input = args.resolve(&config)?;

    let allocation = allocate(input.days, &input.strengths, &input.syllabus);
    report_diagnostics(&allocation);

    println!(
        "{}",
        render_prompt(input.days, &input.strengths, &allocation, &input.syllabus)
    );
    Ok(())
}
