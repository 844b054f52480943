//! `prepwise config`: Configuration management commands.

use prepwise_config::AppConfig;
use prepwise_core::syllabus::Syllabus;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();

            if config.gateway.admin_tokens.is_empty() {
                warnings.push(
                    "No admin tokens set; /v1/admin is open (set PREPWISE_ADMIN_TOKEN)".to_string(),
                );
            }

            match Syllabus::load_or_builtin(config.planner.syllabus_path.as_deref()) {
                Ok(syllabus) => {
                    let issues = syllabus.validate().len();
                    if issues > 0 {
                        warnings.push(format!(
                            "Syllabus has {issues} data-quality warnings (run `prepwise syllabus`)"
                        ));
                    }
                }
                Err(e) => warnings.push(format!("Syllabus cannot be loaded: {e}")),
            }

            if config.store.backend == "memory" {
                warnings.push("In-memory store: requests and plans are lost on restart".into());
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!(
                "   Gateway:   {}:{}",
                config.gateway.host, config.gateway.port
            );
            println!(
                "   Days:      {}..={}",
                config.planner.min_days, config.planner.max_days
            );
            println!(
                "   Syllabus:  {}",
                config
                    .planner
                    .syllabus_path
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "built-in".into())
            );
            println!("   Store:     {}", config.store.backend);
            if config.store.backend == "file" {
                println!("   Snapshot:  {}", config.store.resolved_path().display());
            }
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn config_path_is_valid() {
        let path = prepwise_config::AppConfig::config_path();
        assert!(path.to_str().unwrap().ends_with("config.toml"));
        assert!(path.to_str().unwrap().contains(".prepwise"));
    }
}
