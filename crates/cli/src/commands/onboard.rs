//! `prepwise onboard`: First-time setup.

use std::path::Path;

use prepwise_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();

    println!("📘 prepwise: First-Time Setup");
    println!("==============================\n");

    let created = write_default_config(&config_dir)?;
    let config_path = config_dir.join("config.toml");

    if created {
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Set an admin token in {} or PREPWISE_ADMIN_TOKEN", config_path.display());
        println!("   2. Switch [store] backend to \"file\" to keep plans across restarts");
        println!("   3. Run: prepwise serve\n");
    } else {
        println!("⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    }

    println!("🎉 Setup complete! Try `prepwise allocate --days 30 --strength os=weak`.\n");

    Ok(())
}

/// Write the default config into `dir` unless one exists. Returns whether a
/// file was written.
fn write_default_config(dir: &Path) -> Result<bool, Box<dyn std::error::Error>> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        println!("✅ Created config directory: {}", dir.display());
    }

    let path = dir.join("config.toml");
    if path.exists() {
        return Ok(false);
    }
    std::fs::write(&path, AppConfig::default_toml())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_once_and_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(".prepwise");

        assert!(write_default_config(&config_dir).unwrap());
        let path = config_dir.join("config.toml");
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[planner]"));
        AppConfig::load_from(&path).unwrap();

        std::fs::write(&path, "[gateway]\nport = 9000\n").unwrap();
        assert!(!write_default_config(&config_dir).unwrap());
        assert!(std::fs::read_to_string(&path).unwrap().contains("9000"));
    }
}
