//! `prepwise serve`: Start the HTTP API server.

use prepwise_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("📘 prepwise gateway");
    println!("   Listening:    {}:{}", config.gateway.host, config.gateway.port);
    println!("   Store:        {}", config.store.backend);
    println!(
        "   Day range:    {}..={}",
        config.planner.min_days, config.planner.max_days
    );
    println!("   Admin tokens: {}", config.gateway.admin_tokens.len());

    prepwise_gateway::start(config).await?;

    Ok(())
}
