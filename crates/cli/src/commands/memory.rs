//! `echomind memory` — long-term store administration.

use echomind_config::AppConfig;
use echomind_memory::LongTermMemory;

pub async fn search(query: &str, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let gateway = super::build_gateway(&config);

    println!("Searching long-term memory for: \"{query}\"");
    println!();

    let hits = gateway.search(query, limit).await?;
    println!("{}", LongTermMemory::render(&hits));
    if !hits.is_empty() {
        println!("\n{} result(s)", hits.len());
    }

    Ok(())
}

pub async fn reset(confirmed: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !confirmed {
        println!(
            "This deletes every memory in namespace '{}'. Re-run with --yes to confirm.",
            config.memory.user_id
        );
        return Ok(());
    }

    let gateway = super::build_gateway(&config);
    gateway.reset().await?;
    println!("Namespace '{}' reset.", config.memory.user_id);

    Ok(())
}
