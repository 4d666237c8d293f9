//! `echomind onboard` — first-time setup.

use echomind_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("echomind — first-time setup");
    println!("===========================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("  Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n  Config already exists at: {}", config_path.display());
        println!("  Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("  Created config.toml at: {}", config_path.display());
        println!("\n  Next steps:");
        println!("  1. Point `host`/`port` at your generation endpoint");
        println!("  2. Point `[memory] base_url` at your memory sidecar");
        println!("  3. Run: echomind doctor");
        println!("  4. Run: echomind chat\n");
    }

    Ok(())
}
