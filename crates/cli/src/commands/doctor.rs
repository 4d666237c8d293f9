//! `echomind doctor` — connectivity and configuration diagnostics.

use echomind_config::AppConfig;
use echomind_core::generation::Generator;
use echomind_providers::OllamaClient;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("echomind doctor");
    println!("===============\n");

    let mut issues = 0;

    // Config file
    let config_path = AppConfig::config_dir().join("config.toml");
    let config = if config_path.exists() {
        match AppConfig::load() {
            Ok(config) => {
                println!("  ok   Config file valid ({})", config_path.display());
                config
            }
            Err(e) => {
                println!("  FAIL Config file invalid: {e}");
                return Err(e.into());
            }
        }
    } else {
        println!("  --   No config file, using defaults (run `echomind onboard`)");
        AppConfig::default()
    };

    // Generation endpoint
    let generator = OllamaClient::new(&config.host, config.port, config.request_timeout());
    match generator.health_check().await {
        Ok(()) => println!("  ok   Generation endpoint reachable at {}", config.endpoint_url()),
        Err(e) => {
            println!("  FAIL Generation endpoint: {e}");
            issues += 1;
        }
    }

    // Memory store
    let gateway = super::build_gateway(&config);
    match gateway.health_check().await {
        Ok(()) => println!(
            "  ok   Memory store reachable ({}, namespace '{}')",
            gateway.store_name(),
            gateway.user_id()
        ),
        Err(e) => {
            println!("  FAIL Memory store: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed.");
    } else {
        println!("  {issues} issue(s) found. Checklist:");
        println!("  1. Is the generation endpoint running at {}?", config.endpoint_url());
        println!("  2. Is the memory sidecar running at {}?", config.memory.base_url);
        println!(
            "  3. Are the models ({}, {}, {}) pulled on their endpoints?",
            config.model, config.memory.llm_model, config.memory.embedding_model
        );
        println!("  4. Is the store path ('{}') writable?", config.memory.path);
    }

    Ok(())
}
