//! `echomind chat` — interactive or single-message chat mode.

use echomind_assistant::{Session, SessionEvent, TurnOrchestrator, TurnSettings};
use echomind_config::AppConfig;
use echomind_core::input::InputSource;
use echomind_memory::MemoryWriter;
use echomind_providers::OllamaClient;
use std::io::Write;
use std::sync::Arc;

pub async fn run(
    message: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    model: Option<String>,
    temp: Option<f32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Command-line overrides, validated like file values.
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(model) = model {
        config.model = model;
    }
    if let Some(temp) = temp {
        config.temperature = temp;
    }
    config.validate().map_err(|e| format!("Invalid settings: {e}"))?;

    let generator = Arc::new(OllamaClient::new(
        &config.host,
        config.port,
        config.request_timeout(),
    ));
    let memory = super::build_gateway(&config);
    let writer = MemoryWriter::spawn(memory.clone(), echomind_memory::writer::DEFAULT_QUEUE_CAPACITY);

    let persona = config.persona();
    let persona_name = persona.name.clone();
    let orchestrator = Arc::new(TurnOrchestrator::new(
        generator,
        memory,
        writer,
        persona,
        TurnSettings::from_config(&config),
        config.stm_capacity,
    ));

    if let Some(message) = message {
        run_single(&orchestrator, &config, &message, &persona_name).await
    } else {
        run_interactive(orchestrator, &config, &persona_name).await
    }
}

/// Single-message mode: one turn, streamed to stdout.
async fn run_single(
    orchestrator: &Arc<TurnOrchestrator>,
    config: &AppConfig,
    message: &str,
    persona_name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    preflight(orchestrator, config).await?;

    print!("{persona_name} > ");
    std::io::stdout().flush()?;

    let mut printed = 0usize;
    let mut sink = |full: &str| {
        print!("{}", &full[printed..]);
        printed = full.len();
        let _ = std::io::stdout().flush();
    };

    match orchestrator.process_turn(message, &mut sink).await {
        Ok(_) => println!(),
        Err(e) => println!("\n[system] {}", e.user_message()),
    }
    Ok(())
}

/// Interactive mode: drive a session over the console input source.
async fn run_interactive(
    orchestrator: Arc<TurnOrchestrator>,
    config: &AppConfig,
    persona_name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    preflight(&orchestrator, config).await?;

    println!();
    println!("  echomind — {persona_name} is listening");
    println!();
    println!("  Endpoint:  {}", config.endpoint_url());
    println!("  Model:     {}", config.model);
    println!("  Memory:    {} (namespace '{}')", config.memory.provider, config.memory.user_id);
    println!("  Recent:    {} turns kept", config.stm_capacity);
    println!();
    println!("  Type your message and press Enter.");
    println!("  '/clear' forgets the recent conversation; 'exit' or Ctrl+D quits.");
    println!();

    let source = ConsoleInput::new(orchestrator.clone());
    let mut session = Session::new(orchestrator, Box::new(source));

    // Streamed output: print only the unseen suffix of the cumulative text.
    let mut printed = 0usize;
    let persona_label = persona_name.to_string();
    session
        .run(move |event| match event {
            SessionEvent::Heard(_) => {
                print!("\n{persona_label} > ");
                printed = 0;
                let _ = std::io::stdout().flush();
            }
            SessionEvent::Token(full) => {
                print!("{}", &full[printed..]);
                printed = full.len();
                let _ = std::io::stdout().flush();
            }
            SessionEvent::Completed(_) => {
                println!();
            }
            SessionEvent::System(notice) => {
                println!("[system] {notice}");
            }
        })
        .await;

    println!("\nGoodbye.");
    Ok(())
}

/// Fail fast with the troubleshooting checklist if either collaborator is
/// unreachable.
async fn preflight(
    orchestrator: &Arc<TurnOrchestrator>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = echomind_assistant::preflight(orchestrator).await {
        eprintln!();
        eprintln!("  ERROR: {e}");
        eprintln!();
        eprintln!("  Checklist:");
        eprintln!("  1. Is the generation endpoint running at {}?", config.endpoint_url());
        eprintln!("  2. Is the memory sidecar running at {}?", config.memory.base_url);
        eprintln!(
            "  3. Are the models ({}, {}, {}) available on their endpoints?",
            config.model, config.memory.llm_model, config.memory.embedding_model
        );
        eprintln!("  4. Is the store path ('{}') writable?", config.memory.path);
        eprintln!("  5. Does {} exist? Run `echomind onboard` to create it.",
            AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err(Box::new(e));
    }
    Ok(())
}

/// Console implementation of the input seam: blocking line reads, with the
/// buffer-management command handled locally.
struct ConsoleInput {
    orchestrator: Arc<TurnOrchestrator>,
}

impl ConsoleInput {
    fn new(orchestrator: Arc<TurnOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

impl InputSource for ConsoleInput {
    fn text(&mut self) -> Option<String> {
        loop {
            print!("  You > ");
            let _ = std::io::stdout().flush();

            let mut line = String::new();
            match std::io::stdin().read_line(&mut line) {
                Ok(0) => return None, // EOF (Ctrl+D)
                Ok(_) => {}
                Err(_) => return None,
            }

            let line = line.trim();
            match line {
                "exit" | "quit" | "/exit" | "/quit" => return None,
                "/clear" => {
                    self.orchestrator.clear_short_term();
                    println!("  (recent conversation cleared)");
                    continue;
                }
                _ => return Some(line.to_string()),
            }
        }
    }

    fn shutdown(&mut self) {}
}

