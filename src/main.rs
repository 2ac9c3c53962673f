// Main entry point
use clap::Parser;
use colored::Colorize;
use grid_copilot::application::cancel::CancelToken;
use grid_copilot::domain::model::{Intent, Query, TranscriptionRequest};
use grid_copilot::infrastructure::config::{self, load_config};
use grid_copilot::interfaces::api::{ProcessResponse, TranscriptionResponse};
use grid_copilot::interfaces::cli::Cli;
use grid_copilot::state::AppState;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cancel = CancelToken::new();

    // Ctrl-C cancels the in-flight request; the pipeline still answers.
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("Failed to listen for shutdown signal: {}", e);
        } else {
            eprintln!("\nInterrupted, cancelling request...");
            signal_token.cancel();
        }
    });

    let cli = Cli::parse();

    if cli.generate_config {
        config::generate_config_sample()?;
        return Ok(());
    }

    let config = load_config()?;

    if config.logging.enable {
        init_logging(&config.logging)?;
    }

    let state = AppState::build(config).await?;

    if cli.status {
        print_status(&state);
        return Ok(());
    }

    if let Some(text) = &cli.speak {
        let result = state.synthesis.synthesize(text, cli.text_language()).await;
        let Some(clip) = result.payload else {
            anyhow::bail!("no audio produced");
        };
        tokio::fs::write(&cli.output, &clip.bytes).await?;
        eprintln!(
            "{} {} ({} bytes, engine {})",
            "Wrote".green(),
            cli.output.display(),
            clip.bytes.len(),
            result.engine.cyan()
        );
        return Ok(());
    }

    if let Some(path) = &cli.transcribe {
        let request = TranscriptionRequest {
            audio: tokio::fs::read(path).await?,
            format: audio_format(path),
            language: cli.transcription_language(),
        };
        let result = TranscriptionResponse::from(state.transcription.transcribe(&request).await);
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else if result.success {
            println!("{} [{}]", result.text, result.language.cyan());
            if result.original_text != result.text {
                println!("  {}", result.original_text.dimmed());
            }
        } else {
            eprintln!("{}", "Transcription failed".red());
        }
        return Ok(());
    }

    let Some(text) = cli.query_text() else {
        eprintln!("{}", "Please provide a query".red());
        std::process::exit(1);
    };

    let mut query = Query::new(text, cli.text_language());
    if let Some(role) = &cli.role {
        query = query.with_role(role);
    }

    let response = ProcessResponse::from(state.pipeline.process(&query, &cancel).await);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }

    Ok(())
}

fn audio_format(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "wav".to_string())
}

/// Initialize logging with path and level configuration
fn init_logging(logging: &config::Logging) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter_directive()));

    if let Some(path) = &logging.path {
        if !path.is_empty() {
            // Log to file
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file)
                .init();
            return Ok(());
        }
    }

    // Log to stderr (default)
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn print_response(response: &ProcessResponse) {
    let intent = match response.intent {
        Intent::Unclassified => response.intent.as_str().yellow(),
        _ => response.intent.as_str().green(),
    };
    println!("{} {}", "▶".cyan(), intent.bold());
    println!();
    println!("{}", response.response);

    if let Some(english) = &response.english_response {
        if response.translated_response.is_some() && english != &response.response {
            println!();
            println!("{}", english.dimmed());
        }
    }

    if response.degraded {
        eprintln!();
        eprintln!("{}", "Some steps were skipped; see logs for details.".yellow());
    }
}

fn print_status(state: &AppState) {
    println!("{}", "copilot Status".green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!(
        "Config: {}",
        config::get_config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "Not found".to_string())
    );
    println!("Pivot language: {}", state.pipeline.pivot());
    println!(
        "Classifier: {}",
        state.pipeline.classifier().strategy().as_str()
    );

    let config = &state.config;
    let tiers = [
        ("Translation", &config.translation),
        ("Synthesis", &config.synthesis),
        ("Transcription", &config.transcription),
    ];
    for (name, tier) in tiers {
        let ids: Vec<&str> = tier.engines.iter().map(|e| e.id.as_str()).collect();
        let listed = if ids.is_empty() {
            "none".red().to_string()
        } else {
            ids.join(" → ")
        };
        println!("{}: {}", name, listed);
    }

    println!();
    for intent in Intent::DOMAIN {
        match config.service_for(intent) {
            Some(service) => {
                let roles = if service.allowed_roles.is_empty() {
                    "any role".to_string()
                } else {
                    service.allowed_roles.join(", ")
                };
                println!("{}: {} ({})", intent.label(), service.url, roles.dimmed());
            }
            None => println!("{}: {}", intent.label(), "Not configured".red()),
        }
    }
}
