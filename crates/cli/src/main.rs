mod cli;
mod terminal;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use pdfrag_core::{config::load_dotenv, Config};
use pdfrag_llm::OllamaStatus;
use pdfrag_service::RagService;
use tracing::{error, info};

use crate::cli::{CliArgs, Command};
use crate::terminal::Terminal;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    // The question loop keeps logs quiet so they do not interleave with answers.
    let default_filter = if args.command.is_none() { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let mut config = Config::from_env();
    if let Some(size) = args.chunk_size {
        config.chunking.chunk_size = size;
    }
    if let Some(overlap) = args.chunk_overlap {
        config.chunking.chunk_overlap = overlap;
    }
    // Reject bad chunk parameters before touching the backend.
    config.chunking.params()?;
    config.log_summary();

    let terminal = Terminal::new();

    match args.command {
        Some(Command::Status) => {
            let status = OllamaStatus::new(&config.ollama.base_url)
                .report(&config.required_models())
                .await;
            terminal.print_status(&status)?;
            if !status.is_ready() {
                bail!("Ollama is not ready");
            }
            Ok(())
        }
        Some(Command::Index { pdf_dir }) => {
            if let Some(dir) = pdf_dir {
                config.storage.pdf_dir = dir;
            }
            preflight(&config, &terminal).await?;
            config
                .storage
                .ensure_dirs()
                .context("failed to create PDF and storage directories")?;

            let mut service = RagService::from_config(&config);
            let report = service
                .index(&config.storage.pdf_dir, config.chunking.chunk_size, config.chunking.chunk_overlap)
                .await
                .context("indexing failed")?;
            terminal.print_report(&report)?;
            Ok(())
        }
        Some(Command::Serve { host, port }) => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            config
                .storage
                .ensure_dirs()
                .context("failed to create PDF and storage directories")?;

            let service = RagService::open(&config).context("failed to open the index")?;
            let state = Arc::new(pdfrag_server::AppState::new(config, service));
            pdfrag_server::serve(state, &host, port).await
        }
        None => interactive(config, &terminal).await,
    }
}

/// Check that Ollama is up with every required model, printing pull hints
/// otherwise.
async fn preflight(config: &Config, terminal: &Terminal) -> Result<()> {
    let status = OllamaStatus::new(&config.ollama.base_url)
        .report(&config.required_models())
        .await;
    if status.is_ready() {
        info!("Ollama {} ready at {}", status.version.as_deref().unwrap_or("?"), status.base_url);
        return Ok(());
    }
    terminal.print_status(&status)?;
    bail!("Ollama is not ready; start it and pull the missing models, then try again")
}

async fn interactive(config: Config, terminal: &Terminal) -> Result<()> {
    preflight(&config, terminal).await?;
    config
        .storage
        .ensure_dirs()
        .context("failed to create PDF and storage directories")?;

    let mut service = RagService::open(&config).context("failed to open the index")?;
    terminal.print_banner(
        &config.ollama.model,
        &config.ollama.embedding_model,
        &config.storage.pdf_dir.display().to_string(),
    )?;

    if !service.is_loaded() {
        terminal.print_info("No index found. Building one now...")?;
        let spinner = terminal.start_spinner("Indexing")?;
        let result = service.index_with_defaults().await;
        spinner.stop();
        let report = result.context("indexing failed")?;
        terminal.print_report(&report)?;
    }

    while let Some(question) = terminal.read_input()? {
        if question.is_empty() {
            continue;
        }

        let spinner = terminal.start_spinner("Thinking")?;
        let result = service.query(&question).await;
        spinner.stop();

        match result {
            Ok(answer) => terminal.print_answer(&answer)?,
            Err(e) => {
                error!("Query failed: {}", e);
                terminal.print_error(&e.to_string())?;
                if e.is_backend_unavailable() {
                    terminal.print_info(&format!("Is Ollama running at {}?", config.ollama.base_url))?;
                }
            }
        }
    }

    terminal.print_info("Goodbye.")?;
    Ok(())
}
