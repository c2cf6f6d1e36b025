use anyhow::Context;
use clap::Parser;
use nltask_core::error::{CoreError, ExtractionError};
use nltask_core::extraction::OpenRouterExtractor;
use nltask_core::service::TaskService;
use nltask_core::store::JsonFileStore;
use nltask_core::timezone::resolve_timezone;
use owo_colors::{OwoColorize, Style};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod cli;
mod config;

const DEFAULT_LOG_FILTER: &str = "nltask=info,nltask_core=info";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = cli::Cli::parse();

    if let Err(e) = run(cli).await {
        handle_error(e);
        std::process::exit(1);
    }
}

async fn run(cli: cli::Cli) -> anyhow::Result<()> {
    let config = config::Config::new(&cli).context("Failed to load configuration")?;

    let timezone = resolve_timezone(config.timezone.as_deref())?;
    info!("Resolving dates in timezone {}", timezone);

    let store = JsonFileStore::open(config.data_file.clone()).await?;

    if config.extraction.api_key.is_none() {
        warn!("No OpenRouter API key configured; tasks will be stored without extracted fields");
    }
    let extractor = OpenRouterExtractor::new(config.extraction.clone())?;

    let service = Arc::new(TaskService::new(
        Arc::new(store),
        Arc::new(extractor),
        timezone,
    ));
    let app = api::build_router(service);

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::InvalidTimezone(s) => {
                eprintln!("{} Invalid timezone: {}", "Error:".style(error_style), s);
            }
            CoreError::Io(e) => {
                eprintln!("{} Cannot access task file: {}", "Error:".style(error_style), e);
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), core_error),
        }
    } else if let Some(extraction_error) = err.downcast_ref::<ExtractionError>() {
        eprintln!(
            "{} Extraction client setup failed: {}",
            "Error:".style(error_style),
            extraction_error.yellow()
        );
    } else {
        eprintln!("{} {:#}", "Error:".style(error_style), err);
    }
}
