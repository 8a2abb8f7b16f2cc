mod api;
mod cli;
mod config;
mod error;
mod models;
mod pipeline;
mod server;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use config::{Config, LogConfig, LogFormat};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => cli.apply(config),
        Err(e) => {
            // Logging is not set up yet; make sure the reason reaches the console.
            eprintln!("Error: {}", e);
            return Err(e).context("failed to load configuration");
        },
    };

    // Keep the guard alive so buffered file logs are flushed on exit.
    let _guard = init_logging(&config.log).context("failed to initialize logging")?;

    info!("Starting LLM code deployment agent...");
    info!(
        "Using Gemini model {} and GitHub API at {}",
        config.gemini.model, config.github.api_url
    );

    if let Err(e) = server::serve(&config).await {
        error!("Server failed: {:?}", e);
        return Err(e).context("server error");
    }

    Ok(())
}

/// Console logging filtered by `RUST_LOG` (default `info`), plus an optional daily log file.
fn init_logging(log: &LogConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = match log.format {
        LogFormat::Json => fmt::layer().json().with_filter(filter()).boxed(),
        LogFormat::Text => fmt::layer().with_filter(filter()).boxed(),
    };

    let (file, guard) = match &log.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create log directory {}", dir))?;
            let appender = tracing_appender::rolling::daily(dir, "app-deployer.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter())
                .boxed();
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    Ok(guard)
}
