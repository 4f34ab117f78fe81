use anyhow::Context;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};
use tracing::info;
use weather_core::{Config, WeatherAssistant};

use crate::http::{self, AppState, QueryResponse};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-query", version, about = "Natural-language weather queries")]
pub struct Cli {
    /// Path to a config file; defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP service.
    Serve {
        /// Listen address, e.g. "127.0.0.1:3000". Overrides the config file.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Answer a single query and print the JSON payload.
    Ask {
        /// Free-text weather question.
        query: String,
    },

    /// Store the language-service API key in the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => Config::config_file_path()?,
        };

        match self.command {
            Command::Configure => configure(&path),
            Command::Serve { bind } => {
                let mut config = Config::load_from(&path)?.with_env_overrides();
                if let Some(bind) = bind {
                    config.server.bind = bind;
                }
                serve(config).await
            }
            Command::Ask { query } => {
                let config = Config::load_from(&path)?.with_env_overrides();
                let assistant = WeatherAssistant::from_config(&config)?;
                let outcome = assistant.handle(&query).await?;

                let json = serde_json::to_string_pretty(&QueryResponse::from(outcome))?;
                println!("{json}");
                Ok(())
            }
        }
    }
}

fn configure(path: &std::path::Path) -> anyhow::Result<()> {
    // env overrides are deliberately not applied so they never end up on disk
    let mut config = Config::load_from(path)?;

    let api_key = inquire::Password::new("Language service API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());

    let model = inquire::Text::new("Model:")
        .with_default(&config.language_model.model)
        .prompt()
        .context("Failed to read model name")?;
    config.language_model.model = model.trim().to_string();

    config.save_to(path)?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    if config.api_key().is_none() {
        tracing::warn!("No language-service API key configured; queries will fail until one is set");
    }

    let assistant = WeatherAssistant::from_config(&config)?;
    let app = http::router(AppState { assistant: Arc::new(assistant) });

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
