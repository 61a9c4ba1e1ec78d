use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use reframe_analysis::{AnalysisOptions, AnalysisService, DistortionCatalog, OllamaProvider};
use reframe_config::ReframeConfig;
use reframe_gateway::{AppState, start_server};
use reframe_ocr::OcrEngine;
use reframe_storage::{EntryStore, ImageStore, TextStore};

#[derive(Parser)]
#[command(name = "reframed")]
#[command(about = "Reframe — CBT journaling backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Reframe API server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show the status of a running instance
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = reframe_config::config_file_path(&reframe_config::config_dir());
    let config = reframe_config::load_and_prepare(&config_path).await?;

    logging::init(
        &config.logging.dir,
        &config.logging.level,
        config.server.debug,
    );

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
            }
            run_server(config).await?;
        }
        Commands::Status => {
            let client = reqwest::Client::new();
            match client
                .get(format!("http://localhost:{}/health", config.server.port))
                .send()
                .await
            {
                Ok(resp) => {
                    let body: serde_json::Value = resp.json().await?;
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                Err(_) => {
                    println!("Reframe is not running on port {}", config.server.port);
                }
            }
        }
    }

    Ok(())
}

async fn run_server(config: ReframeConfig) -> Result<()> {
    info!(
        host = %config.server.host,
        port = config.server.port,
        data_dir = %config.storage.data_dir.display(),
        model = %config.model.chat_model,
        "Starting Reframe backend"
    );

    let catalog = Arc::new(DistortionCatalog::load(config.storage.catalog_path.as_deref()).await?);
    info!(distortions = catalog.definitions().len(), "Distortion catalog ready");

    let timeout = Duration::from_secs(config.model.timeout_secs);
    let provider = Arc::new(OllamaProvider::new(config.model.base_url.clone(), timeout)?);
    info!(base_url = %config.model.base_url, "Registered Ollama provider");

    let entry_store = Arc::new(EntryStore::new(
        config.storage.entries_path(),
        config.storage.corpus_path(),
    ));
    let text_store = Arc::new(TextStore::new(config.storage.full_text_path()));
    let image_store = Arc::new(ImageStore::new(config.storage.images_dir()));
    let ocr = Arc::new(OcrEngine::new(
        config.model.base_url.clone(),
        config.model.vision_model.clone(),
        timeout,
    )?);

    let analysis = Arc::new(AnalysisService::new(
        Arc::clone(&catalog),
        provider,
        Arc::clone(&entry_store),
        AnalysisOptions {
            model: config.model.chat_model.clone(),
            max_tokens: config.model.max_tokens,
            temperature: config.model.temperature,
        },
    ));

    let state = Arc::new(AppState {
        catalog,
        analysis,
        entry_store,
        text_store,
        image_store,
        ocr,
    });

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid bind address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    start_server(addr, state, &config.server.cors_origins).await
}
