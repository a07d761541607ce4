use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use cag_server::{
    config::Config,
    documents::LopdfExtractor,
    llm::LlmQueryService,
    routes::create_router,
    store::DocumentStore,
    utils::init_logger,
    AppState,
};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

/// Cache-augmented generation server
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Directory for staged uploads (overrides UPLOAD_DIR)
    #[arg(long)]
    upload_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env()?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(dir) = cli.upload_dir {
        config.upload.dir = dir;
    }

    let _log_guard = init_logger(&config.logging);
    info!("Configuration loaded: {:?}", config.server);

    tokio::fs::create_dir_all(&config.upload.dir)
        .await
        .with_context(|| format!("Failed to create upload directory {}", config.upload.dir.display()))?;
    info!(
        upload_dir = %config.upload.dir.display(),
        max_file_size_mb = config.upload.max_file_size_mb(),
        "Upload staging ready"
    );

    let query_service = LlmQueryService::from_config(&config.llm)
        .map_err(|e| anyhow::anyhow!("Failed to configure LLM: {}", e))?;
    info!(provider = %config.llm.provider, model = %config.llm.model, "LLM configured");

    // Create shared state
    let state = AppState {
        config: config.clone(),
        store: DocumentStore::new(),
        extractor: Arc::new(LopdfExtractor),
        query_service: Arc::new(query_service),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.server.host, config.server.port))?;
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
