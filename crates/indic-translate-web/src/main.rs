//! Indic Translate Web - JSON API server for translating Indian-language text.

mod helpers;
mod routes;
mod state;

use anyhow::{Context, Result};
use clap::Parser;
use indic_translate_core::AppConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "indic-translate-web")]
#[command(author, version, about = "Indic Translate Web Server", long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Inference API base URL
    #[arg(long, env = "INDIC_TRANSLATE_API_BASE")]
    api_base: Option<String>,

    /// Inference API key
    #[arg(long, env = "INDIC_TRANSLATE_API_KEY")]
    api_key: Option<String>,

    /// Maximum number of models kept in memory
    #[arg(long)]
    max_models: Option<usize>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging with per-crate filtering
    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_level},hyper=warn,reqwest=warn")));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };

    if let Some(api_base) = args.api_base {
        config.backend.api_base = api_base;
    }
    if args.api_key.is_some() {
        config.backend.api_key = args.api_key;
    }
    if let Some(max_models) = args.max_models {
        config.cache.max_models = max_models;
    }

    let state = Arc::new(
        AppState::new(config).context("Failed to initialize application state")?,
    );
    info!(
        "Model cache capacity: {}, pivot through {}: {}",
        state.config.cache.max_models,
        state.config.routing.bridge_lang,
        state.config.routing.pivot
    );

    let app = routes::api(Arc::clone(&state)).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(CompressionLayer::new()),
    );

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, unloading models");
    state.router.unload_all().await;

    Ok(())
}
