//! Indic Translate CLI - Command line tool for translating Indian-language text.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use indic_translate_core::{
    AppConfig, HealthStatus, Lang, TranslateRequest, TranslationRouter, build_router,
    supported_languages,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "indic-translate")]
#[command(author, version, about = "Translate text between Indian languages", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Inference API base URL
    #[arg(long, global = true, env = "INDIC_TRANSLATE_API_BASE")]
    api_base: Option<String>,

    /// Inference API key
    #[arg(long, global = true, env = "INDIC_TRANSLATE_API_KEY")]
    api_key: Option<String>,

    /// Maximum number of models kept in memory
    #[arg(long, global = true)]
    max_models: Option<usize>,

    /// Disable pivot translation through the bridge language
    #[arg(long, global = true)]
    no_pivot: bool,

    /// Route every pair through one multilingual model (e.g. facebook/nllb-200-distilled-600M)
    #[arg(long, global = true)]
    multilingual_model: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate a single text
    Translate {
        text: String,

        /// Source language code (detected if omitted)
        #[arg(short = 's', long)]
        source: Option<String>,

        /// Target language code
        #[arg(short = 't', long, default_value = "en")]
        target: String,

        /// Do not detect the source language; assume the bridge language
        #[arg(long)]
        no_detect: bool,
    },

    /// Translate a file, one text per line, printing JSON lines
    Batch {
        file: PathBuf,

        /// Source language code (detected per line if omitted)
        #[arg(short = 's', long)]
        source: Option<String>,

        /// Target language code
        #[arg(short = 't', long, default_value = "en")]
        target: String,
    },

    /// Detect the language of a text
    Detect { text: String },

    /// List directly supported translation pairs
    Pairs,

    /// List supported languages
    Languages,

    /// Run a canary translation and report readiness
    Health,
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };

    // Override config with CLI arguments
    if let Some(ref api_base) = args.api_base {
        config.backend.api_base.clone_from(api_base);
    }
    if args.api_key.is_some() {
        config.backend.api_key.clone_from(&args.api_key);
    }
    if let Some(max_models) = args.max_models {
        config.cache.max_models = max_models;
    }
    if args.no_pivot {
        config.routing.pivot = false;
    }
    if args.multilingual_model.is_some() {
        config.models.multilingual.clone_from(&args.multilingual_model);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

// CLI output is intentional
#[allow(clippy::print_stdout)]
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// JSON lines go to stdout, progress to stderr
#[allow(clippy::print_stdout)]
async fn run_batch(
    router: &TranslationRouter,
    file: &Path,
    source: Option<Lang>,
    target: Lang,
) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .context(format!("Failed to read input: {}", file.display()))?;
    let lines: Vec<&str> = content.lines().collect();
    info!("Translating {} lines from {}", lines.len(), file.display());

    // Setup progress bar
    #[allow(clippy::cast_possible_truncation)]
    let pb = ProgressBar::new(lines.len() as u64);
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut failed = 0usize;
    for line in lines {
        let request = TranslateRequest {
            text: line.to_string(),
            source: source.clone(),
            target: target.clone(),
            auto_detect: true,
        };
        let result = router.translate(&request).await;
        if !result.success {
            failed += 1;
        }

        let line = serde_json::to_string(&result)?;
        pb.suspend(|| println!("{line}"));
        pb.inc(1);
    }

    pb.finish_with_message("Translation complete");

    if failed > 0 {
        info!("{} lines failed to translate", failed);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = load_config(&args)?;
    let router = build_router(&config).context("Failed to initialize translation router")?;

    match args.command {
        Command::Translate {
            text,
            source,
            target,
            no_detect,
        } => {
            let request = TranslateRequest {
                text,
                source: source.map(Lang::new),
                target: Lang::new(target),
                auto_detect: !no_detect,
            };
            let result = router.translate(&request).await;
            print_json(&result)?;
            router.unload_all().await;

            if !result.success {
                anyhow::bail!(result.error.unwrap_or_else(|| "translation failed".to_string()));
            }
        }
        Command::Batch {
            file,
            source,
            target,
        } => {
            run_batch(&router, &file, source.map(Lang::new), Lang::new(target)).await?;
            router.unload_all().await;
        }
        Command::Detect { text } => {
            print_json(&router.language_info(&text))?;
        }
        Command::Pairs => {
            print_json(&router.supported_pairs())?;
        }
        Command::Languages => {
            print_json(&supported_languages())?;
        }
        Command::Health => {
            let report = router.health_check().await;
            print_json(&report)?;
            router.unload_all().await;

            if report.status == HealthStatus::Unhealthy {
                anyhow::bail!("Translation service is unhealthy");
            }
        }
    }

    Ok(())
}
