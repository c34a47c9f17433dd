//! Main entry point for XML Translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xml_translator::cli::commands::{self, Commands};
use xml_translator::TranslatorConfig;

/// XML Translator - translate the text and attributes of XML documents
#[derive(Parser, Debug)]
#[command(name = "xml-translator", version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Translation endpoint (defaults to TRANSLATE_ENDPOINT env var)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// JSON configuration file (overrides environment variables)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .ok()
                .filter(|_| !args.verbose)
                .unwrap_or_else(|| {
                    format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), log_level).into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match &args.config {
        Some(path) => TranslatorConfig::from_file(path)?,
        None => TranslatorConfig::load()?,
    };

    // Override config with CLI args if provided
    if let Some(endpoint) = args.endpoint {
        config.api_endpoint = endpoint;
    }

    // Execute command
    match args.command {
        Some(Commands::Translate {
            path,
            source_lang,
            target_lang,
            recursive,
        }) => {
            commands::handle_translate(config, path, source_lang, target_lang, recursive).await?;
        }
        Some(Commands::Count { path, recursive }) => {
            commands::handle_count(config, path, recursive).await?;
        }
        None => {
            commands::handle_translate(
                config,
                PathBuf::from(commands::DEFAULT_INPUT),
                None,
                None,
                false,
            )
            .await?;
        }
    }

    Ok(())
}
