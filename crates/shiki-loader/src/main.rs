//! # shiki-lookup
//!
//! Resolves resources through a [`ShikiLoader`] and prints them as JSON.
//!
//! ```text
//! shiki-lookup --config loader.yaml video:42 anime:1 ranobe:7
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{Map, Value};
use shiki_loader::observability::{describe_metrics, init_logging, parse_log_level, LoggingConfig};
use shiki_loader::{LoaderConfig, ResourceKey, ShikiLoader};

/// Look up shiki editor resources in batches.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// YAML configuration file. Environment variables (`SHIKI_*`) apply on top.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Resources to resolve, as `KIND:ID` (e.g. `video:42`).
    #[arg(required = true, value_parser = parse_key)]
    keys: Vec<ResourceKey>,
}

fn parse_key(raw: &str) -> Result<ResourceKey, String> {
    match raw.split_once(':') {
        Some((kind, id)) if !kind.is_empty() && !id.is_empty() => Ok(ResourceKey::new(kind, id)),
        _ => Err(format!("expected KIND:ID, got '{raw}'")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => LoaderConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => LoaderConfig::from_env().context("loading configuration from environment")?,
    };

    let logging = if config.logging.json {
        LoggingConfig::json()
    } else {
        LoggingConfig::text()
    };
    init_logging(logging.with_level(parse_log_level(&config.logging.level)));
    describe_metrics();

    let loader = ShikiLoader::from_settings(&config.loader)?;
    tracing::info!(
        origin = %loader.origin(),
        keys = cli.keys.len(),
        "Resolving resources"
    );

    let lookups = cli.keys.iter().cloned().map(|key| loader.fetch_key(key));
    let results = futures::future::join_all(lookups).await;

    let mut output = Map::new();
    for (key, result) in cli.keys.iter().zip(results) {
        let value = match result {
            Ok(Some(resource)) => Value::Object(resource.into_fields()),
            Ok(None) => Value::Null,
            Err(err) => serde_json::json!({ "error": err.to_string() }),
        };
        output.insert(key.to_string(), value);
    }

    loader.shutdown();
    println!("{}", serde_json::to_string_pretty(&Value::Object(output))?);

    Ok(())
}
