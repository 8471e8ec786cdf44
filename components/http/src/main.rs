// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use intentd::classifier::ClassifierBackend;
use intentd::{logging, ClassifierState, HttpService, HttpServiceConfig, ServiceConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host for the HTTP service
    #[arg(long)]
    host: Option<String>,

    /// Port number for the HTTP service
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// HuggingFace model id for the intent checkpoint
    #[arg(long)]
    model_id: Option<String>,

    /// Local directory holding config.json, model.safetensors and tokenizer.json
    #[arg(long)]
    model_path: Option<PathBuf>,

    /// Maximum sequence length for tokenization
    #[arg(long)]
    max_length: Option<usize>,

    /// Allowed cross-origin front-end URL (repeatable)
    #[arg(long = "allow-origin")]
    allow_origin: Vec<String>,

    /// Serve the keyword mock classifier instead of a real model
    #[arg(long, default_value = "false")]
    mock: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    validate_args(&args)?;
    let config = resolve_config(args)?;

    let state = Arc::new(ClassifierState::new(config.classifier.clone()));

    let http_config = HttpServiceConfig::builder()
        .host(config.host.clone())
        .port(config.port)
        .allowed_origins(config.allowed_origins.clone())
        .build()?;

    let service = HttpService::new(state, http_config)?;

    let cancel_token = CancellationToken::new();
    let shutdown = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            shutdown.cancel();
        }
    });

    service.run(cancel_token).await
}

fn validate_args(args: &Args) -> Result<()> {
    if let Some(max_length) = args.max_length {
        if max_length == 0 {
            anyhow::bail!("Max sequence length must be greater than 0");
        }
    }

    if let Some(model_path) = &args.model_path {
        if !model_path.is_dir() {
            anyhow::bail!("Model path {} is not a directory", model_path.display());
        }
    }

    if let Some(config) = &args.config {
        if !config.is_file() {
            anyhow::bail!("Config file {} does not exist", config.display());
        }
    }

    Ok(())
}

/// Layer CLI/env overrides on top of the optional config file.
fn resolve_config(args: Args) -> Result<ServiceConfig> {
    let mut config = match &args.config {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };

    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if !args.allow_origin.is_empty() {
        config.allowed_origins = args.allow_origin;
    }

    if args.mock {
        config.classifier.backend = ClassifierBackend::Mock;
    }
    if let Some(model_id) = args.model_id {
        config.classifier.model_id = Some(model_id);
        config.classifier.model_path = None;
    }
    if let Some(model_path) = args.model_path {
        config.classifier.model_path = Some(model_path);
    }
    if let Some(max_length) = args.max_length {
        config.classifier.max_length = max_length;
    }

    Ok(config)
}
