mod audio;
mod classifier;
mod config;
mod features;
mod labels;
mod server;

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{error, info};

use classifier::EmotionClassifier;
use labels::LabelVocabulary;

/// HTTP service for speech emotion classification
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the ONNX classifier artifact
    #[arg(short, long, env = "EMOTION_MODEL_PATH")]
    model: Option<PathBuf>,

    /// Path to the label vocabulary (defaults to labels.json next to the model)
    #[arg(short, long, env = "EMOTION_LABELS_PATH")]
    labels: Option<PathBuf>,

    /// Socket address to serve on
    #[arg(short, long, default_value = "127.0.0.1:7102")]
    bind: SocketAddr,

    /// Number of threads for ONNX inference
    #[arg(long, default_value = "1")]
    threads: i32,

    /// Write the default label vocabulary to the labels path and exit
    #[arg(long)]
    init_labels: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let model_path = match &args.model {
        Some(path) => path.clone(),
        None => config::default_model_path()?,
    };
    let labels_path = match &args.labels {
        Some(path) => path.clone(),
        None => config::default_labels_path(&model_path),
    };

    if args.init_labels {
        LabelVocabulary::observed_emotions().save(&labels_path)?;
        info!("Wrote default label vocabulary to {:?}", labels_path);
        return Ok(());
    }

    info!("Emotion service starting...");
    info!("Model: {:?}", model_path);
    info!("Labels: {:?}", labels_path);

    // Both artifacts are validated here, before the listener binds; a
    // missing or unreadable artifact is fatal.
    let predictor = EmotionClassifier::new(&model_path, &labels_path, args.threads)?;

    let state = server::AppState::new(predictor);
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    info!("Listening on {}", args.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install ctrl-c handler: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
