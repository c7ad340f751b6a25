//! mica-ai - Interview and debate coaching service
//!
//! Multimodal analysis of webcam answer clips (speech, facial expression,
//! voice acoustics), LLM-backed question and rebuttal generation with
//! deterministic fallbacks, avatar clip rendering, and TF-IDF job posting
//! recommendation.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use mica_ai::config::{AiConfig, CliArgs};
use mica_ai::{build_router, AppState};

#[tokio::main(worker_threads = 10)]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification before any slow adapter probe
    info!(
        "Starting MICA AI Coach (mica-ai) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = CliArgs::parse();
    let config = AiConfig::resolve(&cli)?;
    config.ensure_directories()?;

    let port = config.port;
    let state = AppState::new(config);
    let app = build_router(state);

    // The backend and web clients call in from other hosts
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("mica-ai listening on http://0.0.0.0:{port}");
    info!("Health check: http://127.0.0.1:{port}/health");

    axum::serve(listener, app).await?;

    Ok(())
}
