//! Configuration resolution for mica-ai
//!
//! Multi-tier resolution with CLI → ENV → TOML → default priority, using the
//! shared loader in `mica_common::config`. Provider endpoints (LLM, avatar,
//! backend) are optional: a missing endpoint means that capability starts
//! Unavailable and the service degrades to deterministic defaults.

use clap::Parser;
use mica_common::config::{self, TomlConfig};
use std::path::PathBuf;
use tracing::{info, warn};

/// Default listen port
pub const DEFAULT_PORT: u16 = 5728;

/// Hard timeout for external analyzer processes (seconds)
pub const ANALYZER_TIMEOUT_SECS: u64 = 300;

/// Total elapsed budget for one avatar render (seconds)
pub const AVATAR_MAX_ELAPSED_SECS: u64 = 300;

/// Avatar completion poll interval (seconds)
pub const AVATAR_POLL_INTERVAL_SECS: u64 = 5;

/// Memory cache entry TTL (seconds)
pub const MEMORY_CACHE_TTL_SECS: u64 = 3600;

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "mica-ai", about = "MICA interview/debate coaching service")]
pub struct CliArgs {
    /// Data folder for generated videos and scratch space
    #[arg(long)]
    pub data_folder: Option<String>,

    /// Listen port
    #[arg(long, env = "MICA_PORT")]
    pub port: Option<u16>,
}

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Listen port
    pub port: u16,

    /// Root of the on-disk artifact layout (`videos/{cache,interviews,debates,samples}`)
    pub data_folder: PathBuf,

    /// LLM provider (OpenAI-compatible chat completion API)
    pub llm_base_url: Option<String>,
    pub llm_api_key: Option<String>,

    /// Avatar provider (talks API)
    pub avatar_base_url: Option<String>,
    pub avatar_api_key: Option<String>,

    /// Backend service (job posting corpus)
    pub backend_base_url: Option<String>,
}

impl AiConfig {
    /// Resolve configuration from CLI args, environment, and TOML file
    pub fn resolve(cli: &CliArgs) -> mica_common::Result<Self> {
        let toml_config = match config::load_toml_config("mica-ai") {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Config file unreadable, using defaults: {}", e);
                TomlConfig::default()
            }
        };

        let data_folder = config::resolve_data_folder(cli.data_folder.as_deref(), &toml_config);

        let port = cli.port.or(toml_config.port).unwrap_or(DEFAULT_PORT);

        let config = Self {
            port,
            data_folder,
            llm_base_url: resolve_optional("MICA_LLM_BASE_URL", toml_config.llm_base_url),
            llm_api_key: resolve_optional("MICA_LLM_API_KEY", toml_config.llm_api_key),
            avatar_base_url: resolve_optional("MICA_AVATAR_BASE_URL", toml_config.avatar_base_url),
            avatar_api_key: resolve_optional("MICA_AVATAR_API_KEY", toml_config.avatar_api_key),
            backend_base_url: resolve_optional(
                "MICA_BACKEND_BASE_URL",
                toml_config.backend_base_url,
            ),
        };

        info!(
            data_folder = %config.data_folder.display(),
            port = config.port,
            "Configuration resolved"
        );

        Ok(config)
    }

    /// Root for generated videos
    pub fn videos_root(&self) -> PathBuf {
        self.data_folder.join("videos")
    }

    /// Content-addressed avatar clip cache
    pub fn cache_dir(&self) -> PathBuf {
        self.videos_root().join("cache")
    }

    /// Interview response clips
    pub fn interviews_dir(&self) -> PathBuf {
        self.videos_root().join("interviews")
    }

    /// Debate response clips
    pub fn debates_dir(&self) -> PathBuf {
        self.videos_root().join("debates")
    }

    /// Prerendered fallback samples, indexed by (video_type, phase)
    pub fn samples_dir(&self) -> PathBuf {
        self.videos_root().join("samples")
    }

    /// Scratch space for uploaded clips and derived audio tracks
    pub fn scratch_dir(&self) -> PathBuf {
        self.videos_root().join("tmp")
    }

    /// Create the on-disk layout if missing
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [
            self.cache_dir(),
            self.interviews_dir(),
            self.debates_dir(),
            self.samples_dir(),
            self.scratch_dir(),
        ] {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}

/// ENV beats TOML for optional provider settings
fn resolve_optional(env_var: &str, toml_value: Option<String>) -> Option<String> {
    if let Ok(value) = std::env::var(env_var) {
        if !value.trim().is_empty() {
            return Some(value);
        }
    }
    toml_value.filter(|v| !v.trim().is_empty())
}
