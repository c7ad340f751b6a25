//! Capability adapters and pipeline services

pub mod acoustic_analyzer;
pub mod avatar_client;
pub mod avatar_pipeline;
pub mod backend_client;
pub mod ffmpeg_client;
pub mod llm_client;
pub mod media_ingest;
pub mod openface_client;
pub mod response_cache;
pub mod whisper_client;

pub use acoustic_analyzer::{AcousticAnalyzer, AcousticError};
pub use avatar_client::{AvatarClient, AvatarError, AvatarPersona};
pub use avatar_pipeline::AvatarPipeline;
pub use backend_client::{BackendClient, BackendError};
pub use ffmpeg_client::{FfmpegClient, FfmpegError};
pub use llm_client::{LlmClient, LlmError, Persona};
pub use media_ingest::{IngestError, MediaIngest, ScratchMedia};
pub use openface_client::{OpenFaceClient, OpenFaceError};
pub use response_cache::ResponseCache;
pub use whisper_client::{WhisperClient, WhisperError};

use std::sync::Arc;

use crate::config::AiConfig;
use crate::types::Capability;

/// All capability adapters, probed once at startup
pub struct AdapterSet {
    pub ffmpeg: Capability<Arc<FfmpegClient>>,
    pub whisper: Capability<Arc<WhisperClient>>,
    pub openface: Capability<Arc<OpenFaceClient>>,
    pub acoustic: Capability<Arc<AcousticAnalyzer>>,
    pub llm: Capability<Arc<LlmClient>>,
    pub avatar: Capability<Arc<AvatarClient>>,
}

impl AdapterSet {
    /// Probe every adapter; unavailability degrades, it never aborts startup
    pub fn probe(config: &AiConfig) -> Self {
        Self {
            ffmpeg: Capability::from_probe(
                "transcoder",
                FfmpegClient::new().map(Arc::new).map_err(|e| e.to_string()),
            ),
            whisper: Capability::from_probe(
                "stt",
                WhisperClient::new().map(Arc::new).map_err(|e| e.to_string()),
            ),
            openface: Capability::from_probe(
                "facial",
                OpenFaceClient::new().map(Arc::new).map_err(|e| e.to_string()),
            ),
            // In-process, no external binary to probe
            acoustic: Capability::from_probe("acoustic", Ok(Arc::new(AcousticAnalyzer::new()))),
            llm: Capability::from_probe(
                "llm",
                LlmClient::new(config.llm_base_url.as_deref(), config.llm_api_key.as_deref())
                    .map(Arc::new)
                    .map_err(|e| e.to_string()),
            ),
            avatar: Capability::from_probe(
                "avatar",
                AvatarClient::new(
                    config.avatar_base_url.as_deref(),
                    config.avatar_api_key.as_deref(),
                )
                .map(Arc::new)
                .map_err(|e| e.to_string()),
            ),
        }
    }
}
