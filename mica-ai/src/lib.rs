//! mica-ai library interface
//!
//! Router construction and shared state, exposed for integration testing

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod recommend;
pub mod services;
pub mod session;
pub mod types;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::AiConfig;
use crate::recommend::Recommender;
use crate::services::{AdapterSet, AvatarPipeline, BackendClient, MediaIngest, ResponseCache};
use crate::session::{Orchestrator, SessionStore};

/// Upload size ceiling; webcam answer clips run tens of megabytes
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved configuration
    pub config: Arc<AiConfig>,
    /// Capability adapters, probed once at startup
    pub adapters: Arc<AdapterSet>,
    /// Interview and debate session flows
    pub orchestrator: Arc<Orchestrator>,
    /// Job posting recommender
    pub recommender: Arc<Recommender>,
    /// In-memory session registry
    pub store: Arc<SessionStore>,
    /// Posting corpus source; None when no backend is configured
    pub backend: Option<Arc<BackendClient>>,
    /// Service startup timestamp for uptime tracking
    pub started_at: DateTime<Utc>,
    /// Last operational error for diagnostics
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(config: AiConfig) -> Self {
        let adapters = Arc::new(AdapterSet::probe(&config));
        let cache = Arc::new(ResponseCache::new());
        let ingest = Arc::new(MediaIngest::new(
            config.scratch_dir(),
            adapters.ffmpeg.as_available().cloned(),
        ));
        let pipeline = Arc::new(AvatarPipeline::new(
            config.cache_dir(),
            config.samples_dir(),
            adapters.avatar.as_available().cloned(),
            cache,
        ));
        let store = Arc::new(SessionStore::new());
        let orchestrator = Arc::new(Orchestrator::new(
            adapters.clone(),
            ingest,
            pipeline,
            store.clone(),
        ));
        let backend = match BackendClient::new(config.backend_base_url.as_deref()) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!("Backend client disabled: {}", e);
                None
            }
        };

        Self {
            config: Arc::new(config),
            adapters,
            orchestrator,
            recommender: Arc::new(Recommender::new()),
            store,
            backend,
            started_at: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let videos = ServeDir::new(state.config.videos_root());

    Router::new()
        .merge(api::interview_routes())
        .merge(api::debate_routes())
        .merge(api::recruitment_routes())
        .merge(api::admin_routes())
        .merge(api::status_routes())
        .merge(api::health_routes())
        .nest_service("/videos", videos)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        // Web clients call from other origins
        .layer(CorsLayer::permissive())
        .with_state(state)
}
