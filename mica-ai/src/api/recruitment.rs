//! Recommendation endpoints

use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};

use crate::models::UserProfile;
use crate::AppState;

/// POST /ai/recruitment/posting
///
/// Top-ranked postings for the profile. The query path never errors; an
/// unusable profile just scores low everywhere.
pub async fn recommend_postings(
    State(state): State<AppState>,
    Json(profile): Json<UserProfile>,
) -> Json<Value> {
    let posting = state.recommender.recommend(&profile).await;
    tracing::info!(
        user_id = profile.user_id,
        results = posting.len(),
        "Recommendation served"
    );
    Json(json!({ "posting": posting }))
}

/// POST /ai/recruitment/refresh
///
/// Re-pulls the corpus from the backend. The synthesized sample corpus
/// stands in when no backend is configured or the fetch fails.
pub async fn refresh_corpus(State(state): State<AppState>) -> Json<Value> {
    let count = match &state.backend {
        Some(backend) => match backend.fetch_postings().await {
            Ok(postings) => state.recommender.replace_corpus(postings).await,
            Err(e) => {
                tracing::warn!("Corpus fetch failed, keeping sample corpus: {}", e);
                state.recommender.use_sample_corpus().await
            }
        },
        None => {
            tracing::info!("Backend not configured, loading sample corpus");
            state.recommender.use_sample_corpus().await
        }
    };
    Json(json!({ "count": count }))
}

pub fn recruitment_routes() -> Router<AppState> {
    Router::new()
        .route("/ai/recruitment/posting", post(recommend_postings))
        .route("/ai/recruitment/refresh", post(refresh_corpus))
}
