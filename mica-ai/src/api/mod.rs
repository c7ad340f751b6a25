//! HTTP API handlers for mica-ai

pub mod admin;
pub mod debate;
pub mod health;
pub mod interview;
pub mod recruitment;
pub mod status;

pub use admin::admin_routes;
pub use debate::debate_routes;
pub use health::health_routes;
pub use interview::interview_routes;
pub use recruitment::recruitment_routes;
pub use status::status_routes;

use axum::body::Bytes;
use axum::extract::Multipart;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use std::path::Path;

use crate::error::ApiError;
use crate::models::Gender;

/// First `file` part of a multipart upload, if present
pub(crate) async fn read_upload(multipart: &mut Multipart) -> Result<Option<Bytes>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Upload read failed: {e}")))?;
            return Ok(Some(bytes));
        }
    }
    Ok(None)
}

/// Serve a rendered clip as video/mp4
pub(crate) async fn serve_mp4(path: &Path) -> Result<Response, ApiError> {
    let bytes = tokio::fs::read(path).await?;
    Ok(([(header::CONTENT_TYPE, "video/mp4")], bytes).into_response())
}

/// Lenient gender parsing; unrecognized values keep the default avatar
pub(crate) fn parse_gender(s: &str) -> Gender {
    match s.trim().to_lowercase().as_str() {
        "female" | "f" | "여" | "여자" | "여성" => Gender::Female,
        _ => Gender::Male,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_parsing_is_lenient() {
        assert_eq!(parse_gender("FEMALE"), Gender::Female);
        assert_eq!(parse_gender("여성"), Gender::Female);
        assert_eq!(parse_gender("f"), Gender::Female);
        assert_eq!(parse_gender("male"), Gender::Male);
        assert_eq!(parse_gender(""), Gender::Male);
        assert_eq!(parse_gender("unknown"), Gender::Male);
    }
}
