//! Backend service client (job posting corpus)
//!
//! Pulls the posting corpus for the recommender. The backend exposes two
//! shapes over time (the flat entity with `corporation`/`keyword` and the
//! richer one with `techStacks`/`careerYear`); the DTO here accepts both and
//! normalizes into the domain type. Fetch failures fall back to the sample
//! corpus at the call site, so the query path never errors.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Category, JobPosting};

/// Timeout for the corpus fetch
const FETCH_TIMEOUT_SECS: u64 = 10;

/// Timeout for the pre-fetch import trigger
const IMPORT_TIMEOUT_SECS: u64 = 30;

/// Backend client errors
#[derive(Debug, Error)]
pub enum BackendError {
    /// Backend endpoint not configured
    #[error("Backend service not configured")]
    NotConfigured,

    /// HTTP request failed
    #[error("Backend request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Backend returned a non-success status
    #[error("Backend API error (status {0})")]
    ApiError(u16),

    /// Backend answered with an empty corpus
    #[error("Backend returned no postings")]
    EmptyCorpus,
}

/// Lenient posting DTO; unknown fields ignored, either backend shape accepted
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BackendPosting {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub corporation: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub tech_stacks: Option<Vec<String>>,
    #[serde(default)]
    pub certificate_list: Option<Vec<String>>,
    #[serde(default)]
    pub major_list: Option<Vec<String>>,
    #[serde(default)]
    pub career_year: Option<u32>,
    #[serde(default)]
    pub workexperience: Option<String>,
    #[serde(default)]
    pub education_level: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl BackendPosting {
    pub(crate) fn into_domain(self) -> JobPosting {
        let category_label = self.category.or(self.keyword).unwrap_or_default();
        let career_years = self
            .career_year
            .unwrap_or_else(|| digits_in(self.workexperience.as_deref().unwrap_or("")));

        JobPosting {
            id: self.id,
            title: self.title.unwrap_or_default(),
            company: self.company.or(self.corporation).unwrap_or_default(),
            category: Category::parse_or_default(&category_label),
            tech_stacks: self.tech_stacks.unwrap_or_default(),
            certificates: self.certificate_list.unwrap_or_default(),
            majors: self.major_list.unwrap_or_default(),
            career_years,
            education_level: self.education_level.or(self.education).unwrap_or_default(),
            location: self.location.unwrap_or_default(),
        }
    }
}

fn digits_in(s: &str) -> u32 {
    s.chars()
        .filter(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

/// Backend corpus client
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client; fails when the backend is not configured
    pub fn new(base_url: Option<&str>) -> Result<Self, BackendError> {
        let base_url = base_url
            .filter(|u| !u.trim().is_empty())
            .ok_or(BackendError::NotConfigured)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the full posting corpus
    pub async fn fetch_postings(&self) -> Result<Vec<JobPosting>, BackendError> {
        // Best effort: the backend seeds itself from CSV on this trigger
        let import_url = format!("{}/api/job-postings/import", self.base_url);
        if let Err(e) = self
            .client
            .post(&import_url)
            .timeout(Duration::from_secs(IMPORT_TIMEOUT_SECS))
            .send()
            .await
        {
            tracing::warn!("Backend import trigger failed: {}", e);
        }

        let response = self
            .client
            .get(format!("{}/api/job-postings/all", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::ApiError(status.as_u16()));
        }

        let raw: Vec<BackendPosting> = response.json().await?;
        let postings: Vec<JobPosting> = raw.into_iter().map(BackendPosting::into_domain).collect();

        if postings.is_empty() {
            return Err(BackendError::EmptyCorpus);
        }

        tracing::info!(count = postings.len(), "Fetched posting corpus from backend");
        Ok(postings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_configuration_is_rejected() {
        assert!(matches!(BackendClient::new(None), Err(BackendError::NotConfigured)));
        assert!(matches!(
            BackendClient::new(Some("  ")),
            Err(BackendError::NotConfigured)
        ));
    }

    #[test]
    fn parses_rich_posting_shape() {
        let json = r#"{
            "id": 7,
            "title": "백엔드 개발자",
            "company": "테크컴퍼니",
            "category": "ICT",
            "techStacks": ["Java", "Spring", "MySQL"],
            "certificateList": ["정보처리기사"],
            "majorList": ["컴퓨터공학"],
            "careerYear": 3,
            "educationLevel": "대졸이상",
            "description": "ignored"
        }"#;
        let posting: BackendPosting = serde_json::from_str(json).unwrap();
        let domain = posting.into_domain();

        assert_eq!(domain.id, 7);
        assert_eq!(domain.company, "테크컴퍼니");
        assert_eq!(domain.category, Category::Ict);
        assert_eq!(domain.tech_stacks, vec!["Java", "Spring", "MySQL"]);
        assert_eq!(domain.career_years, 3);
        assert_eq!(domain.education_level, "대졸이상");
    }

    #[test]
    fn parses_flat_posting_shape() {
        let json = r#"{
            "id": 12,
            "title": "데이터 엔지니어",
            "corporation": "데이터랩",
            "keyword": "RND",
            "workexperience": "5년 이상",
            "education": "석사이상",
            "deadline": "2025-12-31"
        }"#;
        let posting: BackendPosting = serde_json::from_str(json).unwrap();
        let domain = posting.into_domain();

        assert_eq!(domain.company, "데이터랩");
        assert_eq!(domain.category, Category::Rnd);
        assert_eq!(domain.career_years, 5);
        assert_eq!(domain.education_level, "석사이상");
        assert!(domain.tech_stacks.is_empty());
    }

    #[test]
    fn career_digits_parse_from_free_text() {
        assert_eq!(digits_in("3년차"), 3);
        assert_eq!(digits_in("신입"), 0);
        assert_eq!(digits_in(""), 0);
    }
}
