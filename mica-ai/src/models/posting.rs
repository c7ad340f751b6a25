//! Job posting and user profile models for the recommender

use serde::{Deserialize, Serialize};

/// Job posting category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    /// Business management
    Bm,
    /// Sales & marketing
    Sm,
    /// Production & service
    Ps,
    /// Research & development
    Rnd,
    /// Information & communication technology
    Ict,
    /// Architecture & design
    Ard,
    /// Media & communication
    Mm,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Bm,
        Category::Sm,
        Category::Ps,
        Category::Rnd,
        Category::Ict,
        Category::Ard,
        Category::Mm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bm => "BM",
            Category::Sm => "SM",
            Category::Ps => "PS",
            Category::Rnd => "RND",
            Category::Ict => "ICT",
            Category::Ard => "ARD",
            Category::Mm => "MM",
        }
    }

    /// Parse a category code; unknown codes fall back to ICT
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "BM" => Category::Bm,
            "SM" => Category::Sm,
            "PS" => Category::Ps,
            "RND" => Category::Rnd,
            "ICT" => Category::Ict,
            "ARD" => Category::Ard,
            "MM" => Category::Mm,
            _ => Category::Ict,
        }
    }
}

/// One job posting in the recommendation corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub category: Category,
    /// Skill tokens as the source lists them; matching is case-insensitive
    pub tech_stacks: Vec<String>,
    pub certificates: Vec<String>,
    pub majors: Vec<String>,
    pub career_years: u32,
    pub education_level: String,
    pub location: String,
}

/// User profile from the recommendation request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub employmenttype: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub qualification: String,
    #[serde(default)]
    pub tech_stack: String,
    #[serde(default)]
    pub workexperience: String,
}

impl UserProfile {
    /// Comma-separated tech stack tokens, trimmed and lowercased
    pub fn tech_tokens(&self) -> Vec<String> {
        self.tech_stack
            .split(',')
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Career years parsed from the free-form experience field
    pub fn career_years(&self) -> u32 {
        self.workexperience
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse()
            .unwrap_or(0)
    }
}
