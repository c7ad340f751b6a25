//! Skill rarity table and the synthesized sample corpus
//!
//! The sample corpus stands in when the backend corpus pull fails. It is
//! fully deterministic (index-rotated pools, no RNG) so recommendations and
//! tests are reproducible across runs.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::models::{Category, JobPosting};

/// Skills with rarity above this threshold earn a ranking bonus
pub const RARITY_THRESHOLD: f64 = 0.7;

pub static RARITY_TABLE: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("pytorch", 0.8),
        ("tensorflow", 0.75),
        ("nvidia_deepstream", 0.95),
        ("openface", 0.9),
        ("hadoop", 0.85),
        ("spark", 0.75),
        ("flutter", 0.78),
        ("kubernetes", 0.83),
        ("istio", 0.92),
        ("graphql", 0.82),
    ])
});

/// Rarity for a skill token, case-insensitive
pub fn rarity_of(token: &str) -> Option<f64> {
    RARITY_TABLE.get(token.to_lowercase().as_str()).copied()
}

/// Rare-skill keys in deterministic order
fn rare_skill_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = RARITY_TABLE.keys().copied().collect();
    keys.sort_unstable();
    keys
}

pub const SAMPLE_CORPUS_SIZE: usize = 100;

const EDUCATION_LEVELS: [&str; 5] = [
    "고졸이상",
    "초대졸이상",
    "대졸이상",
    "석사이상",
    "박사이상",
];

const LOCATIONS: [&str; 5] = ["서울", "판교", "부산", "대전", "인천"];

fn tech_pool(category: Category) -> &'static [&'static str] {
    match category {
        Category::Bm => &["excel", "erp", "sap", "jira", "notion", "powerpoint"],
        Category::Sm => &["crm", "salesforce", "tableau", "seo", "hubspot", "analytics"],
        Category::Ps => &["plc", "autocad", "solidworks", "mes", "catia", "scada"],
        Category::Rnd => &[
            "matlab",
            "labview",
            "python",
            "simulink",
            "tensorflow",
            "pytorch",
        ],
        Category::Ict => &[
            "java",
            "python",
            "javascript",
            "react",
            "vue",
            "angular",
            "spring",
            "django",
            "flask",
            "nodejs",
            "express",
            "mysql",
            "mongodb",
            "postgresql",
            "aws",
            "azure",
            "gcp",
            "docker",
            "kubernetes",
            "git",
            "linux",
            "tensorflow",
            "pytorch",
            "pandas",
            "numpy",
        ],
        Category::Ard => &[
            "photoshop",
            "illustrator",
            "figma",
            "sketch",
            "indesign",
            "blender",
        ],
        Category::Mm => &[
            "premiere",
            "aftereffects",
            "davinci",
            "obs",
            "finalcut",
            "audition",
        ],
    }
}

fn major_for(category: Category) -> &'static str {
    match category {
        Category::Bm => "경영학",
        Category::Sm => "마케팅",
        Category::Ps => "기계공학",
        Category::Rnd => "전자공학",
        Category::Ict => "컴퓨터공학",
        Category::Ard => "시각디자인",
        Category::Mm => "미디어커뮤니케이션",
    }
}

fn certificate_for(category: Category) -> &'static str {
    match category {
        Category::Bm => "경영지도사",
        Category::Sm => "사회조사분석사",
        Category::Ps => "품질경영기사",
        Category::Rnd => "전자기사",
        Category::Ict => "정보처리기사",
        Category::Ard => "컬러리스트기사",
        Category::Mm => "멀티미디어콘텐츠제작전문가",
    }
}

/// Synthesize the deterministic sample corpus
pub fn sample_corpus() -> Vec<JobPosting> {
    let rare_keys = rare_skill_keys();
    (0..SAMPLE_CORPUS_SIZE)
        .map(|i| {
            let category = Category::ALL[i % Category::ALL.len()];
            let pool = tech_pool(category);
            let take = 3 + i % 4;
            let mut tech_stacks: Vec<String> = (0..take.min(pool.len()))
                .map(|k| pool[(i + k) % pool.len()].to_string())
                .collect();
            // Every tenth posting carries one rare skill
            if i % 10 == 0 {
                let rare = rare_keys[(i / 10) % rare_keys.len()].to_string();
                if !tech_stacks.contains(&rare) {
                    tech_stacks.push(rare);
                }
            }
            let certificates = if i % 3 == 0 {
                vec![certificate_for(category).to_string()]
            } else {
                Vec::new()
            };
            JobPosting {
                id: (i + 1) as i64,
                title: format!("Sample Job {}", i + 1),
                company: format!("Company {}", i + 1),
                category,
                tech_stacks,
                certificates,
                majors: vec![major_for(category).to_string()],
                career_years: (i % 11) as u32,
                education_level: EDUCATION_LEVELS[i % EDUCATION_LEVELS.len()].to_string(),
                location: LOCATIONS[i % LOCATIONS.len()].to_string(),
            }
        })
        .collect()
}

/// One posting's TF-IDF document
pub fn posting_document(posting: &JobPosting) -> String {
    let mut parts: Vec<String> = Vec::new();
    parts.extend(posting.tech_stacks.iter().cloned());
    parts.extend(posting.certificates.iter().cloned());
    parts.extend(posting.majors.iter().cloned());
    parts.push(format!("career{}", posting.career_years));
    parts.push(posting.education_level.clone());
    parts.push(posting.category.as_str().to_string());
    parts.join(" ")
}
