//! Job posting recommendation
//!
//! TF-IDF cosine similarity between a user profile and the posting corpus,
//! with a bounded bonus for scarce skills the query actually asks for. The
//! corpus is pulled from the backend on refresh; the synthesized sample
//! corpus stands in whenever that pull fails, so queries never error.

pub mod corpus;
pub mod tfidf;
pub mod tokenizer;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::models::{JobPosting, UserProfile};
use corpus::{rarity_of, RARITY_THRESHOLD};
use tfidf::TfidfModel;

pub const TOP_K: usize = 5;
const RARITY_BONUS_WEIGHT: f64 = 0.3;
const SCORE_CAP: f64 = 1.3;

/// A rare skill that contributed to a posting's rank
#[derive(Debug, Clone, Serialize)]
pub struct RareSkill {
    pub name: String,
    pub rarity: f64,
}

/// One ranked recommendation
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub job_posting_id: i64,
    pub title: String,
    /// Posting category code
    pub keyword: String,
    pub corporation: String,
    /// Adjusted similarity, rounded to four decimals
    pub similarity: f64,
    pub rare_skills: Vec<RareSkill>,
}

struct Index {
    postings: Vec<JobPosting>,
    model: TfidfModel,
    /// True when this index holds the synthesized sample corpus
    sample: bool,
}

impl Index {
    fn fit(postings: Vec<JobPosting>, sample: bool) -> Self {
        let documents: Vec<String> = postings.iter().map(corpus::posting_document).collect();
        let model = TfidfModel::fit(&documents);
        Self {
            postings,
            model,
            sample,
        }
    }
}

pub struct Recommender {
    index: RwLock<Index>,
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new()
    }
}

impl Recommender {
    /// Start on the sample corpus; a refresh swaps in backend data
    pub fn new() -> Self {
        Self {
            index: RwLock::new(Index::fit(corpus::sample_corpus(), true)),
        }
    }

    pub fn with_postings(postings: Vec<JobPosting>) -> Self {
        Self {
            index: RwLock::new(Index::fit(postings, false)),
        }
    }

    /// Replace the corpus and refit; returns the new corpus size
    pub async fn replace_corpus(&self, postings: Vec<JobPosting>) -> usize {
        let count = postings.len();
        *self.index.write().await = Index::fit(postings, false);
        count
    }

    /// Fall back to the synthesized sample corpus; returns its size
    pub async fn use_sample_corpus(&self) -> usize {
        let postings = corpus::sample_corpus();
        let count = postings.len();
        *self.index.write().await = Index::fit(postings, true);
        count
    }

    pub async fn corpus_len(&self) -> usize {
        self.index.read().await.postings.len()
    }

    pub async fn is_sample(&self) -> bool {
        self.index.read().await.sample
    }

    /// Rank the corpus against a user profile
    pub async fn recommend(&self, profile: &UserProfile) -> Vec<Recommendation> {
        let index = self.index.read().await;
        let query = index.model.transform(&profile_document(profile));
        let base = index.model.similarities(&query);

        // Rare skills only count when the query itself names them
        let query_rare: Vec<String> = profile
            .tech_tokens()
            .into_iter()
            .filter(|t| rarity_of(t).map(|r| r > RARITY_THRESHOLD).unwrap_or(false))
            .collect();

        let mut ranked: Vec<(usize, f64, f64, Vec<RareSkill>)> = index
            .postings
            .iter()
            .enumerate()
            .map(|(j, posting)| {
                let matched: Vec<RareSkill> = posting
                    .tech_stacks
                    .iter()
                    .filter(|t| query_rare.contains(&t.to_lowercase()))
                    .filter_map(|t| {
                        rarity_of(t).filter(|r| *r > RARITY_THRESHOLD).map(|r| {
                            RareSkill {
                                name: t.clone(),
                                rarity: r,
                            }
                        })
                    })
                    .collect();
                let mut adjusted = base[j];
                if !matched.is_empty() {
                    let mean_rarity = matched.iter().map(|s| s.rarity).sum::<f64>()
                        / matched.len() as f64;
                    adjusted = (adjusted + RARITY_BONUS_WEIGHT * mean_rarity).min(SCORE_CAP);
                }
                (j, adjusted, base[j], matched)
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| b.2.total_cmp(&a.2))
                .then_with(|| index.postings[a.0].id.cmp(&index.postings[b.0].id))
        });

        ranked
            .into_iter()
            .take(TOP_K)
            .map(|(j, adjusted, _, rare_skills)| {
                let posting = &index.postings[j];
                Recommendation {
                    job_posting_id: posting.id,
                    title: posting.title.clone(),
                    keyword: posting.category.as_str().to_string(),
                    corporation: posting.company.clone(),
                    similarity: (adjusted * 10_000.0).round() / 10_000.0,
                    rare_skills,
                }
            })
            .collect()
    }
}

/// Query document with the same token categories as a posting document
fn profile_document(profile: &UserProfile) -> String {
    let mut parts: Vec<String> = profile.tech_tokens();
    for qualification in profile.qualification.split(',') {
        let q = qualification.trim();
        if !q.is_empty() {
            parts.push(q.to_string());
        }
    }
    if !profile.major.trim().is_empty() {
        parts.push(profile.major.trim().to_string());
    }
    parts.push(format!("career{}", profile.career_years()));
    if !profile.education.trim().is_empty() {
        parts.push(profile.education.trim().to_string());
    }
    if !profile.category.trim().is_empty() {
        parts.push(profile.category.trim().to_string());
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn posting(id: i64, tech: &[&str]) -> JobPosting {
        JobPosting {
            id,
            title: format!("Job {id}"),
            company: format!("Corp {id}"),
            category: Category::Ict,
            tech_stacks: tech.iter().map(|t| t.to_string()).collect(),
            certificates: Vec::new(),
            majors: vec!["컴퓨터공학".to_string()],
            career_years: 3,
            education_level: "대졸이상".to_string(),
            location: "서울".to_string(),
        }
    }

    fn profile_with_tech(tech: &str) -> UserProfile {
        UserProfile {
            tech_stack: tech.to_string(),
            category: "ICT".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn rare_skill_in_query_outranks_identical_posting() {
        let recommender = Recommender::with_postings(vec![
            posting(1, &["java", "mysql"]),
            posting(2, &["java", "mysql", "pytorch"]),
        ]);
        let results = recommender.recommend(&profile_with_tech("pytorch")).await;
        assert_eq!(results[0].job_posting_id, 2);
        assert_eq!(results[0].rare_skills.len(), 1);
        assert_eq!(results[0].rare_skills[0].name, "pytorch");
        assert!(results[0].similarity > results[1].similarity);
        assert!(results[1].rare_skills.is_empty());
    }

    #[tokio::test]
    async fn no_bonus_when_query_lacks_the_rare_skill() {
        let recommender = Recommender::with_postings(vec![
            posting(1, &["java", "mysql"]),
            posting(2, &["java", "mysql", "pytorch"]),
        ]);
        let results = recommender.recommend(&profile_with_tech("java")).await;
        for item in &results {
            assert!(item.rare_skills.is_empty());
        }
    }

    #[tokio::test]
    async fn adjusted_similarity_is_capped() {
        let recommender =
            Recommender::with_postings(vec![posting(1, &["pytorch", "istio", "openface"])]);
        let results = recommender
            .recommend(&profile_with_tech("pytorch, istio, openface"))
            .await;
        assert!(results[0].similarity <= SCORE_CAP);
        assert_eq!(results[0].rare_skills.len(), 3);
    }

    #[tokio::test]
    async fn at_most_five_results() {
        let recommender = Recommender::new();
        let results = recommender.recommend(&profile_with_tech("python")).await;
        assert_eq!(results.len(), TOP_K);
        assert_eq!(recommender.corpus_len().await, corpus::SAMPLE_CORPUS_SIZE);
    }

    #[tokio::test]
    async fn similarity_ties_break_by_posting_id() {
        let recommender = Recommender::with_postings(vec![
            posting(9, &["java"]),
            posting(4, &["java"]),
            posting(7, &["java"]),
        ]);
        let results = recommender.recommend(&profile_with_tech("java")).await;
        let ids: Vec<i64> = results.iter().map(|r| r.job_posting_id).collect();
        assert_eq!(ids, vec![4, 7, 9]);
    }

    #[tokio::test]
    async fn similarity_is_four_decimal() {
        let recommender = Recommender::with_postings(vec![
            posting(1, &["java", "mysql", "react"]),
            posting(2, &["python", "django"]),
        ]);
        let results = recommender.recommend(&profile_with_tech("java")).await;
        for item in &results {
            let scaled = item.similarity * 10_000.0;
            assert!((scaled - scaled.round()).abs() < 1e-6);
        }
    }

    #[tokio::test]
    async fn refresh_replaces_the_corpus() {
        let recommender = Recommender::new();
        assert!(recommender.is_sample().await);

        let count = recommender
            .replace_corpus(vec![posting(1, &["java"])])
            .await;
        assert_eq!(count, 1);
        assert!(!recommender.is_sample().await);
        assert_eq!(recommender.corpus_len().await, 1);

        let back = recommender.use_sample_corpus().await;
        assert_eq!(back, corpus::SAMPLE_CORPUS_SIZE);
        assert!(recommender.is_sample().await);
    }
}
