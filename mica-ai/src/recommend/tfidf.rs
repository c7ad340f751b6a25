//! TF-IDF model over posting documents
//!
//! Word analyzer with 1-2 grams, min_df 1, at most 5000 features ranked by
//! document frequency. Inverse document frequency is smoothed
//! (`ln((1+N)/(1+df)) + 1`) and every row is L2-normalized, so cosine
//! similarity reduces to a sparse dot product.

use std::collections::{HashMap, HashSet};

use super::tokenizer;

pub const MAX_FEATURES: usize = 5000;

/// Sparse L2-normalized document vector; term indices strictly ascending
#[derive(Debug, Clone, Default)]
pub struct DocVector(Vec<(usize, f64)>);

impl DocVector {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Dot product of two normalized vectors (cosine similarity)
    pub fn dot(&self, other: &DocVector) -> f64 {
        let mut sum = 0.0;
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < other.0.len() {
            let (ti, vi) = self.0[i];
            let (tj, vj) = other.0[j];
            match ti.cmp(&tj) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += vi * vj;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

pub struct TfidfModel {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    rows: Vec<DocVector>,
}

impl TfidfModel {
    pub fn fit(documents: &[String]) -> Self {
        Self::fit_bounded(documents, MAX_FEATURES)
    }

    pub(crate) fn fit_bounded(documents: &[String], max_features: usize) -> Self {
        let token_docs: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| tokenizer::ngrams(doc))
            .collect();

        let mut df: HashMap<String, usize> = HashMap::new();
        for tokens in &token_docs {
            let mut seen = HashSet::new();
            for token in tokens {
                if seen.insert(token.as_str()) {
                    *df.entry(token.clone()).or_insert(0) += 1;
                }
            }
        }

        // Rank by document frequency, ties alphabetical, then cap
        let mut terms: Vec<(String, usize)> = df.into_iter().collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        terms.truncate(max_features);
        terms.sort_by(|a, b| a.0.cmp(&b.0));

        let vocabulary: HashMap<String, usize> = terms
            .iter()
            .enumerate()
            .map(|(index, (term, _))| (term.clone(), index))
            .collect();
        let total = documents.len();
        let mut idf = vec![0.0; terms.len()];
        for (term, df_count) in &terms {
            idf[vocabulary[term]] =
                ((1 + total) as f64 / (1 + df_count) as f64).ln() + 1.0;
        }

        let mut model = Self {
            vocabulary,
            idf,
            rows: Vec::new(),
        };
        let rows: Vec<DocVector> = token_docs
            .iter()
            .map(|tokens| model.vectorize(tokens))
            .collect();
        model.rows = rows;
        model
    }

    fn vectorize(&self, tokens: &[String]) -> DocVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in tokens {
            if let Some(&index) = self.vocabulary.get(token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }
        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index]))
            .collect();
        entries.sort_by_key(|(index, _)| *index);

        let norm = entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for entry in &mut entries {
                entry.1 /= norm;
            }
        }
        DocVector(entries)
    }

    /// Project a query document into the fitted vocabulary
    pub fn transform(&self, document: &str) -> DocVector {
        self.vectorize(&tokenizer::ngrams(document))
    }

    pub fn num_documents(&self) -> usize {
        self.rows.len()
    }

    /// Cosine similarity of the query against every fitted row
    pub fn similarities(&self, query: &DocVector) -> Vec<f64> {
        self.rows.iter().map(|row| query.dot(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn identical_document_scores_one() {
        let model = TfidfModel::fit(&docs(&["python django mysql", "java spring"]));
        let query = model.transform("python django mysql");
        let sims = model.similarities(&query);
        assert!((sims[0] - 1.0).abs() < 1e-9);
        assert!(sims[1].abs() < 1e-9);
    }

    #[test]
    fn shared_terms_score_between_zero_and_one() {
        let model = TfidfModel::fit(&docs(&["python django", "python spring"]));
        let query = model.transform("python");
        let sims = model.similarities(&query);
        assert!(sims[0] > 0.0 && sims[0] < 1.0);
        assert!((sims[0] - sims[1]).abs() < 1e-9);
    }

    #[test]
    fn rare_terms_discriminate_more_than_common_ones() {
        let model = TfidfModel::fit(&docs(&[
            "python tokio",
            "python axum",
            "python hyper",
        ]));
        let query = model.transform("python tokio");
        let sims = model.similarities(&query);
        assert!(sims[0] > sims[1]);
        assert!(sims[1] > 0.0);
    }

    #[test]
    fn feature_cap_keeps_highest_document_frequency() {
        // df: alpha=2, everything else 1; cap of 1 leaves only alpha
        let model =
            TfidfModel::fit_bounded(&docs(&["alpha beta", "alpha gamma"]), 1);
        let beta_query = model.transform("beta");
        assert!(beta_query.is_empty());
        let alpha_query = model.transform("alpha");
        assert!(!alpha_query.is_empty());
    }

    #[test]
    fn unknown_query_terms_produce_empty_vector() {
        let model = TfidfModel::fit(&docs(&["python django"]));
        let query = model.transform("cobol fortran");
        assert!(query.is_empty());
        assert_eq!(model.similarities(&query), vec![0.0]);
    }

    #[test]
    fn bigrams_participate_in_matching() {
        let model = TfidfModel::fit(&docs(&["machine learning engineer", "learning korean"]));
        let query = model.transform("machine learning");
        let sims = model.similarities(&query);
        assert!(sims[0] > sims[1]);
    }
}
