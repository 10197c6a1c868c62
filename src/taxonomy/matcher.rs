//! Category matcher ranking target categories by semantic similarity
//!
//! A candidate's score blends two cosine similarities against the query:
//! `weights.name * cos(q, name) + weights.path * cos(q, path)`.
//! Equal scores are ordered by ascending category id.

use serde::Serialize;
use std::cmp::Ordering;

use super::cache::{EmbeddingCache, EmbeddingEntry};
use super::embedder::{cosine_similarity, Encoder};
use crate::core::config::Weights;
use crate::core::error::{Error, Result};

/// A ranked target category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub category_id: String,
    pub score: f32,
    pub full_path: String,
}

/// Ranks cached target categories against free-text queries
pub struct CategoryMatcher<'a> {
    cache: &'a EmbeddingCache,
    encoder: &'a dyn Encoder,
    weights: Weights,
}

impl<'a> CategoryMatcher<'a> {
    /// Create a new matcher with the default 0.7 name / 0.3 path weights
    pub fn new(cache: &'a EmbeddingCache, encoder: &'a dyn Encoder) -> Self {
        Self {
            cache,
            encoder,
            weights: Weights::default(),
        }
    }

    /// Set similarity weights
    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    /// Top `top_k` categories for `query`, best first
    pub fn rank(&self, query: &str, top_k: usize) -> Result<Vec<MatchResult>> {
        let query_embedding = self
            .encoder
            .embed(query)
            .map_err(|e| Error::encode(query, e))?;

        self.rank_embedding(&query_embedding, top_k)
    }

    /// Highest scoring category for `query`, if the cache is not empty
    pub fn best_match(&self, query: &str) -> Result<Option<MatchResult>> {
        Ok(self.rank(query, 1)?.into_iter().next())
    }

    /// Rank against an already encoded query
    pub fn rank_embedding(&self, query: &[f32], top_k: usize) -> Result<Vec<MatchResult>> {
        let mut results = self
            .cache
            .iter()
            .map(|(id, entry)| -> Result<MatchResult> {
                Ok(MatchResult {
                    category_id: id.to_string(),
                    score: blended_score(query, id, entry, self.weights)?,
                    full_path: entry.full_path.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        results.sort_by(compare_results);
        results.truncate(top_k);

        Ok(results)
    }
}

/// Weighted blend of name and path similarity for one cache entry
pub fn blended_score(
    query: &[f32],
    id: &str,
    entry: &EmbeddingEntry,
    weights: Weights,
) -> Result<f32> {
    for vector in [&entry.name_embedding, &entry.path_embedding] {
        if vector.len() != query.len() {
            return Err(Error::DimensionMismatch {
                id: id.to_string(),
                expected: query.len(),
                found: vector.len(),
            });
        }
    }

    let name_similarity = cosine_similarity(query, &entry.name_embedding);
    let path_similarity = cosine_similarity(query, &entry.path_embedding);

    let score = weights.name * name_similarity + weights.path * path_similarity;
    // `-0.0 + 0.0` is `+0.0`; `total_cmp` would otherwise order the two zeros
    Ok(score + 0.0)
}

/// Score descending, then category id ascending
fn compare_results(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.category_id.cmp(&b.category_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::tree::CategoryPath;
    use std::collections::HashMap;

    /// Encoder backed by a fixed lookup table
    struct TableEncoder(HashMap<&'static str, Vec<f32>>);

    impl Encoder for TableEncoder {
        fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
            self.0
                .get(text)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no embedding for {text:?}"))
        }

        fn name(&self) -> &str {
            "table"
        }
    }

    fn category(id: &str, full_path: &str, name: &str) -> CategoryPath {
        CategoryPath {
            id: id.to_string(),
            full_path: full_path.to_string(),
            name: name.to_string(),
        }
    }

    fn fixture() -> (TableEncoder, EmbeddingCache) {
        let encoder = TableEncoder(HashMap::from([
            ("Footwear", vec![1.0, 0.0, 0.0]),
            ("Footwear/Sneakers", vec![0.9, 0.4, 0.0]),
            ("Sneakers", vec![0.6, 0.8, 0.0]),
            ("Apparel", vec![0.0, 0.0, 1.0]),
            ("Apparel/Shirts", vec![0.2, 0.0, 0.9]),
            ("Shirts", vec![0.0, 0.3, 0.95]),
            ("Shoes/Trainers", vec![0.6, 0.8, 0.05]),
        ]));
        let categories = vec![
            category("f", "Footwear", "Footwear"),
            category("fs", "Footwear/Sneakers", "Sneakers"),
            category("a", "Apparel", "Apparel"),
            category("as", "Apparel/Shirts", "Shirts"),
        ];
        let cache = EmbeddingCache::build(&categories, &encoder).unwrap();
        (encoder, cache)
    }

    #[test]
    fn test_rank_sorted_and_truncated() {
        let (encoder, cache) = fixture();
        let matcher = CategoryMatcher::new(&cache, &encoder);

        let results = matcher.rank("Shoes/Trainers", 3).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(results[0].category_id, "fs");
        assert_eq!(results[0].full_path, "Footwear/Sneakers");
    }

    #[test]
    fn test_rank_returns_whole_cache_when_k_is_large() {
        let (encoder, cache) = fixture();
        let matcher = CategoryMatcher::new(&cache, &encoder);

        assert_eq!(matcher.rank("Apparel", 10).unwrap().len(), cache.len());
        assert!(matcher.rank("Apparel", 0).unwrap().is_empty());
    }

    #[test]
    fn test_identity_query_scores_one() {
        let (encoder, cache) = fixture();
        let matcher = CategoryMatcher::new(&cache, &encoder);

        let best = matcher.best_match("Apparel").unwrap().unwrap();
        assert_eq!(best.category_id, "a");
        assert!((best.score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_score_uses_weights() {
        let (encoder, cache) = fixture();
        let query = encoder.embed("Footwear").unwrap();
        let entry = cache.get("fs").unwrap();

        let name_similarity = cosine_similarity(&query, &entry.name_embedding);
        let path_similarity = cosine_similarity(&query, &entry.path_embedding);

        let score = blended_score(&query, "fs", entry, Weights::default()).unwrap();
        assert!((score - (0.7 * name_similarity + 0.3 * path_similarity)).abs() < 1e-6);

        let name_only = Weights { name: 1.0, path: 0.0 };
        let score = blended_score(&query, "fs", entry, name_only).unwrap();
        assert!((score - name_similarity).abs() < 1e-6);
    }

    #[test]
    fn test_ties_break_by_id() {
        let encoder = TableEncoder(HashMap::from([
            ("Tea", vec![1.0, 0.0]),
            ("Drinks/Tea", vec![1.0, 0.0]),
            ("Hot/Tea", vec![1.0, 0.0]),
        ]));
        let categories = vec![
            category("z", "Hot/Tea", "Tea"),
            category("b", "Drinks/Tea", "Tea"),
        ];
        let cache = EmbeddingCache::build(&categories, &encoder).unwrap();

        let results = CategoryMatcher::new(&cache, &encoder).rank("Tea", 2).unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.category_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "z"]);
    }

    #[test]
    fn test_negative_zero_scores_tie_with_zero() {
        let encoder = TableEncoder(HashMap::from([
            ("East", vec![1.0, -0.0]),
            ("North", vec![-0.0, 1.0]),
            ("Up", vec![0.0, 1.0]),
        ]));
        let categories = vec![
            category("a", "North", "North"),
            category("b", "Up", "Up"),
        ];
        let cache = EmbeddingCache::build(&categories, &encoder).unwrap();

        let results = CategoryMatcher::new(&cache, &encoder).rank("East", 2).unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.category_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(results
            .iter()
            .all(|r| r.score == 0.0 && r.score.is_sign_positive()));
    }

    #[test]
    fn test_zero_query_scores_zero_without_nan() {
        let (encoder, cache) = fixture();
        let matcher = CategoryMatcher::new(&cache, &encoder);

        let results = matcher.rank_embedding(&[0.0, 0.0, 0.0], 10).unwrap();
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.score == 0.0));
        let ids: Vec<_> = results.iter().map(|r| r.category_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "as", "f", "fs"]);
    }

    #[test]
    fn test_dimension_mismatch_is_error() {
        let (encoder, cache) = fixture();
        let matcher = CategoryMatcher::new(&cache, &encoder);

        let err = matcher.rank_embedding(&[1.0, 0.0], 1).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch { expected: 2, found: 3, .. }
        ));
    }

    #[test]
    fn test_empty_cache_has_no_best_match() {
        let (encoder, _) = fixture();
        let cache = EmbeddingCache::default();
        let matcher = CategoryMatcher::new(&cache, &encoder);

        assert!(matcher.best_match("Footwear").unwrap().is_none());
    }
}
