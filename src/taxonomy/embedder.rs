//! Text encoders for category names and paths
//!
//! The mapper only needs `text -> vector`; which model produces the vector
//! is decided by the caller. `Model2VecEncoder` is the production encoder.

use anyhow::{Context, Result};
use model2vec::Model2Vec;
use std::path::PathBuf;

use crate::core::config::ModelConfig;

/// Embedding model abstraction
pub trait Encoder {
    /// Generate embedding for a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, in input order
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Get model name/identifier
    fn name(&self) -> &str;
}

/// Where the Model2Vec weights are loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// HuggingFace Hub model id, downloaded on first use
    Hub(String),
    /// Local model directory
    Local(PathBuf),
}

impl ModelSource {
    /// A configured local directory wins over the hub id
    pub fn from_config(config: &ModelConfig) -> Self {
        match &config.model_path {
            Some(path) => Self::Local(path.clone()),
            None => Self::Hub(config.model_id.clone()),
        }
    }

    /// Identifier handed to Model2Vec, also used as the encoder name
    pub fn label(&self) -> String {
        match self {
            Self::Hub(id) => id.clone(),
            Self::Local(path) => path.to_string_lossy().into_owned(),
        }
    }
}

/// Encodes category names and paths with a static Model2Vec model
pub struct Model2VecEncoder {
    model: Model2Vec,
    label: String,
}

impl Model2VecEncoder {
    pub fn load(source: &ModelSource) -> Result<Self> {
        let label = source.label();
        let model = Model2Vec::from_pretrained(label.as_str(), None, None)
            .with_context(|| match source {
                ModelSource::Hub(id) => format!("Failed to fetch Model2Vec model {id} from the Hub"),
                ModelSource::Local(path) => {
                    format!("Failed to load Model2Vec model from {}", path.display())
                }
            })?;

        Ok(Self { model, label })
    }

    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        Self::load(&ModelSource::from_config(config))
    }
}

impl Encoder for Model2VecEncoder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])?
            .pop()
            .context("Model2Vec returned no embedding")
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let embeddings = self.model.encode(texts).with_context(|| {
            format!("{} failed to encode {} category texts", self.label, texts.len())
        })?;
        Ok(embeddings.rows().into_iter().map(|row| row.to_vec()).collect())
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Euclidean norm of a vector
pub fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Calculate cosine similarity between two embeddings of equal length
///
/// Returns `0.0` when either vector has zero norm or the result is not finite,
/// so a degenerate embedding never contributes NaN to a score.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = norm(a);
    let norm_b = norm(b);

    if norm_a > 0.0 && norm_b > 0.0 {
        let similarity = dot / (norm_a * norm_b);
        if similarity.is_finite() {
            return similarity;
        }
    }
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DEFAULT_MODEL2VEC_MODEL;

    #[test]
    fn test_cosine_identical() {
        let v = [0.3, -1.2, 4.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal_and_opposite() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 2.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_exact_half() {
        assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0, 0.0], &[1.0, 1.0, 1.0, 1.0]), 0.5);
    }

    #[test]
    fn test_cosine_zero_vector_is_sentinel() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 1.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_cosine_non_finite_is_sentinel() {
        assert_eq!(cosine_similarity(&[f32::NAN, 1.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[f32::INFINITY, 1.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_model_source_prefers_local_path() {
        let mut config = ModelConfig::default();
        assert_eq!(
            ModelSource::from_config(&config),
            ModelSource::Hub(DEFAULT_MODEL2VEC_MODEL.to_string())
        );

        config.model_path = Some(PathBuf::from("models/potion"));
        let source = ModelSource::from_config(&config);
        assert_eq!(source, ModelSource::Local(PathBuf::from("models/potion")));
        assert_eq!(source.label(), "models/potion");
    }

    #[test]
    #[ignore] // Requires model download
    fn test_model2vec_encoder() {
        let encoder = Model2VecEncoder::from_config(&ModelConfig::default()).unwrap();

        let sneakers = encoder.embed("Footwear/Sneakers").unwrap();
        let trainers = encoder.embed("Shoes/Trainers").unwrap();
        let shirts = encoder.embed("Apparel/Shirts").unwrap();

        let batch = encoder.embed_batch(&["Footwear/Sneakers", "Apparel/Shirts"]).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].len(), sneakers.len());
        assert!(encoder.embed_batch(&[]).unwrap().is_empty());
        assert_eq!(encoder.name(), DEFAULT_MODEL2VEC_MODEL);

        assert!(
            cosine_similarity(&sneakers, &trainers) > cosine_similarity(&sneakers, &shirts)
        );
    }
}
