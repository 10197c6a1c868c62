//! Mapping pipeline: source tree -> best target category per source node
//!
//! Connections are keyed asymmetrically: `sourceId` is the source category's
//! full path while `targetId` is the target category's id. Consumers of the
//! mapping file rely on this layout.

use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::cache::EmbeddingCache;
use super::embedder::Encoder;
use super::matcher::CategoryMatcher;
use super::tree::{flatten, CategoryNode};
use crate::core::config::Weights;
use crate::core::error::{Error, Result};

/// One accepted source -> target match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source_id: String,
    pub target_id: String,
}

/// Output document written at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub connections: Vec<Connection>,
}

/// Knobs for a mapping run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappingOptions {
    /// A match is kept only when its score is strictly greater than this
    pub threshold: f32,
    pub weights: Weights,
}

impl Default for MappingOptions {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            weights: Weights::default(),
        }
    }
}

/// Counts reported after a mapping run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingStats {
    pub sources: usize,
    pub connections: usize,
    pub dropped: usize,
}

/// Whether the cache came from disk or was freshly built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOrigin {
    Loaded,
    Built,
}

/// Whether a best-match score clears the threshold
pub fn accepts(score: f32, threshold: f32) -> bool {
    score > threshold
}

/// Match every source category against the cache
///
/// Connections follow the source tree's pre-order; categories whose best
/// score does not clear the threshold are left out.
pub fn build_mapping(
    source: &[CategoryNode],
    cache: &EmbeddingCache,
    encoder: &dyn Encoder,
    options: &MappingOptions,
) -> Result<(Mapping, MappingStats)> {
    let categories = flatten(source)?;
    let matcher = CategoryMatcher::new(cache, encoder).with_weights(options.weights);

    let mut connections = Vec::new();
    for category in &categories {
        match matcher.best_match(&category.full_path)? {
            Some(best) if accepts(best.score, options.threshold) => {
                tracing::debug!(
                    source = %category.full_path,
                    target = %best.full_path,
                    score = best.score,
                    "matched"
                );
                connections.push(Connection {
                    source_id: category.full_path.clone(),
                    target_id: best.category_id,
                });
            }
            Some(best) => {
                tracing::debug!(
                    source = %category.full_path,
                    candidate = %best.full_path,
                    score = best.score,
                    "below threshold"
                );
            }
            None => {}
        }
    }

    let stats = MappingStats {
        sources: categories.len(),
        connections: connections.len(),
        dropped: categories.len() - connections.len(),
    };
    Ok((Mapping { connections }, stats))
}

/// Load the cache at `cache_path` if it exists, otherwise build and save it
///
/// An existing file is trusted as-is: a changed target tree is not detected.
/// A corrupt file is an error, not a reason to rebuild. `rebuild` skips the
/// load and overwrites the file.
pub fn load_or_build_cache(
    targets: &[CategoryNode],
    cache_path: &Path,
    encoder: &dyn Encoder,
    rebuild: bool,
    progress: &ProgressBar,
) -> Result<(EmbeddingCache, CacheOrigin)> {
    if cache_path.exists() && !rebuild {
        let cache = EmbeddingCache::load(cache_path)?;
        return Ok((cache, CacheOrigin::Loaded));
    }

    let categories = flatten(targets)?;
    let cache = EmbeddingCache::build_with_progress(&categories, encoder, progress)?;
    cache.save(cache_path)?;
    Ok((cache, CacheOrigin::Built))
}

/// Write the mapping as pretty-printed JSON, replacing any existing file
pub fn write_mapping(mapping: &Mapping, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(mapping)
        .map_err(|e| Error::io("serialize", path, std::io::Error::from(e)))?;
    fs::write(path, content).map_err(|e| Error::io("write", path, e))
}
