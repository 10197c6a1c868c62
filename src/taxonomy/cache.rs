//! Embedding cache for target categories
//!
//! Holds a path embedding and a name embedding for every target category,
//! keyed by category id. Persisted as a JSON object:
//!
//! ```json
//! {"<id>": {"path_embedding": [..], "name_embedding": [..], "full_path": "..", "name": ".."}}
//! ```
//!
//! The file is never invalidated automatically: if the target tree changes,
//! the cache file has to be deleted (or rebuilt with `--rebuild`).

use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use super::embedder::{norm, Encoder};
use super::tree::CategoryPath;
use crate::core::error::{Error, Result};

/// Number of categories encoded per batch call
const BATCH_SIZE: usize = 64;

/// Cached embeddings and metadata for one target category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingEntry {
    pub path_embedding: Vec<f32>,
    pub name_embedding: Vec<f32>,
    pub full_path: String,
    pub name: String,
}

/// Target category embeddings keyed by category id
///
/// Iteration is in ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddingCache {
    entries: BTreeMap<String, EmbeddingEntry>,
}

impl EmbeddingCache {
    /// Encode every category's path and name
    pub fn build(categories: &[CategoryPath], encoder: &dyn Encoder) -> Result<Self> {
        Self::build_with_progress(categories, encoder, &ProgressBar::hidden())
    }

    /// Same as [`EmbeddingCache::build`], advancing `progress` once per category
    pub fn build_with_progress(
        categories: &[CategoryPath],
        encoder: &dyn Encoder,
        progress: &ProgressBar,
    ) -> Result<Self> {
        let mut entries = BTreeMap::new();
        progress.set_length(categories.len() as u64);

        for chunk in categories.chunks(BATCH_SIZE) {
            let paths: Vec<&str> = chunk.iter().map(|c| c.full_path.as_str()).collect();
            let names: Vec<&str> = chunk.iter().map(|c| c.name.as_str()).collect();

            let path_embeddings = encode_batch(encoder, &paths)?;
            let name_embeddings = encode_batch(encoder, &names)?;

            for ((category, path_embedding), name_embedding) in
                chunk.iter().zip(path_embeddings).zip(name_embeddings)
            {
                if norm(&path_embedding) == 0.0 || norm(&name_embedding) == 0.0 {
                    tracing::warn!(
                        id = %category.id,
                        path = %category.full_path,
                        "zero-norm embedding; this category will always score 0"
                    );
                }

                let entry = EmbeddingEntry {
                    path_embedding,
                    name_embedding,
                    full_path: category.full_path.clone(),
                    name: category.name.clone(),
                };

                match entries.entry(category.id.clone()) {
                    btree_map::Entry::Vacant(slot) => {
                        slot.insert(entry);
                    }
                    btree_map::Entry::Occupied(_) => {
                        return Err(Error::DuplicateCategory {
                            id: category.id.clone(),
                        });
                    }
                }
            }
            progress.inc(chunk.len() as u64);
        }

        tracing::debug!(
            categories = entries.len(),
            encoder = encoder.name(),
            "built embedding cache"
        );
        Ok(Self { entries })
    }

    /// Write every entry to `path`, replacing any existing file
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| Error::io("create", path, e))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer(&mut writer, self).map_err(|e| {
            Error::io("write", path, std::io::Error::from(e))
        })?;
        writer.flush().map_err(|e| Error::io("write", path, e))?;

        tracing::debug!(path = %path.display(), entries = self.len(), "saved embedding cache");
        Ok(())
    }

    /// Read a cache previously written by [`EmbeddingCache::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io("read", path, e))?;
        let cache: EmbeddingCache =
            serde_json::from_str(&content).map_err(|e| Error::Deserialization {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        cache.check_dimensions().map_err(|reason| Error::Deserialization {
            path: path.to_path_buf(),
            reason,
        })?;

        tracing::debug!(path = %path.display(), entries = cache.len(), "loaded embedding cache");
        Ok(cache)
    }

    /// Every vector must be non-empty and share one length
    fn check_dimensions(&self) -> std::result::Result<(), String> {
        let Some(dimension) = self.dimension() else {
            return Ok(());
        };
        if dimension == 0 {
            return Err("embeddings are empty".to_string());
        }

        for (id, entry) in &self.entries {
            for (field, vector) in [
                ("path_embedding", &entry.path_embedding),
                ("name_embedding", &entry.name_embedding),
            ] {
                if vector.len() != dimension {
                    return Err(format!(
                        "`{id}`.{field} has {} dimensions, expected {dimension}",
                        vector.len()
                    ));
                }
            }
        }
        Ok(())
    }

    /// Embedding length, taken from the first entry
    pub fn dimension(&self) -> Option<usize> {
        self.entries
            .values()
            .next()
            .map(|entry| entry.path_embedding.len())
    }

    pub fn get(&self, id: &str) -> Option<&EmbeddingEntry> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EmbeddingEntry)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn encode_batch(encoder: &dyn Encoder, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
    let first = texts.first().copied().unwrap_or_default();
    let embeddings = encoder
        .embed_batch(texts)
        .map_err(|e| Error::encode(first, e))?;

    if embeddings.len() != texts.len() {
        return Err(Error::encode(
            first,
            anyhow::anyhow!(
                "encoder returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            ),
        ));
    }

    // serde_json writes NaN and inf as `null`, which `load` rejects
    for (text, embedding) in texts.iter().zip(&embeddings) {
        if embedding.iter().any(|x| !x.is_finite()) {
            return Err(Error::encode(
                text,
                anyhow::anyhow!("embedding contains a non-finite value"),
            ));
        }
    }
    Ok(embeddings)
}
