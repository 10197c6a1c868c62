//! Category taxonomy matching
//!
//! Maps a source retailer's category tree onto a target tree using
//! Model2Vec embeddings of category names and paths.
//!
//! # Components
//!
//! - `tree`: Category tree parsing and flattening into paths
//! - `embedder`: Encoder abstraction and Model2Vec wrapper
//! - `cache`: Persisted target category embeddings
//! - `matcher`: Blended similarity ranking
//! - `pipeline`: Source tree -> connection mapping

pub mod cache;
pub mod embedder;
pub mod matcher;
pub mod pipeline;
pub mod tree;

pub use cache::{EmbeddingCache, EmbeddingEntry};
pub use embedder::{cosine_similarity, Encoder, Model2VecEncoder, ModelSource};
pub use matcher::{CategoryMatcher, MatchResult};
pub use pipeline::{
    accepts, build_mapping, load_or_build_cache, write_mapping, CacheOrigin, Connection, Mapping,
    MappingOptions, MappingStats,
};
pub use tree::{flatten, read_tree, CategoryNode, CategoryPath};
