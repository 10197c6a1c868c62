//! Semantic category mapping between two retailers' taxonomies

pub mod core;
pub mod taxonomy;

pub use crate::core::{Config, Error, Result, Weights};
