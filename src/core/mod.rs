//! Configuration and error types shared by every stage

pub mod config;
pub mod error;

pub use config::{Config, ModelConfig, Weights};
pub use error::{Error, Result};
