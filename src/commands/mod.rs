//! CLI command runners

pub mod flatten;
pub mod init;
pub mod map;
pub mod rank;

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use category_mapper::taxonomy::{
    load_or_build_cache, read_tree, CacheOrigin, EmbeddingCache, Encoder, Model2VecEncoder,
    ModelSource,
};
use category_mapper::Config;

use crate::RunArgs;

/// Load config and apply command-line overrides
fn resolve_config(run: &RunArgs) -> Result<Config> {
    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let mut config = Config::load(run.config.as_deref(), &cwd)?;

    if let Some(target) = &run.target {
        config.target_tree = target.clone();
    }
    if let Some(cache) = &run.cache {
        config.cache_file = cache.clone();
    }
    Ok(config)
}

fn load_encoder(config: &Config) -> Result<Model2VecEncoder> {
    let source = ModelSource::from_config(&config.model);
    println!("{}", format!("Loading model ({})...", source.label()).dimmed());

    Model2VecEncoder::load(&source).context("Failed to load Model2Vec model")
}

/// Load the target cache, or build and save it from the target tree
fn target_cache(config: &Config, encoder: &dyn Encoder, rebuild: bool) -> Result<EmbeddingCache> {
    let cache_path = &config.cache_file;
    let building = rebuild || !cache_path.exists();

    println!("Loading target categories from {}...", config.target_tree.display());
    let targets = read_tree(&config.target_tree)?;

    let progress = if building {
        println!("{}", "Creating embeddings...".cyan());
        embedding_progress()
    } else {
        println!("{}", "Loading cached embeddings...".cyan());
        ProgressBar::hidden()
    };

    let (cache, origin) = load_or_build_cache(&targets, cache_path, encoder, rebuild, &progress)?;
    progress.finish_and_clear();

    match origin {
        CacheOrigin::Built => println!(
            "{} Saved {} category embeddings to {}",
            "✓".green(),
            cache.len(),
            cache_path.display()
        ),
        CacheOrigin::Loaded => println!(
            "{} Loaded {} category embeddings from {}",
            "✓".green(),
            cache.len(),
            cache_path.display()
        ),
    }
    Ok(cache)
}

fn embedding_progress() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} categories ({percent}%)",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    pb
}
