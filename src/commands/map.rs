//! Map a source category tree onto the target tree

use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

use category_mapper::taxonomy::{build_mapping, read_tree, write_mapping, MappingOptions};
use category_mapper::Error;

use super::{load_encoder, resolve_config, target_cache};
use crate::RunArgs;

pub fn run(
    source: &Path,
    run: &RunArgs,
    output: Option<PathBuf>,
    threshold: Option<f32>,
) -> Result<()> {
    let mut config = resolve_config(run)?;
    if let Some(output) = output {
        config.output_file = output;
    }
    if let Some(threshold) = threshold {
        // `score > NaN` is always false
        if !threshold.is_finite() {
            return Err(Error::Usage(format!(
                "--threshold must be a finite number, got {threshold}"
            ))
            .into());
        }
        config.threshold = threshold;
    }

    println!("Loading source categories from {}...", source.display());
    let source_tree = read_tree(source)?;

    let encoder = load_encoder(&config)?;
    let cache = target_cache(&config, &encoder, run.rebuild)?;

    println!("{}", "Mapping categories...".cyan());
    let options = MappingOptions {
        threshold: config.threshold,
        weights: config.weights,
    };
    let (mapping, stats) = build_mapping(&source_tree, &cache, &encoder, &options)?;

    write_mapping(&mapping, &config.output_file)?;

    println!();
    println!(
        "{} {} of {} source categories matched above {} ({} dropped)",
        "✓".green(),
        stats.connections.to_string().bold(),
        stats.sources,
        config.threshold,
        stats.dropped
    );
    println!("Mapping saved to {}", config.output_file.display());

    Ok(())
}
