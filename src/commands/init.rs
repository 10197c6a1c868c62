//! Config file generator

use anyhow::{Context, Result};
use colored::*;
use std::fs;

use category_mapper::core::config::{Config, DEFAULT_CONFIG_FILE};

pub fn run(force: bool) -> Result<()> {
    let config_path = std::env::current_dir()
        .context("Failed to read working directory")?
        .join(DEFAULT_CONFIG_FILE);

    if config_path.exists() && !force {
        println!(
            "{}",
            format!("{} already exists. Use --force to overwrite.", DEFAULT_CONFIG_FILE).yellow()
        );
        return Ok(());
    }

    fs::write(&config_path, Config::default_json())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("{} Created {}", "✓".green(), config_path.display());
    println!();
    println!("{}", "Configuration:".cyan());
    println!("{}", Config::default_json());
    println!();
    println!(
        "{}",
        format!(
            "Edit {} to change tree paths, threshold, weights, or the model.",
            DEFAULT_CONFIG_FILE
        )
        .dimmed()
    );

    Ok(())
}
