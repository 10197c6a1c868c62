//! Print a category tree as flattened paths

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use category_mapper::taxonomy::{flatten, read_tree};

pub fn run(tree: &Path, json: bool) -> Result<()> {
    let paths = flatten(&read_tree(tree)?)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&paths)?);
        return Ok(());
    }

    for p in &paths {
        println!("{}  {}", p.id.dimmed(), p.full_path);
    }
    println!();
    println!("{} {} categories", "→".dimmed(), paths.len());

    Ok(())
}
