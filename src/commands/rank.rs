//! Rank target categories for a single query

use anyhow::Result;
use colored::Colorize;

use category_mapper::taxonomy::CategoryMatcher;

use super::{load_encoder, resolve_config, target_cache};
use crate::RunArgs;

pub fn run(query: &str, top_k: Option<usize>, json: bool, run: &RunArgs) -> Result<()> {
    let config = resolve_config(run)?;
    let top_k = top_k.unwrap_or(config.top_k);

    let encoder = load_encoder(&config)?;
    let cache = target_cache(&config, &encoder, run.rebuild)?;

    let matcher = CategoryMatcher::new(&cache, &encoder).with_weights(config.weights);
    let results = matcher.rank(query, top_k)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!();
    println!("{}", "Category Matches".bold());
    println!("{}", "=".repeat(50));
    println!("Query: {}", query.dimmed());
    println!();

    if results.is_empty() {
        println!("{}", "Target cache is empty.".yellow());
        return Ok(());
    }

    for (i, r) in results.iter().enumerate() {
        let score_pct = format!("{:.0}%", r.score * 100.0);
        let score_colored = if r.score > config.threshold {
            score_pct.green()
        } else {
            score_pct.red()
        };
        println!(
            "  {}. {} {} ({})",
            i + 1,
            r.full_path.cyan().bold(),
            score_colored,
            r.category_id.dimmed()
        );
    }
    println!();
    println!(
        "{}",
        format!("Scores above {} are accepted when mapping.", config.threshold).dimmed()
    );

    Ok(())
}
