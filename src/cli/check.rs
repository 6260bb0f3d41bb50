use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use super::survey::{open, record_parser, survey, Record};
use xmlmap::ParserConfig;

/// Check a document and print how many objects each tag produced
pub fn run(input: PathBuf, config: ParserConfig) -> Result<()> {
    info!("Checking {}", input.display());

    let tags = survey(&input)?;
    let parser = record_parser(config, tags.keys());
    let objects = parser
        .start(open(&input)?)
        .with_context(|| format!("Failed to map {}", input.display()))?;

    let named = objects
        .iter()
        .filter(|o| o.with(|r: &Record| r.name.is_some() || r.id.is_some()).unwrap_or(false))
        .count();

    println!("{}", input.display());
    for (tag, count) in &tags {
        println!("  {:<24} {:>8}", tag, count);
    }
    println!("  {} elements, {} with a name or id", objects.len(), named);
    Ok(())
}
