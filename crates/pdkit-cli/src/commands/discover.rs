//! Externals discovery listing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Args;
use pdkit_io::discover_externals;
use serde::Serialize;

use super::common::load_config;

/// List abstractions and externals found on disk.
#[derive(Args)]
pub struct DiscoverArgs {
    /// Directories to search before the configured ones
    pub paths: Vec<PathBuf>,

    /// Skip the platform's standard externals directories
    #[arg(long)]
    pub no_defaults: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct Ports {
    inlets: Option<usize>,
    outlets: Option<usize>,
}

/// Run the discover command.
pub fn run(args: DiscoverArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let search: Vec<PathBuf> = args
        .paths
        .iter()
        .chain(&config.discovery.paths)
        .cloned()
        .collect();
    let include_defaults = config.discovery.include_defaults && !args.no_defaults;
    let externals = discover_externals(&search, include_defaults);

    if args.json {
        let listing: BTreeMap<&str, Ports> = externals
            .iter()
            .map(|(name, &(inlets, outlets))| (name.as_str(), Ports { inlets, outlets }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if externals.is_empty() {
        println!("No externals found");
        return Ok(());
    }

    println!("{:<32} {:>7} {:>7}", "Name", "Inlets", "Outlets");
    println!("{}", "-".repeat(48));
    for (name, (inlets, outlets)) in &externals {
        println!("{name:<32} {:>7} {:>7}", count(*inlets), count(*outlets));
    }
    println!();
    println!("{} found", externals.len());
    Ok(())
}

fn count(ports: Option<usize>) -> String {
    ports.map_or_else(|| "?".to_string(), |n| n.to_string())
}
