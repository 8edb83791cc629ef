//! colindar CLI: mine co-location patterns from a configured dataset.

use clap::Parser;
use colindar::grid::GridIndex;
use colindar::miner::ColocationMiner;
use colindar::neighborhood::NeighborhoodMap;
use colindar::nrtree::NRTree;
use colindar::report::{peak_memory_mb, MiningReport};
use colindar::{FeatureSpace, MinerConfig, MinerResult, SpatialDataset};
use colored::Colorize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "colindar")]
#[command(about = "Rarity-weighted spatial co-location pattern mining")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(default_value = "./config/config.txt")]
    config: PathBuf,

    /// Result file path
    #[arg(short, long, default_value = "results.txt")]
    output: PathBuf,

    /// Also write a JSON report next to the text report
    #[arg(long)]
    json: bool,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("{} {e}", "Error:".red().bold());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> MinerResult<()> {
    let start = Instant::now();

    let config = MinerConfig::load(&cli.config)?;
    if !cli.quiet {
        section("Configuration");
        kv("Dataset", config.dataset_path.display());
        kv("Neighbor distance", config.neighbor_distance);
        kv("Min prevalence", config.min_prev);
    }

    let dataset = SpatialDataset::load_csv(&config.dataset_path)?;
    let space = FeatureSpace::build(&dataset);
    if !cli.quiet {
        section("Dataset");
        kv("Instances", dataset.len());
        kv("Feature types", space.len());
    }

    let grid = GridIndex::new(config.neighbor_distance)?;
    let pairs = grid.neighbor_pairs(&dataset, &space);
    let map = NeighborhoodMap::from_pairs(&pairs, &dataset, &space);
    let tree = NRTree::build(&map, &dataset, &space);
    if !cli.quiet {
        section("Neighborhoods");
        kv("Neighbor pairs", pairs.len());
        kv("Ordered stars", tree.center_count());
    }

    let mut miner = ColocationMiner::new(config.min_prev);
    if !cli.quiet {
        section("Mining");
        miner = miner.with_progress(Box::new(|_, _, message, percent| {
            println!("  {} {message}", format!("[{percent:5.1}%]").dimmed());
        }));
    }
    let outcome = miner.mine(&dataset, &space, &tree)?;

    let report = MiningReport {
        dataset_path: config.dataset_path.display().to_string(),
        total_instances: dataset.len(),
        neighbor_distance: config.neighbor_distance,
        min_prev: config.min_prev,
        elapsed_secs: start.elapsed().as_secs_f64(),
        peak_memory_mb: peak_memory_mb(),
        patterns: outcome
            .patterns
            .iter()
            .map(|p| p.resolve(&space))
            .collect(),
    };

    report.write_text(&cli.output)?;
    if cli.json {
        report.write_json(&cli.output.with_extension("json"))?;
    }

    if !cli.quiet {
        section("Results");
        kv("Patterns found", report.patterns.len());
        kv("Elapsed", format!("{:.3} s", report.elapsed_secs));
        println!(
            "\n{} results written to {}",
            "Done!".green().bold(),
            cli.output.display()
        );
    }
    Ok(())
}

fn section(title: &str) {
    println!("\n{}", format!("=== {title} ===").cyan().bold());
}

fn kv(key: &str, value: impl std::fmt::Display) {
    println!("  {}: {value}", key.white().bold());
}
