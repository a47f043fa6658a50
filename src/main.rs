//! Genesis - Entry Point
//!
//! Runs the attachment-spectrum experiment: an egoist founder and a martyr
//! founder start side by side, and the report shows who survives longer and
//! whose lineage spreads.

use clap::Parser;
use std::path::PathBuf;

use genesis::core::config::SimulationConfig;
use genesis::core::error::Result;
use genesis::simulation::{RunReport, Simulation};

/// Attachment-spectrum lineage simulation
#[derive(Parser, Debug)]
#[command(name = "genesis")]
#[command(about = "Simulate how attachment affects survival and lineage")]
struct Args {
    /// TOML config file; missing keys use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Tick budget
    #[arg(long)]
    ticks: Option<u64>,

    /// Stop early once this many entities are alive
    #[arg(long)]
    max_population: Option<usize>,

    /// Attachment of the first founder (the egoist)
    #[arg(long)]
    adam: Option<f64>,

    /// Attachment of the second founder (the martyr)
    #[arg(long)]
    eve: Option<f64>,

    /// Write the run report as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Print every founder decision, not just the summary
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "genesis=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;

    println!("--- Genesis: The Spectrum of Love ---");
    let mut sim = Simulation::new(config)?;
    for id in sim.population().to_vec() {
        let founder = sim.entity(id)?;
        println!(
            "Subject: {} (Attachment: {:.2}, Threshold: {:.2})",
            founder.label(),
            founder.attachment(),
            founder.panic_threshold()
        );
    }
    println!("{}", "-".repeat(50));

    let report = sim.run();

    for founder in &report.founders {
        if let (Some(tick), Some(children)) = (founder.died_at, founder.children_at_death) {
            println!(
                "{} died at Step {}. Children count: {} (Entangled)",
                founder.name, tick, children
            );
        }
    }
    println!("{}", "-".repeat(50));
    println!("Simulation Ends.");
    println!("{}", report.summary());

    print_decisions(&report, args.verbose);

    if let Some(path) = &args.json {
        std::fs::write(path, report.to_json()?)?;
        println!("\nFull report written to {}", path.display());
    }

    Ok(())
}

fn build_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(ticks) = args.ticks {
        config.max_ticks = ticks;
    }
    if let Some(cap) = args.max_population {
        config.max_population = cap;
    }
    if let (Some(attachment), Some(founder)) = (args.adam, config.founders.get_mut(0)) {
        founder.attachment = attachment;
    }
    if let (Some(attachment), Some(founder)) = (args.eve, config.founders.get_mut(1)) {
        founder.attachment = attachment;
    }

    config.validate()?;
    Ok(config)
}

fn print_decisions(report: &RunReport, verbose: bool) {
    const KEY_DECISIONS: usize = 10;

    for founder in &report.founders {
        println!("\n[{}'s Key Decisions]", founder.name);
        if founder.decisions.is_empty() {
            println!("  (none)");
            continue;
        }
        let shown = if verbose {
            founder.decisions.len()
        } else {
            KEY_DECISIONS.min(founder.decisions.len())
        };
        for line in &founder.decisions[..shown] {
            println!("{}", line);
        }
        if shown < founder.decisions.len() {
            println!("  ... {} more (use --verbose)", founder.decisions.len() - shown);
        }
    }
}
