mod toy;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use neat_core::{report, rng, EvolveConfig, Organism, Population};
use rand::Rng;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use toy::ToyGenome;

const GENOME_SIZE: usize = 8;
const TARGET_WEIGHT_SUM: f64 = 10.0;
const WINNER_ERROR: f64 = 0.01;

#[derive(Parser)]
#[command(name = "neat-cli")]
#[command(about = "Driver for the neat-core speciation engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve a toy weight-sum task and print per-generation summaries
    Run {
        /// Path to an engine config file (JSON); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Deterministic seed for the whole run
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Number of generations to evolve
        #[arg(long, default_value_t = 50)]
        generations: usize,

        /// Print the final species report to stdout
        #[arg(long)]
        report: bool,
    },
    /// Dump the default engine configuration to stdout
    DumpDefaultConfig,
}

/// Fitness for the toy task: drive the genome's weight sum towards
/// [`TARGET_WEIGHT_SUM`].
fn evaluate(pop: &mut Population<ToyGenome>) {
    for species in &mut pop.species {
        for org in &mut species.organisms {
            org.error = (org.genome.weight_sum() - TARGET_WEIGHT_SUM).abs();
            org.fitness = 1.0 / (1.0 + org.error);
            org.is_winner = org.error < WINNER_ERROR;
        }
    }
}

struct GenerationSummary {
    species: usize,
    organisms: usize,
    best_fitness: f64,
    best_error: f64,
    winner: bool,
}

/// One full generation turnover: fitness adjustment, offspring accounting,
/// reproduction, and replacement of the old generation.
fn epoch<R: Rng + ?Sized>(
    pop: &mut Population<ToyGenome>,
    generation: usize,
    cfg: &EvolveConfig,
    rng: &mut R,
) -> Result<GenerationSummary> {
    evaluate(pop);

    let best = pop
        .species
        .iter()
        .flat_map(|s| s.organisms.iter())
        .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
        .context("population has no organisms")?;
    let summary = GenerationSummary {
        species: pop.species.len(),
        organisms: pop.organism_count(),
        best_fitness: best.fitness,
        best_error: best.error,
        winner: best.is_winner,
    };

    for species in &mut pop.species {
        species.adjust_fitness(cfg);
        species.compute_avg_fitness();
        species.compute_max_fitness();
    }

    // External fitness normalization: each organism's fractional share is
    // its adjusted fitness over the population-wide mean.
    let total_fitness: f64 = pop
        .species
        .iter()
        .flat_map(|s| s.organisms.iter())
        .map(|o| o.fitness)
        .sum();
    let overall_avg = total_fitness / pop.organism_count() as f64;
    for species in &mut pop.species {
        for org in &mut species.organisms {
            org.expected_offspring = org.fitness / overall_avg;
        }
    }

    // Quotas are counted and consumed in ranked order with the skim
    // threaded through, so no fractional share is lost.
    let ranked = pop.sorted_species_indices();
    let mut skim = 0.0;
    for &index in &ranked {
        skim = pop.species[index].count_offspring(skim);
    }

    // Poor performers marked at adjustment keep their counted share but do
    // not get to reproduce.
    for species in &mut pop.species {
        species.organisms.retain(|o| !o.to_eliminate);
    }

    for &index in &ranked {
        pop.reproduce_species(index, generation, &ranked, cfg, rng)?;
    }

    // The new generation replaces the old one wholesale.
    for species in &mut pop.species {
        species.organisms.retain(|o| o.generation == generation);
    }
    pop.species.retain(|s| s.size() > 0);
    for species in &mut pop.species {
        if species.is_novel {
            species.is_novel = false;
        } else {
            species.age += 1;
        }
    }

    Ok(summary)
}

fn load_config(path: Option<&PathBuf>) -> Result<EvolveConfig> {
    let cfg = match path {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("failed to open config {path:?}"))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("failed to parse config {path:?}"))?
        }
        None => EvolveConfig::default(),
    };
    cfg.validate().context("invalid engine config")?;
    Ok(cfg)
}

fn run(config: Option<PathBuf>, seed: u64, generations: usize, print_report: bool) -> Result<()> {
    let cfg = load_config(config.as_ref())?;
    let mut seed_rng = rng::create_rng(seed);

    let mut pop: Population<ToyGenome> = Population::new();
    for id in 0..cfg.pop_size {
        let genome = ToyGenome::random(id as u64, GENOME_SIZE, &mut seed_rng);
        pop.speciate_offspring(Organism::new(0.0, genome, 0), &cfg)
            .context("failed to speciate the initial population")?;
    }

    println!("=== Toy weight-sum evolution ===");
    println!(
        "Seed: {seed}, population: {}, generations: {generations}",
        cfg.pop_size
    );
    println!();

    for generation in 1..=generations {
        let mut gen_rng = rng::derive_generation_rng(seed, generation);
        let summary = epoch(&mut pop, generation, &cfg, &mut gen_rng)
            .with_context(|| format!("reproduction failed in generation {generation}"))?;
        println!(
            "gen {:>4}: species {:>3}, organisms {:>4}, best fitness {:.4} (error {:.4}){}",
            generation,
            summary.species,
            summary.organisms,
            summary.best_fitness,
            summary.best_error,
            if summary.winner { "  WINNER" } else { "" },
        );
        if summary.winner {
            break;
        }
    }

    if print_report {
        evaluate(&mut pop);
        println!();
        let mut out = std::io::stdout().lock();
        report::write_population(&pop.species, &mut out)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            seed,
            generations,
            report,
        } => run(config, seed, generations, report),
        Commands::DumpDefaultConfig => {
            println!("{}", serde_json::to_string_pretty(&EvolveConfig::default())?);
            Ok(())
        }
    }
}
