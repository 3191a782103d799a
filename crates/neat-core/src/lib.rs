//! Speciation and reproduction engine for NEAT-style neuroevolution.
//!
//! The engine groups organisms into species by genetic compatibility, applies
//! fitness sharing with age-based penalties and boosts, converts fractional
//! offspring shares into integer quotas without rounding loss, and produces
//! the next generation through mutation, crossover, and species
//! (re)assignment. Genome encoding, phenotype construction, and fitness
//! evaluation live behind the [`Genome`] trait and are supplied by the
//! caller.
//!
//! All stochastic choices draw from an injected [`rand::Rng`]; seed one via
//! [`rng::create_rng`] and a run replays exactly.

pub mod config;
pub mod genome;
pub mod organism;
pub mod population;
pub mod report;
pub mod rng;
pub mod species;

pub use config::{EvolveConfig, EvolveConfigError};
pub use genome::{Genome, GenomeError, WeightMutationMode};
pub use organism::Organism;
pub use population::{Population, ReproduceError};
pub use species::{Species, SpeciesError, SpeciesId};
