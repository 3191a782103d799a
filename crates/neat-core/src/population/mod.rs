mod reproduce;


use crate::config::EvolveConfig;
use crate::genome::{Genome, GenomeError};
use crate::organism::Organism;
use crate::species::{Species, SpeciesId};
use std::fmt;
use tracing::debug;

/// Errors that abort a reproduction pass. Any of these is fatal for the
/// current generation's reproduction step; the caller must not continue to
/// the next species.
#[derive(Debug)]
pub enum ReproduceError {
    /// A species was asked to produce offspring while having no members.
    EmptySpecies {
        species_id: SpeciesId,
        expected_offspring: usize,
    },
    /// `compat_threshold` is zero while species exist: no offspring could
    /// ever find a compatible species.
    ZeroCompatThreshold,
    /// A genome collaborator operation failed; surfaced unchanged.
    Genome(GenomeError),
}

impl fmt::Display for ReproduceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySpecies {
                species_id,
                expected_offspring,
            } => write!(
                f,
                "species #{species_id} expects {expected_offspring} offspring but has no members"
            ),
            Self::ZeroCompatThreshold => write!(
                f,
                "compatibility threshold is zero; no offspring could join any species"
            ),
            Self::Genome(err) => write!(f, "genome operation failed: {err}"),
        }
    }
}

impl std::error::Error for ReproduceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Genome(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// All species of the current generation plus the monotonically increasing
/// species-id counter.
#[derive(Clone, Debug)]
pub struct Population<G> {
    pub species: Vec<Species<G>>,
    last_species_id: SpeciesId,
}

impl<G> Default for Population<G> {
    fn default() -> Self {
        Self {
            species: Vec::new(),
            last_species_id: 0,
        }
    }
}

impl<G: Genome> Population<G> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the most recently created species. Ids are never reused.
    pub fn last_species_id(&self) -> SpeciesId {
        self.last_species_id
    }

    /// Total organism count across all species.
    pub fn organism_count(&self) -> usize {
        self.species.iter().map(|s| s.size()).sum()
    }

    /// Species indices ranked best-first by the original fitness of each
    /// species' first organism. Assumes fitness adjustment already sorted
    /// members; species without members rank last. Ties keep insertion
    /// order, so a fixed seed replays identically.
    pub fn sorted_species_indices(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.species.len()).collect();
        order.sort_by(|&a, &b| {
            let fa = self.species[a]
                .first_organism()
                .map(|o| o.original_fitness)
                .unwrap_or(f64::NEG_INFINITY);
            let fb = self.species[b]
                .first_organism()
                .map(|o| o.original_fitness)
                .unwrap_or(f64::NEG_INFINITY);
            fb.total_cmp(&fa)
        });
        order
    }

    /// Open a fresh novel species around `baby`.
    pub fn create_first_species(&mut self, baby: Organism<G>) {
        self.last_species_id += 1;
        let mut species = Species::novel(self.last_species_id);
        debug!(
            species_id = species.id,
            genome_id = baby.genome.id(),
            "creating new species for offspring"
        );
        species.add_organism(baby);
        self.species.push(species);
    }

    /// Place a produced organism into the best-matching compatible species,
    /// or open a new one.
    ///
    /// Among all species whose representative (first organism) is strictly
    /// closer than `compat_threshold`, the one with the smallest distance
    /// wins, not the first encountered.
    pub fn speciate_offspring(
        &mut self,
        baby: Organism<G>,
        cfg: &EvolveConfig,
    ) -> Result<(), ReproduceError> {
        if self.species.is_empty() {
            self.create_first_species(baby);
            return Ok(());
        }
        if cfg.compat_threshold == 0.0 {
            return Err(ReproduceError::ZeroCompatThreshold);
        }

        let mut best: Option<(usize, f64)> = None;
        for (index, species) in self.species.iter().enumerate() {
            if let Some(representative) = species.first_organism() {
                let distance = baby.genome.compatibility(&representative.genome, cfg);
                if distance < cfg.compat_threshold
                    && best.is_none_or(|(_, best_distance)| distance < best_distance)
                {
                    best = Some((index, distance));
                }
            }
        }

        match best {
            Some((index, distance)) => {
                debug!(
                    species_id = self.species[index].id,
                    genome_id = baby.genome.id(),
                    distance,
                    "compatible species found for offspring"
                );
                self.species[index].add_organism(baby);
            }
            None => self.create_first_species(baby),
        }
        Ok(())
    }
}
