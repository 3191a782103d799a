use crate::config::EvolveConfig;
use crate::genome::Genome;
use crate::organism::Organism;
use std::fmt;

/// Unique species identifier. Assigned on creation, strictly increasing
/// within a population, never reused.
pub type SpeciesId = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum SpeciesError {
    /// The organism asked to be removed is not a member. Signals a caller
    /// consistency bug, not a normal "not found" outcome.
    OrganismNotFound {
        species_id: SpeciesId,
        genome_id: u64,
    },
}

impl fmt::Display for SpeciesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrganismNotFound {
                species_id,
                genome_id,
            } => write!(
                f,
                "attempt to remove nonexistent organism (genome #{genome_id}) from species #{species_id}"
            ),
        }
    }
}

impl std::error::Error for SpeciesError {}

/// A group of genetically compatible organisms: the unit of fitness sharing
/// and reproduction.
///
/// Member order is significant. After [`Species::adjust_fitness`] the
/// collection is sorted best-first and index 0 acts as the species'
/// representative for compatibility checks and interspecies mating.
#[derive(Clone, Debug)]
pub struct Species<G> {
    pub id: SpeciesId,
    /// Generations survived. Starts at 1.
    pub age: u32,
    pub avg_fitness: f64,
    pub max_fitness: f64,
    /// Highest original fitness any member has ever reached.
    pub max_fitness_ever: f64,
    /// Integer offspring quota for this generation, rebuilt by
    /// [`Species::count_offspring`].
    pub expected_offspring: usize,
    /// Created this generation; exempt from aging effects until it survives
    /// its first full cycle.
    pub is_novel: bool,
    /// Age at which `max_fitness_ever` was last beaten.
    pub age_of_last_improvement: u32,
    pub organisms: Vec<Organism<G>>,
}

impl<G: Genome> Species<G> {
    pub fn new(id: SpeciesId) -> Self {
        Self {
            id,
            age: 1,
            avg_fitness: 0.0,
            max_fitness: 0.0,
            max_fitness_ever: 0.0,
            expected_offspring: 0,
            is_novel: false,
            age_of_last_improvement: 0,
            organisms: Vec::new(),
        }
    }

    /// A species that won't age inside its first generation.
    pub fn novel(id: SpeciesId) -> Self {
        let mut s = Self::new(id);
        s.is_novel = true;
        s
    }

    pub fn size(&self) -> usize {
        self.organisms.len()
    }

    pub fn first_organism(&self) -> Option<&Organism<G>> {
        self.organisms.first()
    }

    /// Append an organism and point it back at this species.
    pub fn add_organism(&mut self, mut organism: Organism<G>) {
        organism.species_id = Some(self.id);
        self.organisms.push(organism);
    }

    /// Remove the member with the given genome id.
    ///
    /// The collection is left untouched when the organism is not a member;
    /// that case is an invariant violation on the caller's side.
    pub fn remove_organism(&mut self, genome_id: u64) -> Result<(), SpeciesError> {
        let matches = self
            .organisms
            .iter()
            .filter(|o| o.genome.id() == genome_id)
            .count();
        if matches != 1 {
            return Err(SpeciesError::OrganismNotFound {
                species_id: self.id,
                genome_id,
            });
        }
        self.organisms.retain(|o| o.genome.id() != genome_id);
        Ok(())
    }

    /// Apply stagnation penalties, the young-species boost, and fitness
    /// sharing, then rank members best-first and mark parents.
    ///
    /// Reorders the member collection; later stages rely on index 0 being
    /// the best organism.
    pub fn adjust_fitness(&mut self, cfg: &EvolveConfig) {
        let mut age_debt =
            (self.age as i64 - self.age_of_last_improvement as i64 + 1) - cfg.dropoff_age as i64;
        if age_debt == 0 {
            age_debt = 1;
        }

        let size = self.organisms.len();
        for org in &mut self.organisms {
            org.original_fitness = org.fitness;

            // Extreme penalty for a long period of stagnation.
            if age_debt >= 1 {
                org.fitness *= 0.01;
            }

            // Fitness boost for young species (niching).
            if self.age <= 10 {
                org.fitness *= cfg.age_significance;
            }

            if org.fitness < 0.0 {
                org.fitness = 0.0001;
            }

            // Share fitness with the species.
            org.fitness /= size as f64;
        }

        // Most fit first. Stable sort keeps ties reproducible.
        self.organisms
            .sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        if self.organisms[0].original_fitness > self.max_fitness_ever {
            self.age_of_last_improvement = self.age;
            self.max_fitness_ever = self.organisms[0].original_fitness;
        }

        // Adding 1.0 ensures at least one parent survives.
        let num_parents = (cfg.survival_thresh * size as f64 + 1.0).floor() as usize;

        self.organisms[0].is_champion = true;
        for org in self.organisms.iter_mut().skip(num_parents) {
            org.to_eliminate = true;
        }
    }

    /// Average of the current (adjusted) member fitnesses. Idempotent.
    pub fn compute_avg_fitness(&mut self) -> f64 {
        let total: f64 = self.organisms.iter().map(|o| o.fitness).sum();
        self.avg_fitness = total / self.organisms.len() as f64;
        self.avg_fitness
    }

    /// Maximum of the current (adjusted) member fitnesses. Idempotent.
    pub fn compute_max_fitness(&mut self) -> f64 {
        let mut max = 0.0;
        for org in &self.organisms {
            if org.fitness > max {
                max = org.fitness;
            }
        }
        self.max_fitness = max;
        self.max_fitness
    }

    /// Convert the members' fractional offspring shares into this species'
    /// integer quota, threading fractional remainders through `skim`.
    ///
    /// The incoming skim is left over from the previously counted species;
    /// fractions accumulate until they add up to a whole offspring, so no
    /// share is lost to rounding across the chain. Returns the leftover skim
    /// for the next species.
    pub fn count_offspring(&mut self, mut skim: f64) -> f64 {
        self.expected_offspring = 0;
        for org in &self.organisms {
            self.expected_offspring += org.expected_offspring.floor() as usize;
            skim += org.expected_offspring.fract();

            if skim >= 1.0 {
                let skim_intpart = skim.floor();
                self.expected_offspring += skim_intpart as usize;
                skim -= skim_intpart;
            }
        }
        skim
    }

    /// Generations since the last fitness record.
    pub fn last_improved(&self) -> u32 {
        self.age - self.age_of_last_improvement
    }

    /// Rescan for the member with the strictly highest current fitness.
    /// Distinct from the `is_champion` flag, which reflects rank at the last
    /// adjustment.
    pub fn find_champion(&self) -> Option<&Organism<G>> {
        let mut best_fitness = 0.0;
        let mut champion = None;
        for org in &self.organisms {
            if org.fitness > best_fitness {
                best_fitness = org.fitness;
                champion = Some(org);
            }
        }
        champion
    }
}

impl<G: Genome> fmt::Display for Species<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Species #{}, age={}, avg_fitness={:.3}, max_fitness={:.3}, max_fitness_ever={:.3}, expected_offspring={}, age_of_last_improvement={}",
            self.id,
            self.age,
            self.avg_fitness,
            self.max_fitness,
            self.max_fitness_ever,
            self.expected_offspring,
            self.age_of_last_improvement,
        )?;
        writeln!(f, "Has {} Organisms:", self.organisms.len())?;
        for org in &self.organisms {
            writeln!(f, "\t{org}")?;
        }
        Ok(())
    }
}
