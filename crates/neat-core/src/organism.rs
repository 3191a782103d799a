use crate::genome::Genome;
use crate::species::SpeciesId;
use std::fmt;

/// One genome plus its fitness and evolutionary bookkeeping for one
/// generation.
///
/// Fitness is mutated in place by fitness sharing and age penalties;
/// `original_fitness` keeps the pre-adjustment value for historical-best
/// comparisons and interspecies mating.
#[derive(Clone, Debug)]
pub struct Organism<G> {
    pub genome: G,
    /// Adjusted fitness: shared, penalized, or boosted in place.
    pub fitness: f64,
    /// Fitness as assigned by the external evaluator, before adjustment.
    pub original_fitness: f64,
    /// Task error metric, carried through for diagnostic reports only.
    pub error: f64,
    /// Fractional offspring share, assigned by the external
    /// fitness-normalization step before reproduction runs.
    pub expected_offspring: f64,
    /// Generation this organism was created in.
    pub generation: usize,
    /// Best of its species after the last fitness adjustment.
    pub is_champion: bool,
    /// Ranked too low at the last adjustment to be a parent.
    pub to_eliminate: bool,
    /// Solved the task, per the external evaluator.
    pub is_winner: bool,
    /// Remaining reserved near-verbatim clones granted to a population-wide
    /// best performer by an external driver.
    pub super_champ_offspring: u32,
    pub is_population_champion: bool,
    /// Direct child of the population champion's last reserved clone.
    pub is_population_champion_child: bool,
    /// Best fitness the population-champion lineage has reached.
    pub highest_fitness: f64,
    /// Provenance: produced by a structural mutation.
    pub mutation_struct_baby: bool,
    /// Provenance: produced by crossover.
    pub mate_baby: bool,
    /// Non-owning back-reference to the species this organism belongs to.
    /// Set exactly once, when the organism is placed into a species.
    pub species_id: Option<SpeciesId>,
}

impl<G: Genome> Organism<G> {
    pub fn new(fitness: f64, genome: G, generation: usize) -> Self {
        Self {
            genome,
            fitness,
            original_fitness: 0.0,
            error: 0.0,
            expected_offspring: 0.0,
            generation,
            is_champion: false,
            to_eliminate: false,
            is_winner: false,
            super_champ_offspring: 0,
            is_population_champion: false,
            is_population_champion_child: false,
            highest_fitness: 0.0,
            mutation_struct_baby: false,
            mate_baby: false,
            species_id: None,
        }
    }
}

impl<G: Genome> fmt::Display for Organism<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let champ = if self.is_champion { " CHAMPION" } else { "" };
        let eliminate = if self.to_eliminate { " ELIMINATE" } else { "" };
        write!(
            f,
            "[Organism #{} generation: {}, fitness: {:.3}, original fitness: {:.3}{}{}]",
            self.genome.id(),
            self.generation,
            self.fitness,
            self.original_fitness,
            champ,
            eliminate,
        )
    }
}
