use super::{Population, ReproduceError};
use crate::config::EvolveConfig;
use crate::genome::{Genome, WeightMutationMode};
use crate::organism::Organism;
use rand::Rng;
use tracing::{debug, warn};

/// Structural-then-nonstructural mutation cascade shared by asexual
/// reproduction and post-crossover mutation.
///
/// The probability checks are sequential and not normalized: each draw is an
/// independent chance, and only when no structural mutation fires does the
/// nonstructural pass run.
fn mutate_baby_genome<G: Genome, R: Rng + ?Sized>(
    genome: &mut G,
    generation: usize,
    cfg: &EvolveConfig,
    rng: &mut R,
) -> Result<bool, ReproduceError> {
    let mut mut_struct_baby = false;
    if rng.random::<f64>() < cfg.mutate_add_node_prob {
        debug!("mutation cascade: add node");
        genome
            .mutate_add_node(rng, cfg)
            .map_err(ReproduceError::Genome)?;
        mut_struct_baby = true;
    } else if rng.random::<f64>() < cfg.mutate_add_link_prob {
        debug!("mutation cascade: add link");
        genome.genesis(generation);
        genome
            .mutate_add_link(rng, cfg)
            .map_err(ReproduceError::Genome)?;
        mut_struct_baby = true;
    } else if rng.random::<f64>() < cfg.mutate_connect_sensors_prob {
        debug!("mutation cascade: connect sensors");
        let link_added = genome
            .mutate_connect_sensors(rng, cfg)
            .map_err(ReproduceError::Genome)?;
        mut_struct_baby = link_added;
    }

    if !mut_struct_baby {
        debug!("mutation cascade: nonstructural pass");
        genome
            .mutate_all_nonstructural(rng, cfg)
            .map_err(ReproduceError::Genome)?;
    }
    Ok(mut_struct_baby)
}

impl<G: Genome> Population<G> {
    /// Produce the next-generation offspring of one species.
    ///
    /// Emits exactly `expected_offspring` organisms, each by the first
    /// matching strategy of: super-champion cloning, one-off species-champion
    /// cloning, mutation-only reproduction, crossover. Every offspring is
    /// immediately placed into the best compatible species (possibly one
    /// created earlier in this same pass) or a freshly created one.
    ///
    /// `sorted_order` is the fitness-ranked index list from
    /// [`Population::sorted_species_indices`], best first; interspecies
    /// mating draws fathers from it with a rank bias. The species list is
    /// only ever appended to here, so indices stay valid across the pass.
    ///
    /// Any error is fatal for this generation's reproduction step: no
    /// partial retry of a single offspring, no continuation to the next
    /// species.
    pub fn reproduce_species<R: Rng + ?Sized>(
        &mut self,
        species_index: usize,
        generation: usize,
        sorted_order: &[usize],
        cfg: &EvolveConfig,
        rng: &mut R,
    ) -> Result<(), ReproduceError> {
        let expected = self.species[species_index].expected_offspring;
        let species_id = self.species[species_index].id;
        let pool_size = self.species[species_index].size();

        if expected > 0 && pool_size == 0 {
            return Err(ReproduceError::EmptySpecies {
                species_id,
                expected_offspring: expected,
            });
        }
        // Surface the misconfiguration before any offspring exists, so the
        // pass has no side effects at all.
        if expected > 0 && cfg.compat_threshold == 0.0 && !self.species.is_empty() {
            return Err(ReproduceError::ZeroCompatThreshold);
        }
        if expected > cfg.pop_size {
            warn!(
                species_id,
                expected_offspring = expected,
                pop_size = cfg.pop_size,
                "species expected offspring exceeds population size limit"
            );
        }

        // At most one verbatim clone of the species champion per generation.
        let mut champ_clone_done = false;

        for count in 0..expected {
            debug!(species_id, offspring = count, expected, "producing offspring");

            let mut mut_struct_baby = false;
            let mut mate_baby = false;
            let mut population_champion_child: Option<f64> = None;

            let champ_super = self.species[species_index].organisms[0].super_champ_offspring;
            let baby_genome: G = if champ_super > 0 {
                debug!(species_id, "reproduce super champion");

                let (mut new_genome, champ_is_population_champion, champ_original_fitness) = {
                    let champ = &self.species[species_index].organisms[0];
                    (
                        champ.genome.duplicate(count),
                        champ.is_population_champion,
                        champ.original_fitness,
                    )
                };

                // Most super-champ offspring only get their weights mutated;
                // the last one stays an exact duplicate.
                if champ_super > 1 {
                    if rng.random::<f64>() < 0.8 || cfg.mutate_add_link_prob == 0.0 {
                        // No links may be added when link adding is disabled.
                        new_genome.mutate_link_weights(
                            rng,
                            cfg.weight_mut_power,
                            1.0,
                            WeightMutationMode::Gaussian,
                        );
                    } else {
                        new_genome.genesis(generation);
                        new_genome
                            .mutate_add_link(rng, cfg)
                            .map_err(ReproduceError::Genome)?;
                        mut_struct_baby = true;
                    }
                }

                if champ_super == 1 && champ_is_population_champion {
                    population_champion_child = Some(champ_original_fitness);
                }

                self.species[species_index].organisms[0].super_champ_offspring -= 1;
                new_genome
            } else if !champ_clone_done && expected > 5 {
                debug!(species_id, "clone species champion");

                champ_clone_done = true;
                self.species[species_index].organisms[0]
                    .genome
                    .duplicate(count)
            } else if rng.random::<f64>() < cfg.mutate_only_prob || pool_size == 1 {
                debug!(species_id, "reproduce by mutation");

                let mom_index = rng.random_range(0..pool_size);
                let mut new_genome = self.species[species_index].organisms[mom_index]
                    .genome
                    .duplicate(count);
                mut_struct_baby = mutate_baby_genome(&mut new_genome, generation, cfg, rng)?;
                new_genome
            } else {
                debug!(species_id, "reproduce by mating");

                let mom_index = rng.random_range(0..pool_size);

                // Father: same species, or rank-biased draw from another one.
                let (dad_species_index, dad_index) =
                    if rng.random::<f64>() > cfg.interspecies_mate_rate {
                        (species_index, rng.random_range(0..pool_size))
                    } else {
                        let mut chosen = species_index;
                        let mut give_up = 0;
                        while chosen == species_index && give_up < 5 {
                            // Uniform draw scaled down to favor the head of
                            // the ranked list.
                            let rand_mult = rng.random::<f64>() / 4.0;
                            let rank = (rand_mult * sorted_order.len() as f64).floor() as usize;
                            chosen = sorted_order[rank];
                            give_up += 1;
                        }
                        (chosen, 0)
                    };

                let mom = &self.species[species_index].organisms[mom_index];
                let dad = &self.species[dad_species_index].organisms[dad_index];

                let mut new_genome = if rng.random::<f64>() < cfg.mate_multipoint_prob {
                    debug!(species_id, "crossover: multipoint");
                    mom.genome.mate_multipoint(
                        &dad.genome,
                        count,
                        mom.original_fitness,
                        dad.original_fitness,
                        rng,
                    )
                } else if rng.random::<f64>()
                    < cfg.mate_multipoint_avg_prob
                        / (cfg.mate_multipoint_avg_prob + cfg.mate_singlepoint_prob)
                {
                    debug!(species_id, "crossover: multipoint average");
                    mom.genome.mate_multipoint_avg(
                        &dad.genome,
                        count,
                        mom.original_fitness,
                        dad.original_fitness,
                        rng,
                    )
                } else {
                    debug!(species_id, "crossover: singlepoint");
                    mom.genome.mate_singlepoint(&dad.genome, count, rng)
                }
                .map_err(ReproduceError::Genome)?;

                mate_baby = true;

                // Mutate the crossover baby as well: randomly, when both
                // parents are the same genome, or when they are genetically
                // indistinguishable. The distance check is an exact zero
                // comparison on purpose.
                if rng.random::<f64>() > cfg.mate_only_prob
                    || dad.genome.id() == mom.genome.id()
                    || dad.genome.compatibility(&mom.genome, cfg) == 0.0
                {
                    mut_struct_baby = mutate_baby_genome(&mut new_genome, generation, cfg, rng)?;
                }
                new_genome
            };

            let mut baby = Organism::new(0.0, baby_genome, generation);
            baby.mutation_struct_baby = mut_struct_baby;
            baby.mate_baby = mate_baby;
            if let Some(highest_fitness) = population_champion_child {
                baby.is_population_champion_child = true;
                baby.highest_fitness = highest_fitness;
            }

            self.speciate_offspring(baby, cfg)?;
        }

        Ok(())
    }
}
