use crate::config::EvolveConfig;
use rand::Rng;
use std::io;

/// Errors surfaced by genome collaborator operations. The engine never
/// inspects these; they abort the current reproduction pass unchanged.
pub type GenomeError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// How connection weights are perturbed by `mutate_link_weights`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeightMutationMode {
    /// Perturb existing weights with gaussian noise.
    Gaussian,
    /// Replace weights outright ("cold" restart of the weight).
    ColdGaussian,
}

/// The genetic encoding of a candidate network topology, opaque to the
/// speciation engine beyond these operations.
///
/// The engine owns *when* each operation runs (strategy selection, priority
/// cascades, fail-fast propagation); the collaborator owns *how* the genetic
/// encoding changes. All stochastic operations receive the caller's RNG so a
/// seeded run is replayable end to end.
pub trait Genome: Sized {
    /// Stable identifier of this genome. Used for the same-parent check
    /// during mating and for diagnostic reports.
    fn id(&self) -> u64;

    /// Copy this genome, stamping the copy with the per-species offspring
    /// index of the child it will become.
    fn duplicate(&self, offspring_index: usize) -> Self;

    /// Weight-only perturbation of connection genes.
    fn mutate_link_weights<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        power: f64,
        rate: f64,
        mode: WeightMutationMode,
    );

    /// Materialize the phenotype structure. Must run before an add-link
    /// mutation so the new link can be wired into the network.
    fn genesis(&mut self, generation: usize);

    /// Structural mutation: split a connection with a new node.
    /// Returns whether the genome changed.
    fn mutate_add_node<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        cfg: &EvolveConfig,
    ) -> Result<bool, GenomeError>;

    /// Structural mutation: add a new connection gene.
    fn mutate_add_link<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        cfg: &EvolveConfig,
    ) -> Result<bool, GenomeError>;

    /// Structural mutation: connect dangling sensors to the network.
    /// Returns whether a link was actually added.
    fn mutate_connect_sensors<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        cfg: &EvolveConfig,
    ) -> Result<bool, GenomeError>;

    /// Non-structural mutation pass: weight and enable-state perturbations.
    fn mutate_all_nonstructural<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        cfg: &EvolveConfig,
    ) -> Result<(), GenomeError>;

    /// Multipoint crossover. Parent fitnesses bias which disjoint/excess
    /// genes the child inherits.
    fn mate_multipoint<R: Rng + ?Sized>(
        &self,
        other: &Self,
        offspring_index: usize,
        fitness1: f64,
        fitness2: f64,
        rng: &mut R,
    ) -> Result<Self, GenomeError>;

    /// Multipoint crossover averaging matching gene weights.
    fn mate_multipoint_avg<R: Rng + ?Sized>(
        &self,
        other: &Self,
        offspring_index: usize,
        fitness1: f64,
        fitness2: f64,
        rng: &mut R,
    ) -> Result<Self, GenomeError>;

    /// Single crossover point recombination.
    fn mate_singlepoint<R: Rng + ?Sized>(
        &self,
        other: &Self,
        offspring_index: usize,
        rng: &mut R,
    ) -> Result<Self, GenomeError>;

    /// Genetic compatibility distance to another genome. Non-negative;
    /// zero means genetically indistinguishable.
    fn compatibility(&self, other: &Self, cfg: &EvolveConfig) -> f64;

    /// Dump the genome in its plain text form, used by diagnostic reports.
    fn write_plain(&self, w: &mut dyn io::Write) -> io::Result<()>;
}

/// Minimal scripted genome used across the engine's own tests. Records which
/// operations ran so tests can assert on provenance; compatibility is the
/// absolute difference of the `tag` values.
#[cfg(test)]
pub(crate) mod stub {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum CrossoverOp {
        Multipoint,
        MultipointAvg,
        Singlepoint,
    }

    #[derive(Clone, Debug)]
    pub struct StubGenome {
        pub id: u64,
        pub tag: f64,
        pub weight_mutations: usize,
        pub nonstructural_mutations: usize,
        pub added_nodes: usize,
        pub added_links: usize,
        pub sensor_links: usize,
        pub genesis_generation: Option<usize>,
        pub crossover_op: Option<CrossoverOp>,
        /// Shift applied to `tag` by every nonstructural mutation. Lets tests
        /// push offspring out of (or keep them inside) compatibility range.
        pub nonstructural_drift: f64,
        pub fail_structural: bool,
    }

    impl StubGenome {
        pub fn new(id: u64, tag: f64) -> Self {
            Self {
                id,
                tag,
                weight_mutations: 0,
                nonstructural_mutations: 0,
                added_nodes: 0,
                added_links: 0,
                sensor_links: 0,
                genesis_generation: None,
                crossover_op: None,
                nonstructural_drift: 0.0,
                fail_structural: false,
            }
        }

        fn child(&self, offspring_index: usize) -> Self {
            Self {
                id: offspring_index as u64,
                weight_mutations: 0,
                nonstructural_mutations: 0,
                added_nodes: 0,
                added_links: 0,
                sensor_links: 0,
                genesis_generation: None,
                crossover_op: None,
                ..self.clone()
            }
        }
    }

    impl Genome for StubGenome {
        fn id(&self) -> u64 {
            self.id
        }

        fn duplicate(&self, offspring_index: usize) -> Self {
            self.child(offspring_index)
        }

        fn mutate_link_weights<R: Rng + ?Sized>(
            &mut self,
            _rng: &mut R,
            _power: f64,
            _rate: f64,
            _mode: WeightMutationMode,
        ) {
            self.weight_mutations += 1;
        }

        fn genesis(&mut self, generation: usize) {
            self.genesis_generation = Some(generation);
        }

        fn mutate_add_node<R: Rng + ?Sized>(
            &mut self,
            _rng: &mut R,
            _cfg: &EvolveConfig,
        ) -> Result<bool, GenomeError> {
            if self.fail_structural {
                return Err("stub add-node failure".into());
            }
            self.added_nodes += 1;
            Ok(true)
        }

        fn mutate_add_link<R: Rng + ?Sized>(
            &mut self,
            _rng: &mut R,
            _cfg: &EvolveConfig,
        ) -> Result<bool, GenomeError> {
            if self.fail_structural {
                return Err("stub add-link failure".into());
            }
            self.added_links += 1;
            Ok(true)
        }

        fn mutate_connect_sensors<R: Rng + ?Sized>(
            &mut self,
            _rng: &mut R,
            _cfg: &EvolveConfig,
        ) -> Result<bool, GenomeError> {
            self.sensor_links += 1;
            Ok(true)
        }

        fn mutate_all_nonstructural<R: Rng + ?Sized>(
            &mut self,
            _rng: &mut R,
            _cfg: &EvolveConfig,
        ) -> Result<(), GenomeError> {
            self.nonstructural_mutations += 1;
            self.tag += self.nonstructural_drift;
            Ok(())
        }

        fn mate_multipoint<R: Rng + ?Sized>(
            &self,
            other: &Self,
            offspring_index: usize,
            _fitness1: f64,
            _fitness2: f64,
            _rng: &mut R,
        ) -> Result<Self, GenomeError> {
            let mut child = self.child(offspring_index);
            child.tag = (self.tag + other.tag) / 2.0;
            child.crossover_op = Some(CrossoverOp::Multipoint);
            Ok(child)
        }

        fn mate_multipoint_avg<R: Rng + ?Sized>(
            &self,
            other: &Self,
            offspring_index: usize,
            _fitness1: f64,
            _fitness2: f64,
            _rng: &mut R,
        ) -> Result<Self, GenomeError> {
            let mut child = self.child(offspring_index);
            child.tag = (self.tag + other.tag) / 2.0;
            child.crossover_op = Some(CrossoverOp::MultipointAvg);
            Ok(child)
        }

        fn mate_singlepoint<R: Rng + ?Sized>(
            &self,
            other: &Self,
            offspring_index: usize,
            _rng: &mut R,
        ) -> Result<Self, GenomeError> {
            let mut child = self.child(offspring_index);
            child.tag = (self.tag + other.tag) / 2.0;
            child.crossover_op = Some(CrossoverOp::Singlepoint);
            Ok(child)
        }

        fn compatibility(&self, other: &Self, _cfg: &EvolveConfig) -> f64 {
            (self.tag - other.tag).abs()
        }

        fn write_plain(&self, w: &mut dyn io::Write) -> io::Result<()> {
            writeln!(w, "genomestart {}", self.id)?;
            writeln!(w, "tag {:.3}", self.tag)?;
            writeln!(w, "genomeend {}", self.id)
        }
    }
}
