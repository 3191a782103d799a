//! A deliberately small weight-vector genome used to drive the engine end to
//! end. It is a demo collaborator, not a NEAT genome: structural mutations
//! just grow the weight vector, and compatibility is the mean absolute
//! weight difference.

use neat_core::{EvolveConfig, Genome, GenomeError, WeightMutationMode};
use rand::Rng;
use std::io;

#[derive(Clone, Debug)]
pub struct ToyGenome {
    id: u64,
    weights: Vec<f64>,
}

impl ToyGenome {
    pub fn random<R: Rng + ?Sized>(id: u64, size: usize, rng: &mut R) -> Self {
        let weights = (0..size).map(|_| rng.random::<f64>() * 2.0 - 1.0).collect();
        Self { id, weights }
    }

    pub fn weight_sum(&self) -> f64 {
        self.weights.iter().sum()
    }
}

impl Genome for ToyGenome {
    fn id(&self) -> u64 {
        self.id
    }

    fn duplicate(&self, offspring_index: usize) -> Self {
        Self {
            id: offspring_index as u64,
            weights: self.weights.clone(),
        }
    }

    fn mutate_link_weights<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        power: f64,
        rate: f64,
        mode: WeightMutationMode,
    ) {
        for w in &mut self.weights {
            if rng.random::<f64>() >= rate {
                continue;
            }
            let noise = (rng.random::<f64>() * 2.0 - 1.0) * power;
            match mode {
                WeightMutationMode::Gaussian => *w += noise,
                WeightMutationMode::ColdGaussian => *w = noise,
            }
        }
    }

    fn genesis(&mut self, _generation: usize) {
        // Nothing to materialize for a flat weight vector.
    }

    fn mutate_add_node<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        _cfg: &EvolveConfig,
    ) -> Result<bool, GenomeError> {
        self.weights.push(rng.random::<f64>() * 2.0 - 1.0);
        Ok(true)
    }

    fn mutate_add_link<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        _cfg: &EvolveConfig,
    ) -> Result<bool, GenomeError> {
        self.weights.push(rng.random::<f64>() * 0.5);
        Ok(true)
    }

    fn mutate_connect_sensors<R: Rng + ?Sized>(
        &mut self,
        _rng: &mut R,
        _cfg: &EvolveConfig,
    ) -> Result<bool, GenomeError> {
        // A flat vector has no dangling sensors to connect.
        Ok(false)
    }

    fn mutate_all_nonstructural<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        cfg: &EvolveConfig,
    ) -> Result<(), GenomeError> {
        for w in &mut self.weights {
            if rng.random::<f64>() < 0.2 {
                *w += (rng.random::<f64>() * 2.0 - 1.0) * cfg.weight_mut_power * 0.1;
            }
        }
        Ok(())
    }

    fn mate_multipoint<R: Rng + ?Sized>(
        &self,
        other: &Self,
        offspring_index: usize,
        fitness1: f64,
        fitness2: f64,
        rng: &mut R,
    ) -> Result<Self, GenomeError> {
        // The fitter parent donates the genes the shorter parent lacks.
        let (longer, shorter) = if self.weights.len() >= other.weights.len() {
            (&self.weights, &other.weights)
        } else {
            (&other.weights, &self.weights)
        };
        let keep_excess = (fitness1 >= fitness2) == (self.weights.len() >= other.weights.len());
        let mut weights: Vec<f64> = longer
            .iter()
            .zip(shorter.iter())
            .map(|(&a, &b)| if rng.random::<bool>() { a } else { b })
            .collect();
        if keep_excess {
            weights.extend_from_slice(&longer[shorter.len()..]);
        }
        Ok(Self {
            id: offspring_index as u64,
            weights,
        })
    }

    fn mate_multipoint_avg<R: Rng + ?Sized>(
        &self,
        other: &Self,
        offspring_index: usize,
        _fitness1: f64,
        _fitness2: f64,
        _rng: &mut R,
    ) -> Result<Self, GenomeError> {
        let weights = self
            .weights
            .iter()
            .zip(other.weights.iter())
            .map(|(&a, &b)| (a + b) / 2.0)
            .collect();
        Ok(Self {
            id: offspring_index as u64,
            weights,
        })
    }

    fn mate_singlepoint<R: Rng + ?Sized>(
        &self,
        other: &Self,
        offspring_index: usize,
        rng: &mut R,
    ) -> Result<Self, GenomeError> {
        let shorter = self.weights.len().min(other.weights.len());
        let point = if shorter == 0 {
            0
        } else {
            rng.random_range(0..shorter)
        };
        let mut weights: Vec<f64> = self.weights[..point].to_vec();
        weights.extend_from_slice(&other.weights[point..]);
        Ok(Self {
            id: offspring_index as u64,
            weights,
        })
    }

    fn compatibility(&self, other: &Self, _cfg: &EvolveConfig) -> f64 {
        let common = self.weights.len().min(other.weights.len());
        if common == 0 {
            return self.weights.len().abs_diff(other.weights.len()) as f64;
        }
        let diff: f64 = self.weights[..common]
            .iter()
            .zip(&other.weights[..common])
            .map(|(a, b)| (a - b).abs())
            .sum();
        diff / common as f64 + self.weights.len().abs_diff(other.weights.len()) as f64
    }

    fn write_plain(&self, w: &mut dyn io::Write) -> io::Result<()> {
        writeln!(w, "genomestart {}", self.id)?;
        for weight in &self.weights {
            writeln!(w, "weight {weight:.6}")?;
        }
        writeln!(w, "genomeend {}", self.id)
    }
}
