use serde::{Deserialize, Serialize};

/// Tunable parameters of the speciation and reproduction engine.
///
/// Fields are plain values so a config can be loaded from JSON with
/// unspecified fields falling back to the defaults below. Call
/// [`EvolveConfig::validate`] after deserialization; the engine itself
/// assumes a validated config.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvolveConfig {
    /// Generations a species may go without a fitness record before the
    /// stagnation penalty kicks in.
    pub dropoff_age: usize,
    /// Fitness multiplier for species aged 10 or younger. 1.0 disables the
    /// young-species boost.
    pub age_significance: f64,
    /// Fraction of a species allowed to reproduce each generation.
    pub survival_thresh: f64,
    /// Target population size. Used only for a non-fatal sanity warning when
    /// a single species' quota exceeds it.
    pub pop_size: usize,
    /// Probability that an offspring comes from mutation without mating.
    pub mutate_only_prob: f64,
    pub mutate_add_node_prob: f64,
    pub mutate_add_link_prob: f64,
    pub mutate_connect_sensors_prob: f64,
    /// Power of connection-weight perturbations.
    pub weight_mut_power: f64,
    /// Probability that the father is drawn from another species.
    pub interspecies_mate_rate: f64,
    pub mate_multipoint_prob: f64,
    pub mate_multipoint_avg_prob: f64,
    pub mate_singlepoint_prob: f64,
    /// Probability that a crossover offspring is NOT also mutated.
    pub mate_only_prob: f64,
    /// Compatibility distance below which an organism joins a species.
    pub compat_threshold: f64,
}

impl Default for EvolveConfig {
    fn default() -> Self {
        Self {
            dropoff_age: 15,
            age_significance: 1.0,
            survival_thresh: 0.2,
            pop_size: 150,
            mutate_only_prob: 0.25,
            mutate_add_node_prob: 0.03,
            mutate_add_link_prob: 0.08,
            mutate_connect_sensors_prob: 0.0,
            weight_mut_power: 2.5,
            interspecies_mate_rate: 0.001,
            mate_multipoint_prob: 0.6,
            mate_multipoint_avg_prob: 0.4,
            mate_singlepoint_prob: 0.0,
            mate_only_prob: 0.2,
            compat_threshold: 3.0,
        }
    }
}

macro_rules! define_evolve_config_error {
    (
        $(
            $variant:ident $( { $($field:ident : $type:ty),* } )? => $fmt:literal $(, $arg:expr)*
        );* $(;)?
    ) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum EvolveConfigError {
            $(
                $variant $( { $($field : $type),* } )?,
            )*
        }

        impl std::fmt::Display for EvolveConfigError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$variant $( { $($field),* } )? => write!(f, $fmt $(, $arg)*),
                    )*
                }
            }
        }
    };
}

define_evolve_config_error! {
    InvalidDropoffAge => "dropoff_age must be greater than 0";
    InvalidAgeSignificance => "age_significance must be finite and positive";
    InvalidSurvivalThresh => "survival_thresh must be finite and within [0,1]";
    InvalidPopSize => "pop_size must be greater than 0";
    InvalidMutateOnlyProb => "mutate_only_prob must be finite and within [0,1]";
    InvalidMutateAddNodeProb => "mutate_add_node_prob must be finite and within [0,1]";
    InvalidMutateAddLinkProb => "mutate_add_link_prob must be finite and within [0,1]";
    InvalidMutateConnectSensorsProb => "mutate_connect_sensors_prob must be finite and within [0,1]";
    InvalidWeightMutPower => "weight_mut_power must be finite and non-negative";
    InvalidInterspeciesMateRate => "interspecies_mate_rate must be finite and within [0,1]";
    InvalidMateMultipointProb => "mate_multipoint_prob must be finite and within [0,1]";
    InvalidMateMultipointAvgProb => "mate_multipoint_avg_prob must be finite and within [0,1]";
    InvalidMateSinglepointProb => "mate_singlepoint_prob must be finite and within [0,1]";
    InvalidMateFallbackBudget => "mate_multipoint_avg_prob + mate_singlepoint_prob must be greater than 0";
    InvalidMateOnlyProb => "mate_only_prob must be finite and within [0,1]";
    InvalidCompatThreshold => "compat_threshold must be finite and non-negative";
}

impl std::error::Error for EvolveConfigError {}

fn is_probability(v: f64) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}

impl EvolveConfig {
    /// Check static parameter ranges.
    ///
    /// A zero `compat_threshold` passes here: it only becomes an error when
    /// reproduction actually has to place offspring among existing species.
    pub fn validate(&self) -> Result<(), EvolveConfigError> {
        if self.dropoff_age == 0 {
            return Err(EvolveConfigError::InvalidDropoffAge);
        }
        if !self.age_significance.is_finite() || self.age_significance <= 0.0 {
            return Err(EvolveConfigError::InvalidAgeSignificance);
        }
        if !is_probability(self.survival_thresh) {
            return Err(EvolveConfigError::InvalidSurvivalThresh);
        }
        if self.pop_size == 0 {
            return Err(EvolveConfigError::InvalidPopSize);
        }
        if !is_probability(self.mutate_only_prob) {
            return Err(EvolveConfigError::InvalidMutateOnlyProb);
        }
        if !is_probability(self.mutate_add_node_prob) {
            return Err(EvolveConfigError::InvalidMutateAddNodeProb);
        }
        if !is_probability(self.mutate_add_link_prob) {
            return Err(EvolveConfigError::InvalidMutateAddLinkProb);
        }
        if !is_probability(self.mutate_connect_sensors_prob) {
            return Err(EvolveConfigError::InvalidMutateConnectSensorsProb);
        }
        if !self.weight_mut_power.is_finite() || self.weight_mut_power < 0.0 {
            return Err(EvolveConfigError::InvalidWeightMutPower);
        }
        if !is_probability(self.interspecies_mate_rate) {
            return Err(EvolveConfigError::InvalidInterspeciesMateRate);
        }
        if !is_probability(self.mate_multipoint_prob) {
            return Err(EvolveConfigError::InvalidMateMultipointProb);
        }
        if !is_probability(self.mate_multipoint_avg_prob) {
            return Err(EvolveConfigError::InvalidMateMultipointAvgProb);
        }
        if !is_probability(self.mate_singlepoint_prob) {
            return Err(EvolveConfigError::InvalidMateSinglepointProb);
        }
        // The second crossover draw normalizes over these two; both zero
        // would divide by zero.
        if self.mate_multipoint_avg_prob + self.mate_singlepoint_prob <= 0.0 {
            return Err(EvolveConfigError::InvalidMateFallbackBudget);
        }
        if !is_probability(self.mate_only_prob) {
            return Err(EvolveConfigError::InvalidMateOnlyProb);
        }
        if !self.compat_threshold.is_finite() || self.compat_threshold < 0.0 {
            return Err(EvolveConfigError::InvalidCompatThreshold);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(EvolveConfig::default().validate(), Ok(()));
    }

    #[test]
    fn empty_json_yields_defaults() {
        let cfg: EvolveConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, EvolveConfig::default());
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let cfg: EvolveConfig =
            serde_json::from_str(r#"{"dropoff_age": 30, "compat_threshold": 4.5}"#).unwrap();
        assert_eq!(cfg.dropoff_age, 30);
        assert_eq!(cfg.compat_threshold, 4.5);
        assert_eq!(cfg.survival_thresh, EvolveConfig::default().survival_thresh);
    }

    #[test]
    fn validate_rejects_zero_dropoff_age() {
        let cfg = EvolveConfig {
            dropoff_age: 0,
            ..EvolveConfig::default()
        };
        assert_eq!(cfg.validate(), Err(EvolveConfigError::InvalidDropoffAge));
    }

    #[test]
    fn validate_rejects_out_of_range_probability() {
        let cfg = EvolveConfig {
            mutate_only_prob: 1.5,
            ..EvolveConfig::default()
        };
        assert_eq!(cfg.validate(), Err(EvolveConfigError::InvalidMutateOnlyProb));
    }

    #[test]
    fn validate_rejects_non_finite_threshold() {
        let cfg = EvolveConfig {
            compat_threshold: f64::NAN,
            ..EvolveConfig::default()
        };
        assert_eq!(cfg.validate(), Err(EvolveConfigError::InvalidCompatThreshold));
    }

    #[test]
    fn validate_rejects_empty_crossover_fallback_budget() {
        let cfg = EvolveConfig {
            mate_multipoint_avg_prob: 0.0,
            mate_singlepoint_prob: 0.0,
            ..EvolveConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(EvolveConfigError::InvalidMateFallbackBudget)
        );
    }

    #[test]
    fn zero_compat_threshold_passes_static_validation() {
        let cfg = EvolveConfig {
            compat_threshold: 0.0,
            ..EvolveConfig::default()
        };
        assert_eq!(cfg.validate(), Ok(()));
    }
}
