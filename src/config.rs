//! Run configuration. Every struct here derives serde with `#[serde(default)]`, so a config file
//! only needs to name the values it changes.

use crate::{
    constants::*,
    error::NeatError,
    genome::Activation,
    random::ProbStatic,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Weights of the three terms of the compatibility distance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coefficients {
    pub excess: f64,
    pub disjoint: f64,
    pub weight: f64,
}

impl Default for Coefficients {
    fn default() -> Self {
        Self {
            excess: NEAT_EXCESS_COEFFICIENT,
            disjoint: NEAT_DISJOINT_COEFFICIENT,
            weight: NEAT_WEIGHT_COEFFICIENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciationConfig {
    pub coefficients: Coefficients,
    pub initial_threshold: f64,
    pub threshold_min: f64,
    pub threshold_max: f64,
    pub threshold_step: f64,
    pub target_species: usize,
}

impl SpeciationConfig {
    pub fn clamp_threshold(&self, threshold: f64) -> f64 {
        threshold.clamp(self.threshold_min, self.threshold_max)
    }
}

impl Default for SpeciationConfig {
    fn default() -> Self {
        Self {
            coefficients: Coefficients::default(),
            initial_threshold: NEAT_INITIAL_THRESHOLD,
            threshold_min: NEAT_THRESHOLD_MIN,
            threshold_max: NEAT_THRESHOLD_MAX,
            threshold_step: NEAT_THRESHOLD_STEP,
            target_species: NEAT_TARGET_SPECIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// σ of the noise added to every weight on perturbation
    pub weight_perturbation: f64,
    /// σ of the weight of a connection created by add-connection
    pub new_connection_weight: f64,
    pub max_connection_attempts: usize,
    pub hidden_activation: Activation,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            weight_perturbation: NEAT_WEIGHT_PERTURBATION,
            new_connection_weight: NEAT_NEW_CONNECTION_WEIGHT,
            max_connection_attempts: NEAT_MAX_CONNECTION_ATTEMPTS,
            hidden_activation: Activation::Sigmoid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeatConfig {
    pub population_size: usize,
    pub max_generations: usize,
    pub mutation: MutationConfig,
    pub speciation: SpeciationConfig,
    pub probabilities: ProbStatic,
}

impl Default for NeatConfig {
    fn default() -> Self {
        Self {
            population_size: NEAT_POPULATION_SIZE,
            max_generations: NEAT_MAX_GENERATIONS,
            mutation: MutationConfig::default(),
            speciation: SpeciationConfig::default(),
            probabilities: ProbStatic::default(),
        }
    }
}

fn invalid(msg: impl Into<String>) -> Result<(), NeatError> {
    Err(NeatError::InvalidConfig(msg.into()))
}

impl NeatConfig {
    pub fn validate(&self) -> Result<(), NeatError> {
        if self.population_size == 0 {
            return invalid("population_size must be at least 1");
        }

        let m = &self.mutation;
        for (name, σ) in [
            ("weight_perturbation", m.weight_perturbation),
            ("new_connection_weight", m.new_connection_weight),
        ] {
            if !σ.is_finite() || σ < 0. {
                return invalid(format!("{name} must be a finite, non-negative deviation"));
            }
        }

        let s = &self.speciation;
        if !(s.threshold_min.is_finite() && s.threshold_max.is_finite()) {
            return invalid("threshold bounds must be finite");
        }
        if s.threshold_min > s.threshold_max {
            return invalid(format!(
                "threshold_min {} exceeds threshold_max {}",
                s.threshold_min, s.threshold_max
            ));
        }
        if !s.initial_threshold.is_finite() || !s.threshold_step.is_finite() || s.threshold_step < 0. {
            return invalid("initial_threshold and threshold_step must be finite, step non-negative");
        }

        Ok(())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, NeatError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, NeatError> {
        Self::from_str(&fs::read_to_string(path)?)
    }
}
