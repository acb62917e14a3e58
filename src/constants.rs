//! Centralized defaults for ffneat evolution parameters.
//!
//! Every default carries the `NEAT_` prefix. [crate::config] builds its `Default` impls from
//! these, so a run configured with `NeatConfig::default()` uses exactly the values below.

use crate::random::percent;

// ============================================================================
// Population Parameters
// ============================================================================

/// Number of genomes alive in every generation
pub const NEAT_POPULATION_SIZE: usize = 150;

/// Generation budget before the controller gives up
pub const NEAT_MAX_GENERATIONS: usize = 100;

// ============================================================================
// Speciation Parameters
// ============================================================================

/// Compatibility threshold at the start of a run
pub const NEAT_INITIAL_THRESHOLD: f64 = 3.0;

/// Lower clamp of the compatibility threshold
pub const NEAT_THRESHOLD_MIN: f64 = 0.5;

/// Upper clamp of the compatibility threshold
pub const NEAT_THRESHOLD_MAX: f64 = 5.0;

/// Amount the threshold moves per generation when the species count is off target
pub const NEAT_THRESHOLD_STEP: f64 = 0.3;

/// Species count the threshold controller steers towards
pub const NEAT_TARGET_SPECIES: usize = 5;

/// Coefficient for excess genes in compatibility distance calculation
pub const NEAT_EXCESS_COEFFICIENT: f64 = 1.0;

/// Coefficient for disjoint genes in compatibility distance calculation
pub const NEAT_DISJOINT_COEFFICIENT: f64 = 1.0;

/// Coefficient for mean weight difference in compatibility distance calculation
pub const NEAT_WEIGHT_COEFFICIENT: f64 = 0.4;

// ============================================================================
// Mutation Parameters
// ============================================================================

/// Standard deviation of the gaussian noise added on weight perturbation
pub const NEAT_WEIGHT_PERTURBATION: f64 = 0.1;

/// Standard deviation of the weight given to a freshly added connection
pub const NEAT_NEW_CONNECTION_WEIGHT: f64 = 0.5;

/// Sampling attempts before add-connection gives up
pub const NEAT_MAX_CONNECTION_ATTEMPTS: usize = 100;

/// Relative odds of perturbing every weight
pub const NEAT_PERTURB_WEIGHTS_ODDS: u64 = percent(70);

/// Relative odds of toggling a single connection
pub const NEAT_TOGGLE_CONNECTION_ODDS: u64 = percent(5);

/// Relative odds of adding a connection
pub const NEAT_ADD_CONNECTION_ODDS: u64 = percent(15);

/// Relative odds of splitting a connection with a new neuron
pub const NEAT_ADD_NEURON_ODDS: u64 = percent(10);

// ============================================================================
// Crossover Parameters
// ============================================================================

/// Probability a matching gene whose parents disagree on being enabled is inherited disabled
pub const NEAT_CROSSOVER_KEEP_DISABLED_PROB: u64 = percent(75);

/// Probability of taking a matching gene from the first parent
pub const NEAT_CROSSOVER_PICK_LEFT_PROB: u64 = percent(50);
