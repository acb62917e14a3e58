#![allow(mixed_script_confusables)]
#![allow(confusable_idents)]

pub mod config;
pub mod constants;
pub mod crossover;
pub mod error;
pub mod generator;
pub mod genome;
pub mod innovation;
pub mod mutation;
pub mod population;
pub mod random;
pub mod scenario;
pub mod serialize;
pub mod species;

pub use config::{Coefficients, MutationConfig, NeatConfig, SpeciationConfig};
pub use error::NeatError;
pub use generator::NetworkGenerator;
pub use genome::{Activation, ConnectionGene, Layer, NetworkChromosome, NeuronGene, Role};
pub use innovation::InnovationRegistry;
pub use mutation::Mutation;
pub use population::{Neat, Phase};
pub use random::{Happens, Probabilities};
pub use scenario::{Agent, Environment, EvolutionHooks, Hook, Stats};
pub use species::Species;
