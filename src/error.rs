use thiserror::Error;

/// Everything that can go wrong while building, evaluating or evolving genomes.
#[derive(Debug, Error)]
pub enum NeatError {
    #[error("expected {expected} inputs, got {actual}")]
    InvalidInputSize { expected: usize, actual: usize },

    #[error("genome has no connections to operate on")]
    EmptyGenomeCollection,

    #[error("no viable connection found after {attempts} attempts")]
    StructuralExhaustion { attempts: usize },

    #[error("connection references neuron {neuron} which is absent from every layer")]
    InconsistentGenome { neuron: usize },

    #[error("cannot reproduce a species with no members")]
    EmptySpecies,

    #[error("population has no genomes")]
    EmptyPopulation,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl NeatError {
    /// Expected outcomes of a mutation on a small or saturated genome. These degrade to a no-op
    /// copy instead of aborting a run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::EmptyGenomeCollection | Self::StructuralExhaustion { .. }
        )
    }
}
