use core::hash::{Hash, Hasher};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Input,
    Output,
    Hidden,
    Bias,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Activation {
    Identity,
    #[default]
    Sigmoid,
    Tanh,
}

impl Activation {
    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Identity => x,
            Self::Sigmoid => 1. / (1. + (-x).exp()),
            Self::Tanh => x.tanh(),
        }
    }
}

/// A single neuron. Two neurons are the same gene when they share an id, whatever their role or
/// activation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NeuronGene {
    pub id: usize,
    pub role: Role,
    pub activation: Activation,
}

impl NeuronGene {
    pub fn new(id: usize, role: Role, activation: Activation) -> Self {
        Self {
            id,
            role,
            activation,
        }
    }

    pub fn input(id: usize) -> Self {
        Self::new(id, Role::Input, Activation::Identity)
    }

    pub fn bias(id: usize) -> Self {
        Self::new(id, Role::Bias, Activation::Identity)
    }

    pub fn output(id: usize) -> Self {
        Self::new(id, Role::Output, Activation::Sigmoid)
    }

    pub fn hidden(id: usize, activation: Activation) -> Self {
        Self::new(id, Role::Hidden, activation)
    }

    /// Whether this neuron takes its value from outside the network rather than from connections
    #[inline]
    pub fn is_sensory(&self) -> bool {
        matches!(self.role, Role::Input | Role::Bias)
    }
}

impl PartialEq for NeuronGene {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for NeuronGene {}

impl Hash for NeuronGene {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
