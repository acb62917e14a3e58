use crate::innovation::InnovationRegistry;
use serde::{Deserialize, Serialize};

/// A weighted edge between two neurons. `innovation` is assigned once by the registry and is the
/// only thing genes are aligned by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionGene {
    pub innovation: usize,
    pub source: usize,
    pub target: usize,
    pub weight: f64,
    pub enabled: bool,
}

impl ConnectionGene {
    pub fn new(
        source: usize,
        target: usize,
        weight: f64,
        registry: &mut InnovationRegistry,
    ) -> Self {
        Self {
            innovation: registry.get_or_create(source, target),
            source,
            target,
            weight,
            enabled: true,
        }
    }

    #[inline]
    pub fn path(&self) -> (usize, usize) {
        (self.source, self.target)
    }

    #[inline]
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    /// difference of weight between this and a connection with the same innovation id
    #[inline]
    pub fn weight_diff(&self, other: &Self) -> f64 {
        (self.weight - other.weight).abs()
    }

    /// Disable this connection and return the pair routing through `center` in its place
    pub fn bisect(&mut self, center: usize, registry: &mut InnovationRegistry) -> (Self, Self) {
        self.enabled = false;
        (
            // source -{1.}> center
            Self::new(self.source, center, 1., registry),
            // center -{w}> target
            Self::new(center, self.target, self.weight, registry),
        )
    }
}
