use crate::{
    genome::{ConnectionGene, Layer, NetworkChromosome, NeuronGene},
    innovation::InnovationRegistry,
};
use rand::{Rng, RngCore};

/// Builds the minimal seed genome: bias and inputs wired straight to every output.
///
/// Neuron ids are fixed by the task shape, inputs `0..n`, the bias `n`, outputs from `n + 1`, so
/// every seed genome of a run agrees on them and on the innovation ids of the seed connections.
#[derive(Debug, Clone, Copy)]
pub struct NetworkGenerator {
    input_size: usize,
    output_size: usize,
}

impl NetworkGenerator {
    pub fn new(input_size: usize, output_size: usize) -> Self {
        Self {
            input_size,
            output_size,
        }
    }

    #[inline]
    pub fn bias_id(&self) -> usize {
        self.input_size
    }

    pub fn generate(
        &self,
        registry: &mut InnovationRegistry,
        rng: &mut impl RngCore,
    ) -> NetworkChromosome {
        registry.reserve_neurons(self.input_size + 1 + self.output_size);

        let bias = self.bias_id();
        let mut genome = NetworkChromosome::default();
        genome.push_neuron(Layer::INPUT, NeuronGene::bias(bias));
        for id in 0..self.input_size {
            genome.push_neuron(Layer::INPUT, NeuronGene::input(id));
        }

        for target in bias + 1..=bias + self.output_size {
            genome.push_neuron(Layer::OUTPUT, NeuronGene::output(target));
            for source in core::iter::once(bias).chain(0..self.input_size) {
                genome.push_connection(ConnectionGene::new(
                    source,
                    target,
                    rng.random_range(-1. ..=1.),
                    registry,
                ));
            }
        }

        genome
    }
}
