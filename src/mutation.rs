use crate::{
    config::MutationConfig,
    error::NeatError,
    genome::{Activation, ConnectionGene, Layer, NetworkChromosome, NeuronGene, Role},
    innovation::InnovationRegistry,
    random::{Happens, MutationKind},
};
use rand::{seq::IndexedRandom, Rng, RngCore};
use rand_distr::{Distribution, Normal};
use tracing::debug;

/// The four mutation operators. Every call works on a copy, the parent genome is never touched.
#[derive(Debug, Clone)]
pub struct Mutation {
    perturbation: Normal<f64>,
    new_weight: Normal<f64>,
    max_connection_attempts: usize,
    hidden_activation: Activation,
}

impl Mutation {
    pub fn new(config: &MutationConfig) -> Result<Self, NeatError> {
        let normal = |name: &str, σ: f64| {
            if σ < 0. {
                return Err(NeatError::InvalidConfig(format!(
                    "{name}: standard deviation {σ} is negative"
                )));
            }
            Normal::new(0., σ).map_err(|e| NeatError::InvalidConfig(format!("{name}: {e}")))
        };

        Ok(Self {
            perturbation: normal("weight_perturbation", config.weight_perturbation)?,
            new_weight: normal("new_connection_weight", config.new_connection_weight)?,
            max_connection_attempts: config.max_connection_attempts,
            hidden_activation: config.hidden_activation,
        })
    }

    /// Apply exactly one mutation, picked by the relative odds `rng` carries
    pub fn mutate(
        &self,
        genome: &NetworkChromosome,
        rng: &mut (impl RngCore + Happens),
        registry: &mut InnovationRegistry,
    ) -> Result<NetworkChromosome, NeatError> {
        let kind = rng.mutation_kind();
        self.mutate_with(kind, genome, rng, registry)
    }

    /// Apply the mutation `kind`. A genome too small or too saturated for it comes back as an
    /// unmodified copy.
    pub fn mutate_with(
        &self,
        kind: MutationKind,
        genome: &NetworkChromosome,
        rng: &mut impl RngCore,
        registry: &mut InnovationRegistry,
    ) -> Result<NetworkChromosome, NeatError> {
        let mut offspring = genome.offspring();
        let outcome = match kind {
            MutationKind::PerturbWeights => {
                self.perturb_weights(&mut offspring, rng);
                Ok(())
            }
            MutationKind::ToggleConnection => self.toggle_connection(&mut offspring, rng),
            MutationKind::AddConnection => self.add_connection(&mut offspring, rng, registry),
            MutationKind::AddNeuron => self.add_neuron(&mut offspring, rng, registry),
        };

        match outcome {
            Ok(()) => Ok(offspring),
            Err(e) if e.is_recoverable() => {
                debug!(?kind, error = %e, "mutation left genome unchanged");
                Ok(genome.offspring())
            }
            Err(e) => Err(e),
        }
    }

    pub fn perturb_weights(&self, genome: &mut NetworkChromosome, rng: &mut impl RngCore) {
        for conn in genome.connections_mut() {
            conn.weight += self.perturbation.sample(rng);
        }
    }

    pub fn toggle_connection(
        &self,
        genome: &mut NetworkChromosome,
        rng: &mut impl RngCore,
    ) -> Result<(), NeatError> {
        let conns = genome.connections_mut();
        if conns.is_empty() {
            return Err(NeatError::EmptyGenomeCollection);
        }

        let idx = rng.random_range(0..conns.len());
        conns[idx].toggle();
        Ok(())
    }

    /// Connect two unconnected neurons, source strictly before target
    pub fn add_connection(
        &self,
        genome: &mut NetworkChromosome,
        rng: &mut impl RngCore,
        registry: &mut InnovationRegistry,
    ) -> Result<(), NeatError> {
        let neurons = genome
            .neurons()
            .map(|(layer, n)| (layer, *n))
            .collect::<Vec<(Layer, NeuronGene)>>();

        for _ in 0..self.max_connection_attempts {
            let (Some((source_layer, source)), Some((target_layer, target))) =
                (neurons.choose(rng), neurons.choose(rng))
            else {
                break;
            };

            if matches!(source.role, Role::Output)
                || target.is_sensory()
                || source.id == target.id
                || source_layer >= target_layer
                || genome.is_connected(source.id, target.id)
            {
                continue;
            }

            let weight = self.new_weight.sample(rng);
            genome.push_connection(ConnectionGene::new(source.id, target.id, weight, registry));
            return Ok(());
        }

        Err(NeatError::StructuralExhaustion {
            attempts: self.max_connection_attempts,
        })
    }

    /// Split a connection with a new hidden neuron halfway between its endpoints
    pub fn add_neuron(
        &self,
        genome: &mut NetworkChromosome,
        rng: &mut impl RngCore,
        registry: &mut InnovationRegistry,
    ) -> Result<(), NeatError> {
        if genome.connections().is_empty() {
            return Err(NeatError::EmptyGenomeCollection);
        }

        let idx = rng.random_range(0..genome.connections().len());
        let split = &genome.connections()[idx];
        let (source, target) = split.path();
        let source_layer = genome
            .layer_of(source)
            .ok_or(NeatError::InconsistentGenome { neuron: source })?;
        let target_layer = genome
            .layer_of(target)
            .ok_or(NeatError::InconsistentGenome { neuron: target })?;
        let layer = source_layer.between(target_layer);
        // adjacent floats leave no room for a layer in between
        if !(source_layer < layer && layer < target_layer) {
            return Err(NeatError::StructuralExhaustion { attempts: 1 });
        }

        // a genome that already split this connection once gets a neuron of its own
        let mut center = registry.split_neuron(split.innovation);
        while genome.contains_neuron(center) {
            center = registry.fresh_neuron();
        }

        let (l, r) = genome.connections_mut()[idx].bisect(center, registry);
        genome.push_neuron(layer, NeuronGene::hidden(center, self.hidden_activation));
        genome.push_2_connections(l, r);
        Ok(())
    }
}
